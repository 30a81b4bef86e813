use super::model::FeedError;
use crate::config::SkillConfig;
use anyhow::Result;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub fn build_client(cfg: &SkillConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .gzip(true)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()?;
    Ok(client)
}

/// One GET, no retry. Anything but a plain 200 goes down the same error path
/// as a transport failure.
pub async fn fetch_body(client: &Client, url: &str, max: usize) -> Result<Vec<u8>, FeedError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(FeedError::HttpStatus(status.as_u16()));
    }

    // Stream with a max size limit
    let mut stream = resp.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let c = chunk?;
        if buf.len() + c.len() > max {
            return Err(FeedError::TooLarge(max));
        }
        buf.extend_from_slice(&c);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        build_client(&SkillConfig::default()).expect("client builds")
    }

    #[tokio::test]
    async fn ok_response_returns_whole_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body("<rss/>")
            .create_async()
            .await;

        let body = fetch_body(&client(), &format!("{}/feed", server.url()), 1024)
            .await
            .expect("200 must succeed");
        assert_eq!(body, b"<rss/>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_200_is_an_error_even_when_successful() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(204)
            .create_async()
            .await;

        let err = fetch_body(&client(), &format!("{}/feed", server.url()), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::HttpStatus(204)));
        assert_eq!(err.cause(), "network error");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_body("x".repeat(64))
            .create_async()
            .await;

        let err = fetch_body(&client(), &format!("{}/feed", server.url()), 16)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::TooLarge(16)));
    }

    #[tokio::test]
    async fn malformed_url_is_a_request_error() {
        let err = fetch_body(&client(), "not a url", 1024).await.unwrap_err();
        assert!(matches!(err, FeedError::Request(_)));
    }
}
