use crate::config::SkillConfig;
use crate::news::FeedHighlightFetcher;
use crate::skill::{Call, Handler, Reply, Session, SkillRuntime};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub const READ_NEW_POST: &str = "ReadNewBlogIntent";
pub const HELP: &str = "AMAZON.HelpIntent";
pub const STOP: &str = "AMAZON.StopIntent";
pub const CANCEL: &str = "AMAZON.CancelIntent";

struct ReadNewPost {
    fetcher: FeedHighlightFetcher,
    feed_url: String,
    apology: String,
}

#[async_trait]
impl Handler for ReadNewPost {
    async fn handle(&self, _call: &Call<'_>) -> Reply {
        let outcome = self.fetcher.fetch(&self.feed_url).await;
        Reply::tell(outcome.into_utterance(&self.apology))
    }
}

struct Help {
    speech: String,
    reprompt: String,
}

#[async_trait]
impl Handler for Help {
    async fn handle(&self, _call: &Call<'_>) -> Reply {
        Reply::ask(self.speech.as_str(), self.reprompt.as_str())
    }
}

struct Goodbye(String);

#[async_trait]
impl Handler for Goodbye {
    async fn handle(&self, _call: &Call<'_>) -> Reply {
        Reply::tell(self.0.as_str())
    }
}

/// Wire the skill's handler tables into a runtime.
pub fn build(cfg: &SkillConfig) -> Result<SkillRuntime> {
    let read: Arc<dyn Handler> = Arc::new(ReadNewPost {
        fetcher: FeedHighlightFetcher::new(cfg)?,
        feed_url: cfg.feed_url.clone(),
        apology: cfg.apology(),
    });
    let goodbye: Arc<dyn Handler> = Arc::new(Goodbye(cfg.goodbye_text.clone()));
    let help: Arc<dyn Handler> = Arc::new(Help {
        speech: cfg.help_text.clone(),
        reprompt: cfg.help_reprompt.clone(),
    });

    let runtime = SkillRuntime::new(cfg.application_id.as_str())
        .on_session_started(Box::new(|request_id: &str, session: &Session| {
            let user_id = session.user.as_ref().map(|u| u.user_id.as_str()).unwrap_or("-");
            info!(request_id, session_id = %session.session_id, user_id, "session started");
        }))
        .on_session_ended(Box::new(|request_id: &str, session: &Session| {
            let user_id = session.user.as_ref().map(|u| u.user_id.as_str()).unwrap_or("-");
            info!(request_id, session_id = %session.session_id, user_id, "session ended");
        }))
        .on_launch(read.clone())
        .intent(READ_NEW_POST, read)
        .intent(HELP, help)
        .intent(STOP, goodbye.clone())
        .intent(CANCEL, goodbye);
    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::{HostOutcome, handle_event};
    use serde_json::{Value, json};

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>AVC</title>
    <link>https://avc.com</link>
    <description>Musings of a VC in NYC</description>
    <item>
      <title>Feature Friday</title>
      <description>&lt;p&gt;Some &lt;a href="https://avc.com/x"&gt;linked&lt;/a&gt; text&lt;/p&gt;</description>
    </item>
  </channel>
</rss>"#;

    fn config(feed_url: String) -> SkillConfig {
        SkillConfig {
            feed_url,
            ..SkillConfig::default()
        }
    }

    fn event(app: &str, request: Value) -> Value {
        json!({
            "version": "1.0",
            "session": {
                "new": false,
                "sessionId": "amzn1.echo-api.session.1",
                "application": { "applicationId": app }
            },
            "request": request
        })
    }

    fn intent(name: &str) -> Value {
        json!({ "type": "IntentRequest", "requestId": "amzn1.echo-api.request.1", "intent": { "name": name, "slots": {} } })
    }

    fn speech(outcome: &HostOutcome) -> (String, Option<bool>) {
        let HostOutcome::Succeed(resp) = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        let text = resp
            .response
            .output_speech
            .as_ref()
            .map(|s| s.text.clone())
            .unwrap_or_default();
        (text, resp.response.should_end_session)
    }

    #[tokio::test]
    async fn launch_reads_the_newest_post() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/avc")
            .with_status(200)
            .with_body(FEED)
            .create_async()
            .await;
        let cfg = config(format!("{}/avc", server.url()));
        let rt = build(&cfg).expect("runtime builds");

        let outcome = handle_event(
            &rt,
            event(
                &cfg.application_id,
                json!({ "type": "LaunchRequest", "requestId": "amzn1.echo-api.request.0" }),
            ),
        )
        .await;
        let (text, ends) = speech(&outcome);
        assert!(text.starts_with("New article: Feature Friday. "));
        assert!(text.contains("Some linked text"));
        assert_eq!(ends, Some(true));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_intent_speaks_apology_on_404() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/avc")
            .with_status(404)
            .create_async()
            .await;
        let cfg = config(format!("{}/avc", server.url()));
        let rt = build(&cfg).expect("runtime builds");

        let outcome = handle_event(&rt, event(&cfg.application_id, intent(READ_NEW_POST))).await;
        let (text, ends) = speech(&outcome);
        assert_eq!(text, "Sorry. I had some issue accessing AVC! Please try again later.");
        assert_eq!(ends, Some(true));
    }

    #[tokio::test]
    async fn foreign_application_never_fetches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/avc")
            .with_status(200)
            .with_body(FEED)
            .expect(0)
            .create_async()
            .await;
        let cfg = config(format!("{}/avc", server.url()));
        let rt = build(&cfg).expect("runtime builds");

        let outcome = handle_event(&rt, event("amzn1.echo-sdk-ams.app.other", intent(READ_NEW_POST))).await;
        assert_eq!(outcome, HostOutcome::Fail("Invalid Application ID".into()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn help_keeps_the_session_open() {
        let cfg = SkillConfig::default();
        let rt = build(&cfg).expect("runtime builds");

        let outcome = handle_event(&rt, event(&cfg.application_id, intent(HELP))).await;
        let (text, ends) = speech(&outcome);
        assert_eq!(text, cfg.help_text);
        assert_eq!(ends, Some(false));
        let HostOutcome::Succeed(resp) = outcome else {
            unreachable!()
        };
        assert_eq!(
            resp.response.reprompt.map(|r| r.output_speech.text),
            Some("What can I help you with?".to_string())
        );
    }

    #[tokio::test]
    async fn stop_and_cancel_say_goodbye() {
        let cfg = SkillConfig::default();
        let rt = build(&cfg).expect("runtime builds");

        for name in [STOP, CANCEL] {
            let outcome = handle_event(&rt, event(&cfg.application_id, intent(name))).await;
            assert_eq!(speech(&outcome), ("Goodbye".to_string(), Some(true)));
        }
    }
}
