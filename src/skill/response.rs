use super::envelope::{Attributes, OutputSpeech, Reprompt, ResponseBody, ResponseEnvelope};

/// What a handler wants said back to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Final utterance; the session ends.
    Tell(String),
    /// Keep the session open and wait for another request.
    Ask { speech: String, reprompt: String },
    /// Acknowledge without speaking.
    Silent,
}

impl Reply {
    pub fn tell(speech: impl Into<String>) -> Self {
        Reply::Tell(speech.into())
    }

    pub fn ask(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Reply::Ask {
            speech: speech.into(),
            reprompt: reprompt.into(),
        }
    }

    pub fn into_envelope(self, session_attributes: Attributes) -> ResponseEnvelope {
        let response = match self {
            Reply::Tell(speech) => ResponseBody {
                output_speech: Some(OutputSpeech::plain(speech)),
                reprompt: None,
                should_end_session: Some(true),
            },
            Reply::Ask { speech, reprompt } => ResponseBody {
                output_speech: Some(OutputSpeech::plain(speech)),
                reprompt: Some(Reprompt {
                    output_speech: OutputSpeech::plain(reprompt),
                }),
                should_end_session: Some(false),
            },
            Reply::Silent => ResponseBody::default(),
        };
        ResponseEnvelope {
            version: "1.0".into(),
            session_attributes,
            response,
        }
    }
}
