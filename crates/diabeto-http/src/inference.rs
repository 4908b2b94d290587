//! Chat-completions inference client.
//!
//! Replies are read from `choices[0].message.content`. A body of any other
//! shape (error envelope, HTML, empty) yields the fallback literal; only
//! transport failures are errors. There is no retry and no timeout.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use diabeto_core::traits::{
    Classifier, NO_RESPONSE, NO_TRANSLATION, SYSTEM_PROMPT, TRANSLATE_PROMPT, USER_INSTRUCTION,
};
use diabeto_core::workflow::EncodedImage;
use diabeto_core::{ApiKey, Result};

use crate::client::RestClient;

const COMPLETIONS: &str = "v1/chat/completions";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// First choice's content, if present and non-empty.
fn reply_text(body: &str) -> Option<String> {
    let response: ChatResponse = serde_json::from_str(body).ok()?;
    response
        .choices
        .into_iter()
        .next()?
        .message?
        .content
        .filter(|c| !c.is_empty())
}

/// Classifies food images with a hosted multimodal chat model.
#[derive(Debug, Clone)]
pub struct ChatClassifier {
    client: RestClient,
    model: String,
    api_key: ApiKey,
}

impl ChatClassifier {
    pub fn new(client: RestClient, api_key: ApiKey) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: Value, fallback: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
        });
        let text = self
            .client
            .post_json_text(COMPLETIONS, &body, Some(self.api_key.as_str()))
            .await?;

        match reply_text(&text) {
            Some(reply) => {
                debug!(len = reply.len(), "model replied");
                Ok(reply)
            }
            None => {
                warn!(body = %text, "unexpected completion response");
                Ok(fallback.to_string())
            }
        }
    }
}

#[async_trait]
impl Classifier for ChatClassifier {
    #[instrument(skip(self, image), fields(model = %self.model))]
    async fn classify(&self, image: &EncodedImage) -> Result<String> {
        let messages = json!([
            { "role": "system", "content": SYSTEM_PROMPT },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": USER_INSTRUCTION },
                    { "type": "image_url", "image_url": { "url": image.data_url() } },
                ],
            },
        ]);
        self.complete(messages, NO_RESPONSE).await
    }

    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn translate(&self, text: &str) -> Result<String> {
        let messages = json!([
            { "role": "system", "content": TRANSLATE_PROMPT },
            { "role": "user", "content": text },
        ]);
        self.complete(messages, NO_TRANSLATION).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"Green - safe"}},{"message":{"content":"x"}}]}"#;
        assert_eq!(reply_text(body).as_deref(), Some("Green - safe"));
    }

    #[test]
    fn shape_mismatches_yield_none() {
        assert_eq!(reply_text("not json"), None);
        assert_eq!(reply_text(r#"{"choices":[]}"#), None);
        assert_eq!(reply_text(r#"{"choices":[{"message":{"content":""}}]}"#), None);
        assert_eq!(reply_text(r#"{"choices":[{}]}"#), None);
        assert_eq!(
            reply_text(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#),
            None
        );
    }
}
