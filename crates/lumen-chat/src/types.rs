//! Wire types for the chat completions endpoint.

use serde::{Deserialize, Serialize};

use lumen_core::config::ChatConfig;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the outbound `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Outbound request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a single-turn request: the persona prompt followed by the user text.
    pub fn new(persona: &Persona, user_text: impl Into<String>) -> Self {
        Self {
            model: persona.model.clone(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: persona.system_prompt.clone(),
                },
                ChatMessage {
                    role: Role::User,
                    content: user_text.into(),
                },
            ],
            temperature: persona.temperature,
        }
    }

    /// Content of the user-role message.
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Fixed request and reply settings shared by every exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    /// Prefixed to the reply in the conversation's `response`.
    pub speaker_label: String,
    /// Language tag handed to speech output.
    pub language_tag: String,
}

impl Persona {
    pub fn from_config(chat: &ChatConfig, language_tag: impl Into<String>) -> Self {
        Self {
            model: chat.model.clone(),
            system_prompt: chat.system_prompt.clone(),
            temperature: chat.temperature,
            speaker_label: chat.speaker_label.clone(),
            language_tag: language_tag.into(),
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default(), "en-US")
    }
}

/// Recognized inbound bodies. Anything else is an unexpected shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChatResponseBody {
    Completion { choices: Vec<Choice> },
    Failure { error: ApiErrorBody },
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_expected_fields() {
        let persona = Persona {
            model: "gpt-test".to_string(),
            system_prompt: "Be kind.".to_string(),
            temperature: 0.7,
            speaker_label: "Lumen: ".to_string(),
            language_tag: "en-US".to_string(),
        };
        let request = ChatRequest::new(&persona, "hello");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-test");
        assert_eq!(value["messages"][0], json!({"role": "system", "content": "Be kind."}));
        assert_eq!(value["messages"][1], json!({"role": "user", "content": "hello"}));
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
        let temperature = value["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_request_has_no_extra_fields() {
        let request = ChatRequest::new(&Persona::default(), "x");
        let value = serde_json::to_value(&request).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["messages", "model", "temperature"]);
    }

    #[test]
    fn test_user_text() {
        let request = ChatRequest::new(&Persona::default(), "what is light?");
        assert_eq!(request.user_text(), Some("what is light?"));
    }

    #[test]
    fn test_persona_from_config() {
        let chat = ChatConfig {
            model: "m".to_string(),
            temperature: 0.3,
            speaker_label: "Bot: ".to_string(),
            ..ChatConfig::default()
        };
        let persona = Persona::from_config(&chat, "de-DE");
        assert_eq!(persona.model, "m");
        assert_eq!(persona.temperature, 0.3);
        assert_eq!(persona.speaker_label, "Bot: ");
        assert_eq!(persona.language_tag, "de-DE");
        assert_eq!(persona.system_prompt, chat.system_prompt);
    }

    #[test]
    fn test_response_body_prefers_completion() {
        let body: ChatResponseBody =
            serde_json::from_value(json!({"choices": [{"message": {"content": "hi"}}]})).unwrap();
        assert!(matches!(body, ChatResponseBody::Completion { .. }));
    }

    #[test]
    fn test_response_body_error_envelope() {
        let body: ChatResponseBody =
            serde_json::from_value(json!({"error": {"message": "nope", "type": "x"}})).unwrap();
        match body {
            ChatResponseBody::Failure { error } => assert_eq!(error.message, "nope"),
            other => panic!("Expected Failure, got {:?}", other),
        }
    }

    #[test]
    fn test_response_body_rejects_unknown_shape() {
        let result: Result<ChatResponseBody, _> = serde_json::from_value(json!({"data": []}));
        assert!(result.is_err());
    }
}
