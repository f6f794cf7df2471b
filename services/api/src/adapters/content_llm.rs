//! services/api/src/adapters/content_llm.rs
//!
//! This module contains the adapter for the content-generating LLM.
//! It implements the `ContentGenerator` port from the `core` crate, sending the
//! output schema as a structured response format so the reply is raw JSON.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use tutor_core::ports::{ContentGenerator, PortError, PortResult};

const SCHEMA_NAME: &str = "education_document";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiContentAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiContentAdapter {
    /// Creates a new `OpenAiContentAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ContentGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerator for OpenAiContentAdapter {
    /// Sends the prompt as a single user message and returns the JSON reply text.
    async fn generate(&self, prompt: &str, schema: &Value) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("A complete educational module for one topic.".to_string()),
                name: SCHEMA_NAME.to_string(),
                schema: Some(schema.clone()),
                strict: Some(false),
            },
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(response_format)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!("Sending content request to model '{}'", self.model);

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Content LLM response contained no text content.".to_string())
            })
    }
}
