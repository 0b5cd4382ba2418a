//! services/api/src/adapters/codegen_llm.rs
//!
//! This module contains the adapter for the component code-generation LLM.
//! It implements the `CodeGenerationModel` port from the `core` crate.
//!
//! The adapter makes a single attempt and reports any failure as a port
//! error; the caller degrades through the fallback tiers instead of retrying.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use gallery_core::ports::{CodeGenerationModel, PortError, PortResult};

const SYSTEM_INSTRUCTIONS: &str = "You are a UI component generator. You receive a request \
describing a component and the technologies it should use, and you answer with a single JSON \
object containing exactly the fields `name`, `description` and `code`. Respond with JSON only, \
no surrounding prose and no code fences.";

/// An adapter that implements `CodeGenerationModel` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCodegenAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCodegenAdapter {
    /// Creates a new `OpenAiCodegenAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl CodeGenerationModel for OpenAiCodegenAdapter {
    async fn generate(&self, instruction: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(instruction)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(2000u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("No content in model response".to_string()))?;

        Ok(text)
    }
}
