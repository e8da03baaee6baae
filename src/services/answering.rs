//! Answering model seam and HTTP chat client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use std::time::Duration;

use crate::error::CompletionError;
use crate::models::{ModelConfig, RetrievedChunk};

/// The model's reply: free-text answer plus the chunks it grounded on. The
/// grounding set drives citation assembly, so implementations decide which of
/// the supplied context chunks actually informed the answer.
#[derive(Debug, Clone)]
pub struct Completion {
    pub answer: String,
    pub grounding: Vec<RetrievedChunk>,
}

/// Answering model handle, dependency-injected like [`Embedder`].
///
/// [`Embedder`]: crate::services::Embedder
#[async_trait]
pub trait AnsweringModel: Send + Sync {
    async fn complete(
        &self,
        question: &str,
        context: &[RetrievedChunk],
    ) -> Result<Completion, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You answer questions using only the provided document excerpts. \
If the excerpts do not contain the answer, say so.";

/// Client for an OpenAI-compatible chat completion endpoint. Grounds the
/// answer on every supplied context chunk, mirroring a stuff-style QA chain
/// that returns its source documents.
#[derive(Debug, Clone)]
pub struct HttpChatModel {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
}

impl HttpChatModel {
    pub fn new(config: &ModelConfig, api_key: Option<String>) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key,
        })
    }

    fn build_user_prompt(question: &str, context: &[RetrievedChunk]) -> String {
        let mut prompt = String::new();
        if context.is_empty() {
            writeln!(prompt, "No document excerpts were retrieved.").unwrap();
        } else {
            writeln!(prompt, "Document excerpts:").unwrap();
            for chunk in context {
                writeln!(prompt, "--- {} (page {}) ---", chunk.source, chunk.page).unwrap();
                writeln!(prompt, "{}", chunk.content).unwrap();
            }
        }
        writeln!(prompt).unwrap();
        write!(prompt, "Question: {}", question).unwrap();
        prompt
    }
}

#[async_trait]
impl AnsweringModel for HttpChatModel {
    async fn complete(
        &self,
        question: &str,
        context: &[RetrievedChunk],
    ) -> Result<Completion, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_user_prompt(question, context),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::RequestError(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::ServerError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let answer = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                CompletionError::InvalidResponse("no completion choices returned".to_string())
            })?;

        Ok(Completion {
            answer: answer.trim().to_string(),
            grounding: context.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_includes_provenance() {
        let context = vec![RetrievedChunk {
            chunk_id: "id".to_string(),
            score: 0.9,
            content: "the budget was 500k".to_string(),
            source: "report.pdf".to_string(),
            page: 3,
        }];
        let prompt = HttpChatModel::build_user_prompt("What was the budget?", &context);

        assert!(prompt.contains("report.pdf (page 3)"));
        assert!(prompt.contains("the budget was 500k"));
        assert!(prompt.ends_with("Question: What was the budget?"));
    }

    #[test]
    fn test_user_prompt_with_empty_context() {
        let prompt = HttpChatModel::build_user_prompt("Anything?", &[]);
        assert!(prompt.contains("No document excerpts were retrieved."));
    }
}
