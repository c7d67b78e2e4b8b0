use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Best-effort LLM addendum to the rule-based classification. Any failure -
/// missing key, network error, non-success status, decode error - degrades
/// to `None`; the computed tier is never affected.
pub struct Enhancer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl Enhancer {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.notify_timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            api_key: cfg.groq_api_key.clone(),
            model: cfg.groq_model.clone(),
        })
    }

    pub fn configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn enhance(&self, description: &str, location: &str) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }
        match self.request_enhancement(description, location).await {
            Ok(content) => content,
            Err(e) => {
                warn!("AI enhancement failed (using rule-based analysis only): {:#}", e);
                None
            }
        }
    }

    async fn request_enhancement(
        &self,
        description: &str,
        location: &str,
    ) -> Result<Option<String>> {
        let prompt = format!(
            "Analyze this animal report and provide a brief assessment:\n\
             Description: {}\n\
             Location: {}\n\n\
             Provide severity (emergency/high/normal/low) and brief recommendation.",
            description, location
        );

        let req_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an animal welfare expert. Provide brief, actionable analysis."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 200,
        };

        let resp = self
            .http
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await
            .context("groq request failed")?;

        if !resp.status().is_success() {
            warn!("groq non-success status: {}", resp.status());
            return Ok(None);
        }

        let data: ChatResponse = resp.json().await.context("groq json decode")?;
        let content = data
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(content)
    }
}
