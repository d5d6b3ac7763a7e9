use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::ai::intent::TextService;

/// Only user turns are sent, the extraction is a single prompt.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Message {
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Some(content.to_string()),
        }
    }
}

/// Low temperature keeps extraction answers close to deterministic.
pub const EXTRACTION_TEMPERATURE: f64 = 0.1;

pub async fn completion(
    messages: &Vec<Message>,
    api_hostname: &str,
    api_key: &str,
    model: &str,
    temperature: f64,
) -> Result<Value, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
    });
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// Text service backed by an OpenAI compatible chat completions API.
#[derive(Clone, Debug)]
pub struct OpenAiTextService {
    api_hostname: String,
    api_key: String,
    model: String,
}

impl OpenAiTextService {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl TextService for OpenAiTextService {
    async fn complete(&self, prompt: &str) -> Result<String, Error> {
        let messages = vec![Message::new(Role::User, prompt)];
        let resp = completion(
            &messages,
            &self.api_hostname,
            &self.api_key,
            &self.model,
            EXTRACTION_TEMPERATURE,
        )
        .await?;

        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or(anyhow!("No message received. Resp:\n\n {}", resp))
    }
}
