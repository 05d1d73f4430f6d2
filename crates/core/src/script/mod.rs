//! Script generation via a chat-completion LLM.
//!
//! The pipeline only depends on the [`ScriptWriter`] trait; the bundled
//! implementation talks to any OpenAI-compatible chat endpoint and
//! survives the usual LLM JSON sloppiness via [`json_guard`].

pub mod json_guard;

use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::types::Script;

const SYSTEM_PROMPT: &str = "\
You are a seasoned content writer for a YouTube Shorts channel, \
specializing in facts videos. Your facts shorts are concise, each lasting \
less than 50 seconds (approximately 140 words). They are incredibly \
engaging and original. When a user requests a specific type of facts \
short, you will create it.

Keep it brief, highly interesting, and unique.

Strictly output the script in a JSON format:
{\"script\": \"Here is the script ...\"}";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Produces a script document for a topic.
pub trait ScriptWriter {
    fn write_script(&self, topic: &str) -> Result<Script>;
}

/// Chat-completion backed script writer (OpenAI-compatible endpoint).
pub struct LlmScriptWriter {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmScriptWriter {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(LlmScriptWriter {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn chat(&self, topic: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": topic},
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("script request failed")?;

        if !response.status().is_success() {
            bail!("script endpoint returned HTTP {}", response.status());
        }

        let value: serde_json::Value = response.json().context("invalid script response body")?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .context("script response missing message content")?;
        Ok(content.to_string())
    }
}

impl ScriptWriter for LlmScriptWriter {
    fn write_script(&self, topic: &str) -> Result<Script> {
        log::info!("generating script for topic {:?}", topic);
        let content = self.chat(topic)?;
        parse_script_response(&content)
    }
}

/// Parse the `{"script": "..."}` payload out of a model response.
pub fn parse_script_response(content: &str) -> Result<Script> {
    let value = json_guard::extract_object(content)?;
    let text = value["script"]
        .as_str()
        .context("script JSON missing 'script' field")?
        .trim();
    if text.is_empty() {
        bail!("model returned an empty script");
    }
    Ok(Script::from_text(text))
}
