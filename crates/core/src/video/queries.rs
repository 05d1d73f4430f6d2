//! Timed stock-search query planning.
//!
//! An LLM turns the script plus the timed captions into consecutive
//! `[start, end] -> keywords` scenes; [`merge_empty_intervals`] later
//! absorbs scenes that found no footage into their neighbours.

use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::script::json_guard;
use crate::types::{SceneMedia, SceneQuery, TimedCaption};

const SYSTEM_PROMPT: &str = "\
# Instructions

Given the following video script and timed captions, extract three \
visually concrete and specific keywords for each time segment that can \
be used to search for background videos. The keywords should be short \
and capture the main essence of the sentence. They can be synonyms or \
related terms. If a caption is vague or general, consider the next timed \
caption for more context. If a keyword is a single word, try to return a \
two-word keyword that is visually concrete. If a time frame contains two \
or more important pieces of information, divide it into shorter time \
frames with one keyword each. Ensure that the time periods are strictly \
consecutive and cover the entire length of the video. Each keyword \
should cover between 2-4 seconds.

The output must be a JSON array of objects with keys \"start\", \"end\" \
and \"keywords\", like this:
[{\"start\": 0.0, \"end\": 2.6, \"keywords\": [\"keyword1\", \"keyword2\", \"keyword3\"]}, ...]

Important Guidelines:

Use only English in your text queries.
Each search string must depict something visual.
The depictions have to be extremely visually concrete, like rainy street, \
or cat sleeping.
'emotional moment' <= BAD, because it doesn't depict something visually.
'crying child' <= GOOD, because it depicts something visual.

Return ONLY valid JSON with no comments, no trailing commas, no backticks.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Tolerance when checking that the last scene reaches the audio end.
const END_TIME_TOLERANCE: f64 = 0.05;

/// Plans timed stock-search queries for a script.
pub trait QueryPlanner {
    fn plan_queries(&self, script: &str, captions: &[TimedCaption]) -> Result<Vec<SceneQuery>>;
}

/// Chat-completion backed query planner (OpenAI-compatible endpoint).
pub struct LlmQueryPlanner {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmQueryPlanner {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(LlmQueryPlanner {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn chat(&self, script: &str, captions: &[TimedCaption]) -> Result<String> {
        let caption_lines = captions
            .iter()
            .map(|c| format!("[{:.2}, {:.2}] {}", c.start, c.end, c.text))
            .collect::<Vec<_>>()
            .join("\n");
        let user_content = format!("Script: {}\nTimed Captions:\n{}", script, caption_lines);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_content},
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("query planning request failed")?;

        if !response.status().is_success() {
            bail!("query endpoint returned HTTP {}", response.status());
        }

        let value: serde_json::Value = response.json().context("invalid query response body")?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .context("query response missing message content")?;
        Ok(content.to_string())
    }
}

impl QueryPlanner for LlmQueryPlanner {
    fn plan_queries(&self, script: &str, captions: &[TimedCaption]) -> Result<Vec<SceneQuery>> {
        if captions.is_empty() {
            bail!("cannot plan scene queries without captions");
        }
        let content = self.chat(script, captions)?;
        let queries = parse_query_response(&content)?;

        let expected_end = captions[captions.len() - 1].end;
        if let Some(last) = queries.last() {
            if (last.end - expected_end).abs() >= END_TIME_TOLERANCE {
                log::warn!(
                    "last scene ends at {:.2}s but audio ends at {:.2}s",
                    last.end,
                    expected_end
                );
            }
        }

        Ok(queries)
    }
}

/// Parse the scene-query JSON array out of a model response.
pub fn parse_query_response(content: &str) -> Result<Vec<SceneQuery>> {
    let value = json_guard::extract_array(content)?;
    let items = value.as_array().context("scene queries are not an array")?;

    let mut queries = Vec::with_capacity(items.len());
    for item in items {
        let start = item["start"].as_f64().context("scene missing 'start'")?;
        let end = item["end"].as_f64().context("scene missing 'end'")?;
        let keywords = item["keywords"]
            .as_array()
            .context("scene missing 'keywords'")?
            .iter()
            .filter_map(|k| k.as_str())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>();
        if keywords.is_empty() {
            bail!("scene [{:.2}, {:.2}] has no keywords", start, end);
        }
        if end < start {
            bail!("scene [{:.2}, {:.2}] ends before it starts", start, end);
        }
        queries.push(SceneQuery { start, end, keywords });
    }

    if queries.is_empty() {
        bail!("model returned no scene queries");
    }
    Ok(queries)
}

/// Absorb scenes that found no footage into the preceding scene.
///
/// A run of empty scenes directly following a filled scene extends that
/// scene's interval; a leading run with no predecessor stays empty.
pub fn merge_empty_intervals(scenes: &[SceneMedia]) -> Vec<SceneMedia> {
    let mut merged: Vec<SceneMedia> = Vec::with_capacity(scenes.len());
    let mut i = 0;

    while i < scenes.len() {
        let scene = &scenes[i];
        if scene.media.is_none() {
            let mut j = i + 1;
            while j < scenes.len() && scenes[j].media.is_none() {
                j += 1;
            }
            let run_end = scenes[j - 1].end;

            let extends_previous = matches!(
                merged.last(),
                Some(prev) if prev.media.is_some() && prev.end == scene.start
            );
            if extends_previous {
                if let Some(prev) = merged.last_mut() {
                    prev.end = run_end;
                }
            } else {
                // Not contiguous with the previous scene: reuse its
                // media rather than leaving a black gap.
                let media = merged.last().and_then(|prev| prev.media.clone());
                merged.push(SceneMedia {
                    start: scene.start,
                    end: run_end,
                    media,
                });
            }
            i = j;
        } else {
            merged.push(scene.clone());
            i += 1;
        }
    }

    merged
}
