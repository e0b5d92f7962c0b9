//! LLM completion client.
//!
//! Builds the recommendation prompt, asks the completion endpoint for song
//! suggestions and splits the answer into one search query per line.

use reqwest::Client;

use crate::{
    config::CompletionSettings,
    spotify::{ApiError, decode},
    types::{CompletionRequest, CompletionResponse},
};

const MAX_TOKENS: u32 = 250;
const TEMPERATURE: f32 = 0.8;

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl CompletionClient {
    pub fn new(settings: &CompletionSettings) -> Self {
        Self {
            http: Client::new(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    /// Sends `prompt` and returns the text of the first choice.
    ///
    /// An answer without choices yields an empty string.
    pub async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let body = CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let mut request = self
            .http
            .post(format!("{}/completions", self.api_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body: CompletionResponse = decode(response).await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .unwrap_or_default())
    }

    /// Asks for songs matching `mood` and returns them as search queries.
    pub async fn recommend(
        &self,
        mood: &str,
        liked_artists: &[String],
    ) -> Result<Vec<String>, ApiError> {
        let text = self.complete(&build_prompt(mood, liked_artists)).await?;
        Ok(split_queries(&text))
    }
}

/// The recommendation prompt for `mood`.
///
/// When the user has liked songs before, their artists are appended so the
/// suggestions blend in those genres.
pub fn build_prompt(mood: &str, liked_artists: &[String]) -> String {
    let mut prompt = format!(
        "Based on this mood, feeling, or specific query: {}, provide a maximum of three songs \
         with each song's name and artist, separated by a dash. Each song should be on a \
         separate line. No excess line breaks in the beginning or end of the response. \
         Example: Song Name - Artist Name\n",
        mood.trim()
    );

    if !liked_artists.is_empty() {
        prompt.push_str(&format!(
            "On subsequent queries, consider some of these suggested songs and blend the genres \
             into your suggestions: {}",
            liked_artists.join(", ")
        ));
    }

    prompt
}

/// One query per non-blank line, trimmed.
pub fn split_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
