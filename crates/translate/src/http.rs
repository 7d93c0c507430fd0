use bonnetje_core::TranslationSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{TranslationError, Translator};

/// Client for a LibreTranslate-compatible `POST /translate` endpoint.
pub struct LibreTranslateClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslateClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, TranslationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    /// `None` when no endpoint is configured.
    pub fn from_settings(settings: &TranslationSettings) -> Result<Option<Self>, TranslationError> {
        settings
            .endpoint
            .as_deref()
            .map(|url| Self::new(url, settings.api_key.clone(), settings.timeout_secs))
            .transpose()
    }
}

impl Translator for LibreTranslateClient {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate", self.base_url);
        let body = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                TranslationError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                TranslationError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                TranslationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TranslationError::Service { status: status.as_u16(), body });
        }

        let parsed: TranslateResponse = response
            .json()
            .map_err(|e| TranslationError::ResponseParsing(e.to_string()))?;

        let translated = parsed.translated_text.trim();
        if translated.is_empty() {
            return Err(TranslationError::Empty);
        }
        Ok(translated.to_string())
    }
}
