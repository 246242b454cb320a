use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::SpeechToText;
use crate::models::{TranscribedWord, TranscriptionConfig, TranscriptionResult};

pub const DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";

pub struct DeepgramProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl DeepgramProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEEPGRAM_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Deserialize)]
struct ListenResults {
    channels: Vec<ListenChannel>,
}

#[derive(Deserialize)]
struct ListenChannel {
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    words: Vec<TranscribedWord>,
}

#[async_trait]
impl SpeechToText for DeepgramProvider {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        config: &TranscriptionConfig,
    ) -> anyhow::Result<TranscriptionResult> {
        let smart_format = config.smart_format.to_string();
        let punctuate = config.punctuate.to_string();

        let resp = self
            .client
            .post(format!("{}/v1/listen", self.base_url))
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", mime_type)
            .query(&[
                ("model", config.model.as_str()),
                ("language", config.language.as_str()),
                ("smart_format", smart_format.as_str()),
                ("punctuate", punctuate.as_str()),
            ])
            .body(audio)
            .send()
            .await
            .context("failed to call Deepgram API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Deepgram API error ({}): {}", status, body);
        }

        let data: ListenResponse = resp
            .json()
            .await
            .context("failed to parse Deepgram response")?;

        let alternative = data
            .results
            .channels
            .into_iter()
            .next()
            .and_then(|c| c.alternatives.into_iter().next())
            .ok_or_else(|| anyhow::anyhow!("no transcript in Deepgram response"))?;

        Ok(TranscriptionResult {
            success: !alternative.transcript.trim().is_empty(),
            transcript: alternative.transcript,
            confidence: alternative.confidence,
            words: alternative.words,
        })
    }
}
