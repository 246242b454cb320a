pub mod deepgram;

use async_trait::async_trait;

use crate::models::{TranscriptionConfig, TranscriptionResult};

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        config: &TranscriptionConfig,
    ) -> anyhow::Result<TranscriptionResult>;
}
