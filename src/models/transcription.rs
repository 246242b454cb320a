use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    pub model: String,
    pub language: String,
    pub smart_format: bool,
    pub punctuate: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "nova-2".to_string(),
            language: "en-US".to_string(),
            smart_format: true,
            punctuate: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscribedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub success: bool,
    pub transcript: String,
    pub confidence: f64,
    pub words: Vec<TranscribedWord>,
}
