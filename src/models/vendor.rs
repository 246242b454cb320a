use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutreachStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutreachChannel {
    Sms,
    Whatsapp,
    Phone,
    Email,
}

impl OutreachChannel {
    /// Rotation used by outreach rounds.
    pub const ROTATION: [OutreachChannel; 4] = [
        OutreachChannel::Sms,
        OutreachChannel::Whatsapp,
        OutreachChannel::Phone,
        OutreachChannel::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutreachChannel::Sms => "sms",
            OutreachChannel::Whatsapp => "whatsapp",
            OutreachChannel::Phone => "phone",
            OutreachChannel::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Sent,
    Delivered,
    Replied,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutreachAttempt {
    pub channel: OutreachChannel,
    pub timestamp: NaiveDateTime,
    pub status: AttemptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VendorSource {
    Places,
    Directory,
    Sample,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorData {
    pub id: String,
    pub name: String,
    pub rating: f32,
    pub review_count: u32,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub distance_miles: f64,
    pub has_web_chat: bool,
    pub has_whatsapp: bool,
    pub has_sms: bool,
    pub source: VendorSource,
    pub outreach_status: OutreachStatus,
    #[serde(default)]
    pub outreach_log: Vec<OutreachAttempt>,
    pub eta: Option<String>,
    pub service_fee: Option<String>,
}

impl VendorData {
    /// A vendor record with outreach fields reset to their initial state.
    pub fn new(id: impl Into<String>, name: impl Into<String>, source: VendorSource) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: 0.0,
            review_count: 0,
            phone: None,
            website: None,
            address: None,
            distance_miles: 0.0,
            has_web_chat: false,
            has_whatsapp: false,
            has_sms: false,
            source,
            outreach_status: OutreachStatus::Pending,
            outreach_log: Vec::new(),
            eta: None,
            service_fee: None,
        }
    }
}
