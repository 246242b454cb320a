use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    Phone,
    WebChat,
    Whatsapp,
    Sms,
}

impl BookingChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingChannel::Phone => "phone",
            BookingChannel::WebChat => "web_chat",
            BookingChannel::Whatsapp => "whatsapp",
            BookingChannel::Sms => "sms",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BookingChannel::Phone => "phone",
            BookingChannel::WebChat => "web chat",
            BookingChannel::Whatsapp => "WhatsApp",
            BookingChannel::Sms => "SMS",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Tentative,
    Failed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 3] = [
        BookingStatus::Confirmed,
        BookingStatus::Tentative,
        BookingStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Tentative => "tentative",
            BookingStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingLogEntry {
    pub timestamp: NaiveDateTime,
    pub channel: BookingChannel,
    pub action: String,
    pub message: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingResult {
    pub status: BookingStatus,
    pub channel: BookingChannel,
    pub scheduled_start: Option<NaiveDateTime>,
    pub notes: String,
    pub log: Vec<BookingLogEntry>,
    pub confirmation_number: Option<String>,
}

impl BookingResult {
    pub fn confirmed(
        channel: BookingChannel,
        scheduled_start: NaiveDateTime,
        confirmation_number: String,
        notes: String,
        log: Vec<BookingLogEntry>,
    ) -> Self {
        Self {
            status: BookingStatus::Confirmed,
            channel,
            scheduled_start: Some(scheduled_start),
            notes,
            log,
            confirmation_number: Some(confirmation_number),
        }
    }

    pub fn failed(channel: BookingChannel, notes: String, log: Vec<BookingLogEntry>) -> Self {
        Self {
            status: BookingStatus::Failed,
            channel,
            scheduled_start: None,
            notes,
            log,
            confirmation_number: None,
        }
    }
}

/// A finished booking as kept in the booking store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: String,
    pub vendor: super::VendorData,
    pub problem: super::ProblemSummary,
    pub result: BookingResult,
    pub created_at: NaiveDateTime,
}
