use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};

use crate::config::demo_delay;
use crate::models::{BookingChannel, BookingLogEntry, BookingResult, ProblemSummary, VendorData};
use crate::services::random::{Clock, Dice};

const CONFIRMATION_CODE_LEN: usize = 8;
const DEFAULT_HOUR: u32 = 10;

const ALL_CHANNELS_FAILED: &str =
    "Unable to confirm a booking through any available channel. Please contact the vendor directly.";

// Normalized (lowercase, no whitespace) range substrings and their start hour.
const ETA_HOURS: &[(&str, u32)] = &[
    ("8-10am", 8),
    ("9-11am", 9),
    ("10-12", 10),
    ("1-3pm", 13),
    ("2-4pm", 14),
    ("3-5pm", 15),
    ("5-7pm", 17),
];

#[derive(Clone, Debug)]
pub struct BookingConfig {
    pub fast_demo: bool,
    pub success_rate: f64,
    /// Rate used when the vendor lacks the channel's capability flag.
    pub unsupported_rate: f64,
    pub step_delay_ms: RangeInclusive<u64>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            fast_demo: false,
            success_rate: 0.85,
            unsupported_rate: 0.10,
            step_delay_ms: 1000..=3000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("no {0} dialogue is scripted")]
    EmptyDialogue(&'static str),
}

#[derive(Debug)]
enum ChannelOutcome {
    Confirmed {
        scheduled_start: NaiveDateTime,
        confirmation_number: String,
        notes: String,
    },
    Declined {
        notes: String,
    },
}

/// Channels in attempt order. Phone is always first and always present.
pub fn channel_plan(vendor: &VendorData) -> Vec<BookingChannel> {
    let mut plan = vec![BookingChannel::Phone];
    if vendor.has_web_chat {
        plan.push(BookingChannel::WebChat);
    }
    if vendor.has_whatsapp {
        plan.push(BookingChannel::Whatsapp);
    }
    if vendor.has_sms {
        plan.push(BookingChannel::Sms);
    }
    plan
}

pub fn supports(vendor: &VendorData, channel: BookingChannel) -> bool {
    match channel {
        BookingChannel::Phone => true,
        BookingChannel::WebChat => vendor.has_web_chat,
        BookingChannel::Whatsapp => vendor.has_whatsapp,
        BookingChannel::Sms => vendor.has_sms,
    }
}

/// Turns a free-text ETA like "Tomorrow 9-11 AM" into a start time.
/// Without a day keyword the slot falls back to two days out at 10:00.
pub fn parse_eta(eta: &str, now: NaiveDateTime) -> NaiveDateTime {
    let normalized: String = eta
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let day_offset = if normalized.contains("tomorrow") {
        Some(1)
    } else if normalized.contains("today") {
        Some(0)
    } else {
        None
    };

    let Some(days) = day_offset else {
        return at_hour(now, 2, DEFAULT_HOUR);
    };

    let hour = ETA_HOURS
        .iter()
        .find(|(range, _)| normalized.contains(range))
        .map(|(_, hour)| *hour)
        .unwrap_or(DEFAULT_HOUR);

    at_hour(now, days, hour)
}

fn at_hour(now: NaiveDateTime, days: i64, hour: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    (now.date() + chrono::Duration::days(days)).and_time(time)
}

pub struct BookingSimulator {
    dice: Arc<dyn Dice>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl BookingSimulator {
    pub fn new(dice: Arc<dyn Dice>, clock: Arc<dyn Clock>, config: BookingConfig) -> Self {
        Self {
            dice,
            clock,
            config,
        }
    }

    /// Walks the vendor's channel plan until one channel confirms.
    ///
    /// `on_attempt` fires as each channel starts; `on_log` sees every log
    /// entry as it is appended. Channel errors are logged and skipped, so
    /// this never fails: exhaustion yields a `failed` result.
    pub async fn run<A, L>(
        &self,
        vendor: &VendorData,
        problem: &ProblemSummary,
        mut on_attempt: A,
        mut on_log: L,
    ) -> BookingResult
    where
        A: FnMut(BookingChannel) + Send,
        L: FnMut(&BookingLogEntry) + Send,
    {
        let plan = channel_plan(vendor);
        let mut log = Vec::new();

        for &channel in &plan {
            on_attempt(channel);
            tracing::info!(vendor = %vendor.id, channel = channel.as_str(), "attempting booking");

            match self
                .attempt_channel(channel, vendor, problem, &mut log, &mut on_log)
                .await
            {
                Ok(ChannelOutcome::Confirmed {
                    scheduled_start,
                    confirmation_number,
                    notes,
                }) => {
                    tracing::info!(
                        vendor = %vendor.id,
                        channel = channel.as_str(),
                        confirmation = %confirmation_number,
                        "booking confirmed"
                    );
                    return BookingResult::confirmed(
                        channel,
                        scheduled_start,
                        confirmation_number,
                        notes,
                        log,
                    );
                }
                Ok(ChannelOutcome::Declined { notes }) => {
                    tracing::info!(vendor = %vendor.id, channel = channel.as_str(), %notes, "booking channel failed");
                }
                Err(e) => {
                    tracing::warn!(vendor = %vendor.id, channel = channel.as_str(), error = %e, "booking channel error");
                    let entry = BookingLogEntry {
                        timestamp: self.clock.now(),
                        channel,
                        action: "error".to_string(),
                        message: e.to_string(),
                        success: false,
                    };
                    append(&mut log, &mut on_log, entry);
                }
            }
        }

        let first = plan.first().copied().unwrap_or(BookingChannel::Phone);
        BookingResult::failed(first, ALL_CHANNELS_FAILED.to_string(), log)
    }

    async fn attempt_channel<L>(
        &self,
        channel: BookingChannel,
        vendor: &VendorData,
        problem: &ProblemSummary,
        log: &mut Vec<BookingLogEntry>,
        on_log: &mut L,
    ) -> Result<ChannelOutcome, BookingError>
    where
        L: FnMut(&BookingLogEntry) + Send,
    {
        let steps = dialogue(channel, vendor, problem);
        let Some(last) = steps.len().checked_sub(1) else {
            return Err(BookingError::EmptyDialogue(channel.as_str()));
        };
        let mut confirmed = false;

        for (i, (action, message)) in steps.into_iter().enumerate() {
            self.pause().await;

            let success = if i == last {
                let rate = if supports(vendor, channel) {
                    self.config.success_rate
                } else {
                    self.config.unsupported_rate
                };
                confirmed = self.dice.roll() < rate;
                confirmed
            } else {
                true
            };

            let entry = BookingLogEntry {
                timestamp: self.clock.now(),
                channel,
                action: action.to_string(),
                message,
                success,
            };
            append(log, on_log, entry);
        }

        if !confirmed {
            return Ok(ChannelOutcome::Declined {
                notes: failure_reason(channel).to_string(),
            });
        }

        let eta = vendor.eta.as_deref().unwrap_or_default();
        let scheduled_start = parse_eta(eta, self.clock.now());
        let confirmation_number = self.dice.code(CONFIRMATION_CODE_LEN);
        let notes = format!(
            "Confirmed via {} with {} for {}. Confirmation #{}.",
            channel.display_name(),
            vendor.name,
            scheduled_start.format("%a %b %-d at %-I:%M %p"),
            confirmation_number,
        );

        Ok(ChannelOutcome::Confirmed {
            scheduled_start,
            confirmation_number,
            notes,
        })
    }

    async fn pause(&self) {
        let range = demo_delay(&self.config.step_delay_ms, self.config.fast_demo);
        let ms = self.dice.millis(range);
        self.clock.sleep(Duration::from_millis(ms)).await;
    }
}

fn append<L>(log: &mut Vec<BookingLogEntry>, on_log: &mut L, entry: BookingLogEntry)
where
    L: FnMut(&BookingLogEntry),
{
    on_log(&entry);
    log.push(entry);
}

fn dialogue(
    channel: BookingChannel,
    vendor: &VendorData,
    problem: &ProblemSummary,
) -> Vec<(&'static str, String)> {
    let name = &vendor.name;
    let eta = vendor.eta.as_deref().unwrap_or("the earliest available slot");
    let summary = &problem.summary;

    match channel {
        BookingChannel::Phone => vec![
            (
                "dial",
                format!(
                    "Calling {name} at {}",
                    vendor.phone.as_deref().unwrap_or("their listed number")
                ),
            ),
            ("connect", format!("Connected with {name} front desk")),
            (
                "describe",
                format!("Explained the {} issue: {summary}", problem.category.label()),
            ),
            ("request_slot", format!("Requested the {eta} appointment")),
        ],
        BookingChannel::WebChat => vec![
            (
                "open_chat",
                format!(
                    "Opened web chat on {}",
                    vendor.website.as_deref().unwrap_or("the vendor's site")
                ),
            ),
            ("describe", format!("Sent problem details: {summary}")),
            ("request_slot", format!("Asked the agent to hold {eta}")),
        ],
        BookingChannel::Whatsapp => vec![
            ("message", format!("Sent WhatsApp message to {name}")),
            ("describe", format!("Shared issue summary: {summary}")),
            ("request_slot", format!("Asked {name} to confirm {eta}")),
        ],
        BookingChannel::Sms => vec![
            ("message", format!("Texted {name} a booking request")),
            ("describe", format!("Texted the problem summary: {summary}")),
            ("request_slot", format!("Requested confirmation for {eta}")),
        ],
    }
}

fn failure_reason(channel: BookingChannel) -> &'static str {
    match channel {
        BookingChannel::Phone => "No answer after several rings; left a voicemail.",
        BookingChannel::WebChat => "Chat agent was unavailable; request queued for follow-up.",
        BookingChannel::Whatsapp => "Message delivered but no reply arrived in time.",
        BookingChannel::Sms => "Text delivered but the vendor did not confirm the slot.",
    }
}
