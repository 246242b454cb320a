use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::config::demo_delay;
use crate::models::{
    AttemptStatus, OutreachAttempt, OutreachChannel, OutreachStatus, ProblemSummary, VendorData,
};
use crate::services::random::{Clock, Dice};

/// Earliest-availability quotes a vendor may answer with.
pub const QUOTES: &[(&str, &str)] = &[
    ("Today 2-4 PM", "$89"),
    ("Today 5-7 PM", "$129"),
    ("Tomorrow 8-10 AM", "$79"),
    ("Tomorrow 9-11 AM", "$95"),
    ("Tomorrow 1-3 PM", "$85"),
    ("Tomorrow 3-5 PM", "$110"),
];

#[derive(Clone, Debug)]
pub struct OutreachConfig {
    pub fast_demo: bool,
    pub success_rate: f64,
    pub max_attempts: u32,
    pub delay_range_ms: RangeInclusive<u64>,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            fast_demo: false,
            success_rate: 0.8,
            max_attempts: 3,
            delay_range_ms: 800..=2000,
        }
    }
}

pub struct OutreachSimulator {
    dice: Arc<dyn Dice>,
    clock: Arc<dyn Clock>,
    config: OutreachConfig,
}

impl OutreachSimulator {
    pub fn new(dice: Arc<dyn Dice>, clock: Arc<dyn Clock>, config: OutreachConfig) -> Self {
        Self {
            dice,
            clock,
            config,
        }
    }

    /// Contacts one vendor until it quotes or attempts run out.
    ///
    /// `on_update` sees a snapshot after every transition. The flag is checked
    /// before every callback: once `cancel` is set, even from inside
    /// `on_update`, no further updates are delivered and the last snapshot is
    /// returned.
    pub async fn run<F>(
        &self,
        vendor: VendorData,
        problem: &ProblemSummary,
        cancel: &AtomicBool,
        mut on_update: F,
    ) -> VendorData
    where
        F: FnMut(&VendorData) + Send,
    {
        let cancelled = || cancel.load(Ordering::SeqCst);

        let mut current = begin(&vendor);
        if cancelled() {
            return current;
        }
        on_update(&current);

        for attempt in 0..self.config.max_attempts {
            let channel = OutreachChannel::ROTATION[attempt as usize % OutreachChannel::ROTATION.len()];

            self.pause().await;
            if cancelled() {
                return current;
            }
            let message = outreach_message(channel, &current, problem);
            current = record_sent(&current, channel, message, self.clock.now());
            on_update(&current);

            self.pause().await;
            if cancelled() {
                return current;
            }
            current = mark_delivered(&current);
            on_update(&current);
            if cancelled() {
                return current;
            }

            if self.dice.roll() < self.config.success_rate {
                let (eta, fee) = QUOTES[self.dice.index(QUOTES.len())];
                current = mark_replied(&current, eta, fee);
                tracing::info!(
                    vendor = %current.id,
                    channel = channel.as_str(),
                    eta,
                    fee,
                    "vendor replied to outreach"
                );
                on_update(&current);
                return current;
            }

            current = mark_attempt_failed(&current);
            tracing::debug!(vendor = %current.id, channel = channel.as_str(), attempt, "no reply");
            on_update(&current);
        }

        current = finish_failed(&current);
        tracing::info!(vendor = %current.id, "outreach exhausted all attempts");
        if !cancelled() {
            on_update(&current);
        }
        current
    }

    async fn pause(&self) {
        let range = demo_delay(&self.config.delay_range_ms, self.config.fast_demo);
        let ms = self.dice.millis(range);
        self.clock.sleep(Duration::from_millis(ms)).await;
    }
}

// ── Transitions ──
//
// Each returns a new snapshot; the input is never modified.

pub fn begin(vendor: &VendorData) -> VendorData {
    VendorData {
        outreach_status: OutreachStatus::InProgress,
        ..vendor.clone()
    }
}

pub fn record_sent(
    vendor: &VendorData,
    channel: OutreachChannel,
    message: String,
    at: NaiveDateTime,
) -> VendorData {
    let mut next = vendor.clone();
    next.outreach_log.push(OutreachAttempt {
        channel,
        timestamp: at,
        status: AttemptStatus::Sent,
        message: Some(message),
        response: None,
    });
    next
}

pub fn mark_delivered(vendor: &VendorData) -> VendorData {
    advance_last(vendor, AttemptStatus::Delivered, None)
}

/// Completes outreach. Status and quote are set together.
pub fn mark_replied(vendor: &VendorData, eta: &str, fee: &str) -> VendorData {
    let response = format!("Available {eta}. Service fee: {fee}.");
    let mut next = advance_last(vendor, AttemptStatus::Replied, Some(response));
    next.eta = Some(eta.to_string());
    next.service_fee = Some(fee.to_string());
    next.outreach_status = OutreachStatus::Completed;
    next
}

pub fn mark_attempt_failed(vendor: &VendorData) -> VendorData {
    advance_last(vendor, AttemptStatus::Failed, None)
}

pub fn finish_failed(vendor: &VendorData) -> VendorData {
    VendorData {
        outreach_status: OutreachStatus::Failed,
        ..vendor.clone()
    }
}

/// Moves the newest attempt forward; backwards moves are ignored.
fn advance_last(vendor: &VendorData, status: AttemptStatus, response: Option<String>) -> VendorData {
    let mut next = vendor.clone();
    if let Some(last) = next.outreach_log.last_mut() {
        if status > last.status {
            last.status = status;
            if response.is_some() {
                last.response = response;
            }
        }
    }
    next
}

fn outreach_message(
    channel: OutreachChannel,
    vendor: &VendorData,
    problem: &ProblemSummary,
) -> String {
    let label = problem.category.label();
    let urgency = problem.urgency.as_str();
    match channel {
        OutreachChannel::Sms => format!(
            "Hi {}, a homeowner nearby needs {label} help: {} (urgency: {urgency}). \
             What is your earliest availability and service call fee?",
            vendor.name, problem.summary
        ),
        OutreachChannel::Whatsapp => format!(
            "Hello {}! Reaching out for a homeowner with a {label} issue: {}. \
             Could you share your next opening and visit fee?",
            vendor.name, problem.summary
        ),
        OutreachChannel::Phone => format!(
            "Calling {} to request a quote for: {} (urgency: {urgency})",
            vendor.name, problem.summary
        ),
        OutreachChannel::Email => format!(
            "Subject: {label} service request\n\nHi {},\n\nA homeowner is looking for help with: {}.\n\
             Please reply with your earliest availability and service fee.",
            vendor.name, problem.summary
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::VendorSource;
    use crate::services::classifier::analyze_problem;
    use crate::services::random::{ManualClock, ScriptedDice};

    fn start() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-06-10 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn simulator(dice: ScriptedDice, config: OutreachConfig) -> OutreachSimulator {
        OutreachSimulator::new(
            Arc::new(dice),
            Arc::new(ManualClock::starting_at(start())),
            config,
        )
    }

    fn vendor() -> VendorData {
        VendorData::new("v-1", "Bay Cooling Co", VendorSource::Sample)
    }

    #[tokio::test]
    async fn test_first_attempt_success_completes_with_quote() {
        let sim = simulator(ScriptedDice::always_succeed(), OutreachConfig::default());
        let problem = analyze_problem("My AC is broken and leaking");
        let cancel = AtomicBool::new(false);
        let mut snapshots = Vec::new();

        let done = sim
            .run(vendor(), &problem, &cancel, |v| snapshots.push(v.clone()))
            .await;

        assert_eq!(done.outreach_status, OutreachStatus::Completed);
        assert_eq!(done.eta.as_deref(), Some(QUOTES[0].0));
        assert_eq!(done.service_fee.as_deref(), Some(QUOTES[0].1));
        assert_eq!(done.outreach_log.len(), 1);
        assert_eq!(done.outreach_log[0].channel, OutreachChannel::Sms);
        assert_eq!(done.outreach_log[0].status, AttemptStatus::Replied);
        assert!(done.outreach_log[0].response.as_deref().unwrap().contains("Today 2-4 PM"));

        // in_progress, sent, delivered, replied
        let statuses: Vec<_> = snapshots.iter().map(|v| v.outreach_status).collect();
        assert_eq!(
            statuses,
            vec![
                OutreachStatus::InProgress,
                OutreachStatus::InProgress,
                OutreachStatus::InProgress,
                OutreachStatus::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_exhausted_attempts_fail() {
        let sim = simulator(ScriptedDice::always_fail(), OutreachConfig::default());
        let problem = analyze_problem("Toilet is clogged");
        let cancel = AtomicBool::new(false);

        let done = sim.run(vendor(), &problem, &cancel, |_| {}).await;

        assert_eq!(done.outreach_status, OutreachStatus::Failed);
        assert_eq!(done.eta, None);
        assert_eq!(done.service_fee, None);
        let channels: Vec<_> = done.outreach_log.iter().map(|a| a.channel).collect();
        assert_eq!(
            channels,
            vec![OutreachChannel::Sms, OutreachChannel::Whatsapp, OutreachChannel::Phone]
        );
        assert!(done
            .outreach_log
            .iter()
            .all(|a| a.status == AttemptStatus::Failed));
    }

    #[tokio::test]
    async fn test_channel_rotation_wraps() {
        let config = OutreachConfig {
            max_attempts: 6,
            ..OutreachConfig::default()
        };
        let sim = simulator(ScriptedDice::always_fail(), config);
        let problem = analyze_problem("Mice in the garage");
        let cancel = AtomicBool::new(false);

        let done = sim.run(vendor(), &problem, &cancel, |_| {}).await;
        let channels: Vec<_> = done.outreach_log.iter().map(|a| a.channel).collect();
        assert_eq!(channels[4], OutreachChannel::Sms);
        assert_eq!(channels[5], OutreachChannel::Whatsapp);
    }

    #[tokio::test]
    async fn test_success_on_third_attempt() {
        let sim = simulator(
            ScriptedDice::new([0.95, 0.95, 0.1], 1.0),
            OutreachConfig::default(),
        );
        let problem = analyze_problem("Outlet is sparking");
        let cancel = AtomicBool::new(false);

        let done = sim.run(vendor(), &problem, &cancel, |_| {}).await;
        assert_eq!(done.outreach_status, OutreachStatus::Completed);
        assert_eq!(done.outreach_log.len(), 3);
        assert_eq!(done.outreach_log[2].channel, OutreachChannel::Phone);
        assert_eq!(done.outreach_log[2].status, AttemptStatus::Replied);
    }

    #[tokio::test]
    async fn test_every_snapshot_respects_invariants() {
        let sim = simulator(
            ScriptedDice::new([0.9, 0.9, 0.9, 0.3], 1.0),
            OutreachConfig {
                max_attempts: 5,
                ..OutreachConfig::default()
            },
        );
        let problem = analyze_problem("Furnace is noisy");
        let cancel = AtomicBool::new(false);
        let snapshots = Mutex::new(Vec::new());

        sim.run(vendor(), &problem, &cancel, |v| {
            snapshots.lock().unwrap().push(v.clone())
        })
        .await;

        let snapshots = snapshots.into_inner().unwrap();
        for snap in &snapshots {
            if snap.outreach_status == OutreachStatus::Completed {
                assert!(snap.eta.is_some() && snap.service_fee.is_some());
            }
            let stamps: Vec<_> = snap.outreach_log.iter().map(|a| a.timestamp).collect();
            assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        }

        // status of each attempt only moves forward across snapshots
        for pair in snapshots.windows(2) {
            for (before, after) in pair[0].outreach_log.iter().zip(&pair[1].outreach_log) {
                assert!(after.status >= before.status);
                if matches!(after.status, AttemptStatus::Replied | AttemptStatus::Failed) {
                    assert_ne!(before.status, AttemptStatus::Sent);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_updates() {
        let sim = simulator(ScriptedDice::always_fail(), OutreachConfig::default());
        let problem = analyze_problem("Roof leak");
        let cancel = AtomicBool::new(false);
        let mut updates = 0;

        let done = sim
            .run(vendor(), &problem, &cancel, |v| {
                updates += 1;
                if v.outreach_log.len() == 1 {
                    cancel.store(true, Ordering::SeqCst);
                }
            })
            .await;

        assert_eq!(updates, 2);
        assert_eq!(done.outreach_status, OutreachStatus::InProgress);
        assert_eq!(done.outreach_log.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_delivered_update_suppresses_outcome() {
        let sim = simulator(ScriptedDice::always_fail(), OutreachConfig::default());
        let problem = analyze_problem("Roof leak");
        let cancel = AtomicBool::new(false);
        let mut after_cancel = Vec::new();

        let done = sim
            .run(vendor(), &problem, &cancel, |v| {
                if cancel.load(Ordering::SeqCst) {
                    after_cancel.push(v.clone());
                    return;
                }
                let last = v.outreach_log.last().map(|a| a.status);
                if v.outreach_log.len() == 3 && last == Some(AttemptStatus::Delivered) {
                    cancel.store(true, Ordering::SeqCst);
                }
            })
            .await;

        assert!(after_cancel.is_empty());
        assert_eq!(done.outreach_status, OutreachStatus::InProgress);
        assert_eq!(done.outreach_log.len(), 3);
        assert_eq!(done.outreach_log[2].status, AttemptStatus::Delivered);
    }

    #[test]
    fn test_transitions_do_not_touch_input() {
        let original = vendor();
        let sent = record_sent(&begin(&original), OutreachChannel::Sms, "hi".into(), start());
        let replied = mark_replied(&mark_delivered(&sent), "Today 2-4 PM", "$89");

        assert_eq!(original.outreach_status, OutreachStatus::Pending);
        assert!(original.outreach_log.is_empty());
        assert_eq!(sent.outreach_log[0].status, AttemptStatus::Sent);
        assert_eq!(replied.outreach_log[0].status, AttemptStatus::Replied);
    }

    #[test]
    fn test_backward_transition_ignored() {
        let sent = record_sent(&vendor(), OutreachChannel::Email, "hi".into(), start());
        let failed = mark_attempt_failed(&mark_delivered(&sent));
        let again = mark_delivered(&failed);
        assert_eq!(again.outreach_log[0].status, AttemptStatus::Failed);
    }
}
