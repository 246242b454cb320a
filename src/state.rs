use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::{SimulationEvent, VendorData};
use crate::services::ai::TextModel;
use crate::services::booking::BookingSimulator;
use crate::services::outreach::OutreachSimulator;
use crate::services::places::PlacesProvider;
use crate::services::random::{Clock, Dice};
use crate::services::rate_limit::RateLimiter;
use crate::services::speech::SpeechToText;

/// How long a finished run stays readable before it is pruned.
pub const RUN_RETENTION_MINUTES: i64 = 30;

/// Latest vendor snapshots of one outreach run.
pub struct OutreachRun {
    pub cancel: Arc<AtomicBool>,
    pub vendors: Vec<VendorData>,
    /// Vendor tasks still running.
    pub remaining: usize,
    pub finished_at: Option<NaiveDateTime>,
}

impl OutreachRun {
    pub fn new(cancel: Arc<AtomicBool>, vendors: Vec<VendorData>) -> Self {
        Self {
            cancel,
            remaining: vendors.len(),
            vendors,
            finished_at: None,
        }
    }

    /// Records that one vendor task ended. The run is finished once all have.
    pub fn finish_vendor(&mut self, now: NaiveDateTime) {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 && self.finished_at.is_none() {
            self.finished_at = Some(now);
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.finished_at
            .is_some_and(|at| now - at >= Duration::minutes(RUN_RETENTION_MINUTES))
    }

    /// Replaces the stored snapshot for the vendor with the same id.
    pub fn merge(&mut self, snapshot: &VendorData) {
        if let Some(slot) = self.vendors.iter_mut().find(|v| v.id == snapshot.id) {
            *slot = snapshot.clone();
        }
    }
}

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub speech: Option<Box<dyn SpeechToText>>,
    pub places: Option<Box<dyn PlacesProvider>>,
    pub text_model: Option<Box<dyn TextModel>>,
    pub dice: Arc<dyn Dice>,
    pub clock: Arc<dyn Clock>,
    pub limiter: RateLimiter,
    pub runs: Mutex<HashMap<String, OutreachRun>>,
    pub events_tx: broadcast::Sender<SimulationEvent>,
}

impl AppState {
    pub fn outreach_simulator(&self) -> OutreachSimulator {
        OutreachSimulator::new(self.dice.clone(), self.clock.clone(), self.config.outreach())
    }

    pub fn booking_simulator(&self) -> BookingSimulator {
        BookingSimulator::new(self.dice.clone(), self.clock.clone(), self.config.booking())
    }

    /// Drops runs that finished more than the retention window ago.
    pub fn prune_runs(&self) -> usize {
        let now = self.clock.now();
        match self.runs.lock() {
            Ok(mut runs) => prune_expired(&mut runs, now),
            Err(_) => 0,
        }
    }
}

fn prune_expired(runs: &mut HashMap<String, OutreachRun>, now: NaiveDateTime) -> usize {
    let before = runs.len();
    runs.retain(|_, run| !run.is_expired(now));
    before - runs.len()
}
