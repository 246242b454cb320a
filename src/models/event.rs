use serde::Serialize;

use super::{BookingLogEntry, VendorData};

/// Live progress published to event stream subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationEvent {
    VendorUpdated { run_id: String, vendor: VendorData },
    OutreachFinished { run_id: String, vendor_id: String },
    BookingLog { vendor_id: String, entry: BookingLogEntry },
}
