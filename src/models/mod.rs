pub mod booking;
pub mod event;
pub mod location;
pub mod problem;
pub mod transcription;
pub mod vendor;

pub use booking::{BookingChannel, BookingLogEntry, BookingRecord, BookingResult, BookingStatus};
pub use event::SimulationEvent;
pub use location::ZipLocation;
pub use problem::{Category, ProblemSummary, Urgency};
pub use transcription::{TranscribedWord, TranscriptionConfig, TranscriptionResult};
pub use vendor::{
    AttemptStatus, OutreachAttempt, OutreachChannel, OutreachStatus, VendorData, VendorSource,
};
