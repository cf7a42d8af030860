//! Read, compute, write orchestration around the streak store.

pub mod orchestrator;
pub mod view;

pub use orchestrator::{ActivityEvent, RecordOutcome, StreakError, StreakOrchestrator};
pub use view::{StreakSummary, StreakView};
