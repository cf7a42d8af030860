pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use clock::{ActivityClock, ClockError, FixedClock, SystemClock};
pub use config::{Config, StoreBackend};
pub use db::{init_db, Repository};
pub use domain::{CellState, DayCell, StreakRecord, StreakSnapshot, UserId};
pub use engine::{Milestone, StreakEngine, StreakUpdate, Transition};
pub use error::AppError;
pub use orchestration::{
    ActivityEvent, RecordOutcome, StreakError, StreakOrchestrator, StreakSummary, StreakView,
};
pub use store::{HttpStreakStore, MemoryStreakStore, StoreError, StreakStore};
