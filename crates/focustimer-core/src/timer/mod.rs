mod engine;
mod scheduler;
mod session;

pub use engine::{SessionTimer, AUTO_START_COUNTDOWN, REMAINING_NOTICES};
pub use scheduler::{Scheduler, TaskId, TaskKind};
pub use session::{format_clock, Session, SessionInfo, SessionType, TimerState};
