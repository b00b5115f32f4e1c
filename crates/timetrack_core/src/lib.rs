//! Core domain logic for the time tracker.
//! This crate is the single source of truth for task time-accounting invariants.

pub mod clock;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use error::ErrorKind;
pub use format::format_duration;
pub use logging::{default_log_level, init_logging, LoggingGuard};
pub use model::period::{parse_calendar_date, PeriodError, PeriodQuery};
pub use model::person::{
    Passport, PassportError, Person, PersonFilter, PersonId, PersonPage, PersonPatch,
    PersonProfile,
};
pub use model::task::{PeriodTaskRow, Task, TaskId, TaskState, TaskSummary};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::person_service::{PersonService, PersonServiceError, PersonServiceResult};
pub use service::task_service::{StoppedTask, TaskService, TaskServiceError, TaskServiceResult};
