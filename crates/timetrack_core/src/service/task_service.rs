//! Task lifecycle engine.
//!
//! # Responsibility
//! - Enforce the `Created -> Started -> Stopped` state machine.
//! - Compute elapsed time when a task stops.
//! - Produce period reports with formatted durations.
//!
//! # Invariants
//! - No task state is cached between calls; every transition re-reads the
//!   task before validating it.
//! - Writes go through the store's conditional updates, so a caller that
//!   loses a race sees `Conflict` instead of overwriting.
//! - Recorded durations are never negative.

use crate::clock::Clock;
use crate::error::ErrorKind;
use crate::format::format_duration;
use crate::model::period::{PeriodError, PeriodQuery};
use crate::model::person::PersonId;
use crate::model::task::{Task, TaskId, TaskState, TaskSummary};
use crate::repo::person_repo::PersonRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task lifecycle operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Task name is blank after trim.
    InvalidName,
    /// Reporting period is malformed.
    InvalidPeriod(PeriodError),
    /// Owning person does not exist.
    PersonNotFound(PersonId),
    /// Task does not exist.
    TaskNotFound(TaskId),
    /// Start time is already recorded.
    AlreadyStarted(TaskId),
    /// End time is already recorded.
    AlreadyStopped(TaskId),
    /// Stop requested before the task was started.
    NotStarted(TaskId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl TaskServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName | Self::InvalidPeriod(_) => ErrorKind::Validation,
            Self::PersonNotFound(_) | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyStarted(_) | Self::AlreadyStopped(_) => ErrorKind::Conflict,
            Self::NotStarted(_) => ErrorKind::PreconditionFailed,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "task name must not be blank"),
            Self::InvalidPeriod(err) => write!(f, "{err}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::AlreadyStarted(id) => write!(f, "task {id} already has a start time"),
            Self::AlreadyStopped(id) => write!(f, "task {id} already has an end time"),
            Self::NotStarted(id) => write!(f, "task {id} has not been started"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPeriod(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PeriodError> for TaskServiceError {
    fn from(value: PeriodError) -> Self {
        Self::InvalidPeriod(value)
    }
}

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Outcome of a successful stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoppedTask {
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
}

/// Use-case service for task time accounting.
pub struct TaskService<T: TaskRepository, P: PersonRepository, C: Clock> {
    tasks: T,
    persons: P,
    clock: C,
}

impl<T: TaskRepository, P: PersonRepository, C: Clock> TaskService<T, P, C> {
    pub fn new(tasks: T, persons: P, clock: C) -> Self {
        Self {
            tasks,
            persons,
            clock,
        }
    }

    /// Creates an unstarted task owned by `person_id`.
    ///
    /// # Errors
    /// - `InvalidName` when `name` is blank.
    /// - `PersonNotFound` when the owner does not exist.
    pub fn create_task(&self, person_id: PersonId, name: &str) -> TaskServiceResult<TaskId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskServiceError::InvalidName);
        }
        if !self.persons.exists(person_id)? {
            debug!("event=task_create module=service status=rejected reason=person_not_found person_id={person_id}");
            return Err(TaskServiceError::PersonNotFound(person_id));
        }

        let task_id = self.tasks.insert_task(person_id, name)?;
        info!("event=task_create module=service status=ok person_id={person_id} task_id={task_id}");
        Ok(task_id)
    }

    pub fn get_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.load(task_id)
    }

    /// Records the start time as the current wall-clock time.
    ///
    /// # Errors
    /// - `TaskNotFound` when the task does not exist.
    /// - `AlreadyStarted` when a start time is recorded, including when a
    ///   concurrent caller recorded it first.
    pub fn start_task(&self, task_id: TaskId) -> TaskServiceResult<DateTime<Utc>> {
        let task = self.load(task_id)?;
        if task.state() != TaskState::Created {
            debug!("event=task_start module=service status=rejected reason=already_started task_id={task_id}");
            return Err(TaskServiceError::AlreadyStarted(task_id));
        }

        let started_at = self.now();
        if !self.tasks.set_start(task_id, started_at)? {
            // Lost the race: the re-read decides between a deleted task and a
            // start recorded by someone else.
            self.load(task_id)?;
            return Err(TaskServiceError::AlreadyStarted(task_id));
        }

        info!("event=task_start module=service status=ok task_id={task_id}");
        Ok(started_at)
    }

    /// Records the end time and fixes the elapsed duration.
    ///
    /// # Errors
    /// - `TaskNotFound` when the task does not exist.
    /// - `NotStarted` when no start time is recorded.
    /// - `AlreadyStopped` when an end time is recorded.
    pub fn stop_task(&self, task_id: TaskId) -> TaskServiceResult<StoppedTask> {
        let task = self.load(task_id)?;
        let started_at = match (task.started_at, task.state()) {
            (_, TaskState::Stopped) => {
                debug!("event=task_stop module=service status=rejected reason=already_stopped task_id={task_id}");
                return Err(TaskServiceError::AlreadyStopped(task_id));
            }
            (Some(started_at), TaskState::Started) => started_at,
            _ => {
                debug!("event=task_stop module=service status=rejected reason=not_started task_id={task_id}");
                return Err(TaskServiceError::NotStarted(task_id));
            }
        };

        let ended_at = self.now().max(started_at);
        let duration_secs = (ended_at - started_at).num_seconds().max(0);
        if !self.tasks.set_end(task_id, ended_at, duration_secs)? {
            let current = self.load(task_id)?;
            return Err(match current.state() {
                TaskState::Created => TaskServiceError::NotStarted(task_id),
                TaskState::Started | TaskState::Stopped => TaskServiceError::AlreadyStopped(task_id),
            });
        }

        info!("event=task_stop module=service status=ok task_id={task_id} duration_secs={duration_secs}");
        Ok(StoppedTask {
            ended_at,
            duration_secs,
        })
    }

    /// Stopped tasks of the person inside `period`, longest first.
    pub fn tasks_for_period(&self, period: &PeriodQuery) -> TaskServiceResult<Vec<TaskSummary>> {
        let rows = self.tasks.query_by_person_and_period(period)?;
        let summaries = rows
            .into_iter()
            .map(|row| {
                let duration_secs = u64::try_from(row.duration_secs).unwrap_or(0);
                TaskSummary {
                    name: row.name,
                    all_time: format_duration(duration_secs),
                    duration_secs,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "event=task_report module=service status=ok person_id={} count={}",
            period.person_id(),
            summaries.len()
        );
        Ok(summaries)
    }

    /// Same as [`Self::tasks_for_period`], built from optional calendar dates.
    ///
    /// A missing start means "from the beginning", a missing end means "now".
    pub fn tasks_for_dates(
        &self,
        person_id: PersonId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> TaskServiceResult<Vec<TaskSummary>> {
        let period = PeriodQuery::from_dates(person_id, start, end, self.clock.now())?;
        self.tasks_for_period(&period)
    }

    /// Millisecond precision, matching what the store keeps.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    fn load(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.tasks
            .get_task(task_id)?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }
}
