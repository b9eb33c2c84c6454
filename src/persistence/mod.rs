use crate::calendar::CalendarError;
use crate::node_validation;
use crate::plan::Plan;
use crate::timeline::TimelineError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    Calendar(CalendarError),
    Timeline(TimelineError),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::Calendar(err) => write!(f, "calendar error: {err}"),
            PersistenceError::Timeline(err) => write!(f, "timeline error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no plan stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<CalendarError> for PersistenceError {
    fn from(value: CalendarError) -> Self {
        Self::Calendar(value)
    }
}

impl From<TimelineError> for PersistenceError {
    fn from(value: TimelineError) -> Self {
        Self::Timeline(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<Plan>>;
}

pub fn validate_plan(plan: &Plan) -> PersistenceResult<()> {
    node_validation::validate_timeline(plan.timeline())
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
pub mod range_report;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{load_plan_from_json, save_plan_to_json};
pub use range_report::export_ranges_to_csv;
