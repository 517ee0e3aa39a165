use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no schedule entries could be parsed from the suggestion")]
    ParseYieldedNothing,

    #[error("an event with id {0} already exists")]
    DuplicateId(String),
}
