use std::time::Duration;
use thiserror::Error;

/// Local, pre-network field checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user is not logged in")]
    NotLoggedIn,

    #[error("please fill in all fields")]
    MissingFields,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("please enter a table name")]
    MissingTableName,

    #[error("please select a table type")]
    MissingTableType,

    #[error("open a table first")]
    NoTableOpen,

    #[error("please fill in the {0} field")]
    MissingItemField(&'static str),

    #[error("no item with id {0} in this table")]
    UnknownItem(String),

    #[error("fill in at least the date and the arrival time")]
    MissingDateOrArrival,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("time clock entries cannot be recorded for future dates")]
    FutureDate,

    #[error("invalid arrival time: {0}")]
    InvalidArrival(String),

    #[error("arrival time must not be after departure time")]
    ArrivalAfterDeparture,

    #[error("password reset form has {0} invalid field(s)")]
    ResetForm(usize),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{}", .message.as_deref().unwrap_or("request failed"))]
    Application { status: u16, message: Option<String> },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    pub fn application(status: u16, message: Option<String>) -> Self {
        Self::Application { status, message }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Server message for application failures, or `fallback` when absent.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Application { message: Some(message), .. } => message.clone(),
            Self::Application { message: None, .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_message_falls_back_when_absent() {
        let err = ClientError::application(200, None);
        assert_eq!(err.user_message("Error logging in"), "Error logging in");

        let err = ClientError::application(401, Some("bad credentials".into()));
        assert_eq!(err.user_message("Error logging in"), "bad credentials");
    }

    #[test]
    fn timeout_is_reported_in_millis() {
        let err = ClientError::Timeout(Duration::from_millis(15000));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "request timed out after 15000ms");
    }
}
