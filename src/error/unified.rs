//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Configuration,
    Usage,
    Job,
    Network,
    Timeout,
    Server,
    Api,
    Io,
    Serialization,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    LogInAgain,
    RequestAccess,
    RetryLater,
    IncreaseTimeout,
    CheckConfiguration,
    FixArguments,
    InspectJobLogs,
    ContactSupport,
}

impl RecoverySuggestion {
    /// Short user-facing hint, if there is anything useful to say.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::LogInAgain => Some("log in again; the session token is missing or expired"),
            Self::RequestAccess => Some("ask a study or project admin for access to this resource"),
            Self::RetryLater => Some("the server is unreachable or failing; retry later"),
            Self::IncreaseTimeout => Some("raise timeoutSecs in the client configuration"),
            Self::CheckConfiguration => Some("check the host and version in the client configuration"),
            Self::FixArguments => None,
            Self::InspectJobLogs => Some("inspect the job's logs on the server"),
            Self::ContactSupport => None,
        }
    }
}
