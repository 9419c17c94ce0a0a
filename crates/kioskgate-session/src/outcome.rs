//! What a validation resolves to.

use std::fmt;
use std::time::Duration;

use kioskgate_directory::{DirectoryResponse, Employee, LookupCompletion};

/// The single result of validating one card.
///
/// `Invalid` and `Error` are kept apart on purpose: `Invalid` means the
/// directory answered and the card is not an employee's, `Error` means we
/// could not find out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Exactly one employee holds the card.
    Valid(Employee),

    /// The directory answered, and the answer does not log anyone on.
    Invalid(Rejection),

    /// The directory could not give an answer.
    Error(ValidationError),
}

/// Why a card the directory answered for was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No employee holds the card.
    NoMatch,

    /// More than one record matched. The kiosk cannot guess which.
    Ambiguous { count: u64 },

    /// The one record that came back belongs to a different card.
    TagMismatch { returned: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no employee holds this card"),
            Self::Ambiguous { count } => {
                write!(f, "{count} employees match this card")
            }
            Self::TagMismatch { returned } => {
                write!(f, "directory returned card {returned}")
            }
        }
    }
}

/// Why no answer was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("directory unreachable: {0}")]
    Transport(String),

    #[error("directory protocol failure: {0}")]
    Protocol(String),

    #[error("no directory answer within {0:?}")]
    Timeout(Duration),
}

impl ValidationOutcome {
    /// Resolves a lookup completion for `tag`.
    pub fn from_completion(tag: &str, completion: LookupCompletion) -> Self {
        match completion {
            LookupCompletion::Success(payload) => Self::classify(tag, payload),
            LookupCompletion::TransportError(detail) => {
                Self::Error(ValidationError::Transport(detail))
            }
            LookupCompletion::ProtocolFailure(detail) => {
                Self::Error(ValidationError::Protocol(detail))
            }
        }
    }

    fn classify(tag: &str, mut payload: DirectoryResponse) -> Self {
        match payload.count {
            0 => Self::Invalid(Rejection::NoMatch),
            1 if payload.results.len() == 1 => match payload.results.pop() {
                Some(employee) if employee.rfid_tag == tag => Self::Valid(employee),
                Some(employee) => Self::Invalid(Rejection::TagMismatch {
                    returned: employee.rfid_tag,
                }),
                None => Self::missing_record(),
            },
            1 => Self::missing_record(),
            count => Self::Invalid(Rejection::Ambiguous { count }),
        }
    }

    fn missing_record() -> Self {
        Self::Error(ValidationError::Protocol(
            "count of 1 without exactly one record".into(),
        ))
    }

    /// The employee, if the card was accepted.
    pub fn employee(&self) -> Option<&Employee> {
        match self {
            Self::Valid(employee) => Some(employee),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// A short label for logs: `"valid"`, `"invalid"` or `"error"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Valid(_) => "valid",
            Self::Invalid(_) => "invalid",
            Self::Error(_) => "error",
        }
    }
}
