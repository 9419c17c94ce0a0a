//! The session state machine.
//!
//! ```text
//!            tag gained                 Valid
//!   Idle ─────────────────→ Validating ───────→ Authenticated
//!    ↑                          │                    │
//!    └──── Invalid / Error ─────┘                    │ other tag gained
//!                                                    ↓
//!                                               Validating
//! ```
//!
//! Removing the card does not log the employee off. The session only
//! changes when another validation resolves: a valid card replaces the
//! employee, anything else clears it.

use kioskgate_directory::{Directory, Employee};

use crate::{SessionError, Validation, ValidationOutcome, Validator};

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nobody is logged on and no card is being checked.
    Idle,
    /// A validation is in flight.
    Validating,
    /// An employee is logged on.
    Authenticated,
}

/// A snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The card most recently admitted for validation, or the card the
    /// current employee logged on with.
    pub current_tag: Option<String>,
    pub current_employee: Option<Employee>,
    pub in_flight: bool,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        Phase::of(self.in_flight, self.current_employee.is_some())
    }
}

impl Phase {
    /// A validation in flight takes precedence over a logged-on employee.
    fn of(in_flight: bool, signed_on: bool) -> Self {
        if in_flight {
            Self::Validating
        } else if signed_on {
            Self::Authenticated
        } else {
            Self::Idle
        }
    }
}

/// What to do about a card that entered the field.
#[derive(Debug)]
pub enum Admission {
    /// Run this validation and hand its outcome to
    /// [`SessionGate::resolve`].
    Start(Validation),
    /// A validation is already running. The card is ignored.
    Busy,
    /// The card belongs to the employee already logged on. Nothing to do.
    AlreadySignedOn,
}

/// Owns the validator and the "who is logged on" state.
pub struct SessionGate<D: Directory> {
    validator: Validator<D>,
    current_tag: Option<String>,
    current_employee: Option<Employee>,
}

impl<D: Directory> SessionGate<D> {
    pub fn new(validator: Validator<D>) -> Self {
        Self {
            validator,
            current_tag: None,
            current_employee: None,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::of(self.validator.is_in_flight(), self.current_employee.is_some())
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            current_tag: self.current_tag.clone(),
            current_employee: self.current_employee.clone(),
            in_flight: self.validator.is_in_flight(),
        }
    }

    pub fn current_employee(&self) -> Option<&Employee> {
        self.current_employee.as_ref()
    }

    pub fn current_tag(&self) -> Option<&str> {
        self.current_tag.as_deref()
    }

    /// Handles a card entering the field.
    pub fn on_tag_gained(&mut self, tag: &str) -> Admission {
        if self.validator.is_in_flight() {
            tracing::debug!(%tag, "validation in flight, card ignored");
            return Admission::Busy;
        }
        if self
            .current_employee
            .as_ref()
            .is_some_and(|employee| employee.rfid_tag == tag)
        {
            tracing::debug!(%tag, "card already signed on");
            return Admission::AlreadySignedOn;
        }

        match self.validator.begin(tag) {
            Ok(validation) => {
                self.current_tag = Some(tag.to_owned());
                Admission::Start(validation)
            }
            Err(SessionError::Busy { .. }) => Admission::Busy,
        }
    }

    /// Handles a card leaving the field. The session is unaffected.
    pub fn on_tag_lost(&mut self, tag: &str) {
        tracing::debug!(%tag, phase = ?self.phase(), "card left the field");
    }

    /// Applies a validation outcome for `tag`.
    ///
    /// Returns the newly logged-on employee when the card was accepted.
    pub fn resolve(&mut self, tag: &str, outcome: ValidationOutcome) -> Option<&Employee> {
        match outcome {
            ValidationOutcome::Valid(employee) => {
                self.current_tag = Some(tag.to_owned());
                self.current_employee = Some(employee);
                self.current_employee.as_ref()
            }
            ValidationOutcome::Invalid(_) | ValidationOutcome::Error(_) => {
                if let Some(previous) = self.current_employee.take() {
                    tracing::info!(employee_id = previous.id, "employee logged off");
                }
                self.current_tag = None;
                None
            }
        }
    }
}
