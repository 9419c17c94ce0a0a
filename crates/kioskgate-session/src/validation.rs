//! One bounded directory lookup per card.
//!
//! A validation is split in two steps so the caller can tell, without
//! waiting, whether it was admitted:
//!
//! ```text
//! Validator::begin(tag) ──Ok──→ Validation ──run().await──→ ValidationOutcome
//!        │
//!        └──Err(Busy)   (another validation holds the in-flight flag)
//! ```
//!
//! The [`Validation`] owns the [`FlightGuard`], so the flag is held exactly as
//! long as the validation exists. It is released when `run` resolves, or when
//! the validation is dropped unfinished.

use std::time::Duration;

use kioskgate_directory::{Directory, PendingLookup};

use crate::{FlightFlag, FlightGuard, SessionError, ValidationError, ValidationOutcome};

/// Upper bound on how long a validation waits for the directory.
pub const VALIDATION_CEILING: Duration = Duration::from_secs(10);

/// Tuning for a [`Validator`].
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// A lookup that has not completed after this long resolves as
    /// [`ValidationError::Timeout`].
    pub ceiling: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            ceiling: VALIDATION_CEILING,
        }
    }
}

/// Turns card tags into [`ValidationOutcome`]s, one at a time.
pub struct Validator<D: Directory> {
    directory: D,
    config: ValidatorConfig,
    flight: FlightFlag,
}

impl<D: Directory> Validator<D> {
    pub fn new(directory: D, config: ValidatorConfig) -> Self {
        Self {
            directory,
            config,
            flight: FlightFlag::new(),
        }
    }

    /// Returns `true` while a [`Validation`] from this validator exists.
    pub fn is_in_flight(&self) -> bool {
        self.flight.is_held()
    }

    /// Issues the directory lookup for `tag`.
    ///
    /// # Errors
    /// [`SessionError::Busy`] if a validation is already in flight. No lookup
    /// is issued in that case.
    pub fn begin(&self, tag: &str) -> Result<Validation, SessionError> {
        let guard = self.flight.try_acquire().ok_or_else(|| SessionError::Busy {
            tag: tag.to_owned(),
        })?;

        tracing::info!(%tag, "validating card");
        let lookup = self.directory.lookup(tag);

        Ok(Validation {
            tag: tag.to_owned(),
            lookup,
            ceiling: self.config.ceiling,
            _guard: guard,
        })
    }

    /// Validates `tag` from start to finish.
    pub async fn validate(&self, tag: &str) -> Result<ValidationOutcome, SessionError> {
        Ok(self.begin(tag)?.run().await)
    }
}

/// An admitted validation, holding the in-flight flag.
#[derive(Debug)]
pub struct Validation {
    tag: String,
    lookup: PendingLookup,
    ceiling: Duration,
    _guard: FlightGuard,
}

impl Validation {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Waits for the lookup, up to the ceiling, and resolves it.
    ///
    /// On timeout the lookup is dropped, which aborts its request.
    pub async fn run(self) -> ValidationOutcome {
        let Validation {
            tag,
            lookup,
            ceiling,
            _guard,
        } = self;

        let outcome = match tokio::time::timeout(ceiling, lookup.wait()).await {
            Ok(completion) => ValidationOutcome::from_completion(&tag, completion),
            Err(_) => ValidationOutcome::Error(ValidationError::Timeout(ceiling)),
        };

        match &outcome {
            ValidationOutcome::Valid(employee) => {
                let name = employee.display_name();
                tracing::info!(
                    %tag,
                    employee_id = employee.id,
                    name = name.as_deref(),
                    "card accepted"
                );
            }
            ValidationOutcome::Invalid(reason) => {
                tracing::warn!(%tag, %reason, "card rejected");
            }
            ValidationOutcome::Error(error) => {
                tracing::warn!(%tag, %error, "card validation failed");
            }
        }

        outcome
    }
}
