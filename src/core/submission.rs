use crate::domain::model::{Coordinate, PinEntry, PinInput};
use crate::domain::ports::PinApi;
use crate::utils::error::{PinMapError, Result};
use crate::utils::validation::{parse_experience, validate_non_empty_string};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    AwaitingInput { at: Coordinate },
    Validating { at: Coordinate },
    Submitting { pin: PinEntry },
    Succeeded { pin: PinEntry },
    Failed { reason: String },
}

/// Click-to-add state machine. One write call per accepted input, no retry.
#[derive(Debug)]
pub struct SubmissionFlow {
    state: SubmissionState,
}

impl Default for SubmissionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionFlow {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SubmissionState::Idle)
    }

    /// A map click. Rejected while another submission is still open.
    pub fn begin(&mut self, at: Coordinate) -> Result<()> {
        if !self.is_idle() {
            tracing::warn!("Ignoring map click at {:?}: submission in progress", at);
            return Err(PinMapError::SubmissionInProgress);
        }
        self.transition(SubmissionState::AwaitingInput { at });
        Ok(())
    }

    /// The user dismissed the input form.
    pub fn cancel(&mut self) {
        if matches!(self.state, SubmissionState::AwaitingInput { .. }) {
            self.transition(SubmissionState::Idle);
        }
    }

    /// Validates the collected attributes. On failure the flow is back to
    /// `Idle` and the error says which field was wrong.
    pub fn provide(&mut self, input: PinInput) -> Result<PinEntry> {
        let at = match self.state {
            SubmissionState::AwaitingInput { at } => at,
            _ => {
                return Err(PinMapError::validation(
                    "state",
                    "no map location is awaiting input",
                ))
            }
        };
        self.transition(SubmissionState::Validating { at });

        match validate_input(at, input) {
            Ok(pin) => {
                self.transition(SubmissionState::Submitting { pin: pin.clone() });
                Ok(pin)
            }
            Err(e) => {
                tracing::info!("Pin input rejected: {}", e);
                self.transition(SubmissionState::Idle);
                Err(e)
            }
        }
    }

    /// Sends the validated pin once and records the outcome.
    pub async fn submit<A: PinApi + ?Sized>(&mut self, api: &A) -> Result<PinEntry> {
        let pin = match &self.state {
            SubmissionState::Submitting { pin } => pin.clone(),
            _ => {
                return Err(PinMapError::validation(
                    "state",
                    "no validated pin is ready to submit",
                ))
            }
        };

        match api.submit_pin(&pin).await {
            Ok(()) => {
                self.transition(SubmissionState::Succeeded { pin: pin.clone() });
                Ok(pin)
            }
            Err(e) => {
                tracing::warn!("Pin submission failed: {}", e);
                self.transition(SubmissionState::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Returns to `Idle` after a terminal state.
    pub fn finish(&mut self) {
        if matches!(
            self.state,
            SubmissionState::Succeeded { .. } | SubmissionState::Failed { .. }
        ) {
            self.transition(SubmissionState::Idle);
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        tracing::debug!("Submission state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn validate_input(at: Coordinate, input: PinInput) -> Result<PinEntry> {
    if !at.is_valid() {
        return Err(PinMapError::validation(
            "location",
            format!("({}, {}) is outside the map", at.lat, at.lon),
        ));
    }

    let job = input.job.trim();
    validate_non_empty_string("job", job)?;
    let exp = parse_experience("exp", &input.exp)?;
    let url = input.url.trim();
    validate_non_empty_string("url", url)?;

    Ok(PinEntry {
        lat: at.lat,
        lon: at.lon,
        job: job.to_string(),
        exp,
        url: url.to_string(),
    })
}
