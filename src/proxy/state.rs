//! Per-request state machine.
//!
//! ```text
//! Idle → Validating → Rejected
//!                   → Sending → Succeeded | Failed(timeout | network | server)
//! ```
//!
//! Terminal states are reached exactly once; any further transition is
//! refused.

use std::fmt;

use thiserror::Error;

use crate::proxy::error::ProxyError;
use crate::proxy::types::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Validating,
    Sending,
    /// Terminal: a response descriptor was produced.
    Succeeded { status: u16 },
    /// Terminal: validation refused the request.
    Rejected,
    /// Terminal: the outbound call failed.
    Failed { kind: ErrorKind },
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Succeeded { .. } | RequestState::Rejected | RequestState::Failed { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Validating => "validating",
            RequestState::Sending => "sending",
            RequestState::Succeeded { .. } => "succeeded",
            RequestState::Rejected => "rejected",
            RequestState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: RequestState,
    pub to: RequestState,
}

impl From<InvalidTransition> for ProxyError {
    fn from(err: InvalidTransition) -> Self {
        ProxyError::Server(err.to_string())
    }
}

/// Tracks one request through its states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLifecycle {
    state: RequestState,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn begin_validation(&mut self) -> Result<(), InvalidTransition> {
        self.transition(RequestState::Validating)
    }

    pub fn begin_sending(&mut self) -> Result<(), InvalidTransition> {
        self.transition(RequestState::Sending)
    }

    pub fn succeed(&mut self, status: u16) -> Result<(), InvalidTransition> {
        self.transition(RequestState::Succeeded { status })
    }

    /// Move to the terminal state matching `err`.
    ///
    /// Validation errors reject from `Validating`; everything else fails from
    /// `Sending`. A failure raised while validating (e.g. an unreadable body)
    /// also counts as a rejection.
    pub fn fail(&mut self, err: &ProxyError) -> Result<(), InvalidTransition> {
        let next = match (self.state, err.kind()) {
            (RequestState::Validating, _) | (_, ErrorKind::Validation) => RequestState::Rejected,
            (_, kind) => RequestState::Failed { kind },
        };
        self.transition(next)
    }

    fn transition(&mut self, to: RequestState) -> Result<(), InvalidTransition> {
        let allowed = matches!(
            (self.state, to),
            (RequestState::Idle, RequestState::Validating)
                | (RequestState::Idle, RequestState::Rejected)
                | (RequestState::Validating, RequestState::Rejected)
                | (RequestState::Validating, RequestState::Sending)
                | (RequestState::Sending, RequestState::Succeeded { .. })
                | (RequestState::Sending, RequestState::Failed { .. })
        );
        if !allowed {
            return Err(InvalidTransition { from: self.state, to });
        }
        self.state = to;
        Ok(())
    }
}
