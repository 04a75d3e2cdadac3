use crate::generate::{GenerationError, USER_FAILURE_MESSAGE};
use crate::plan::{GenerationRequest, Plan};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Generating,
    Showing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("a lesson plan is already being generated")]
    Busy,
    #[error("no lesson plan has been generated")]
    NoPlan,
}

/// Tracks the one in-flight submission and the plan currently on display.
#[derive(Debug)]
pub struct Shell {
    phase: Phase,
    plan: Option<Plan>,
    error: Option<String>,
    pending: Option<(u64, GenerationRequest)>,
    next_ticket: u64,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            plan: None,
            error: None,
            pending: None,
            next_ticket: 1,
        }
    }
}

impl Shell {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_request(&self) -> Option<&GenerationRequest> {
        self.pending.as_ref().map(|(_, r)| r)
    }

    pub fn require_plan(&self) -> Result<&Plan, ShellError> {
        self.plan.as_ref().ok_or(ShellError::NoPlan)
    }

    /// Enters `Generating` and returns the ticket the outcome must be reported with.
    pub fn begin(&mut self, request: GenerationRequest) -> Result<u64, ShellError> {
        if self.phase == Phase::Generating {
            return Err(ShellError::Busy);
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        info!(ticket, topic = %request.topic, model = request.instructional_model.as_str(), "generation started");
        self.pending = Some((ticket, request));
        self.error = None;
        self.phase = Phase::Generating;
        Ok(ticket)
    }

    /// Applies a finished generation. Outcomes for any other ticket are dropped.
    pub fn complete(&mut self, ticket: u64, outcome: Result<Plan, GenerationError>) -> bool {
        match &self.pending {
            Some((t, _)) if *t == ticket => {}
            _ => return false,
        }
        self.pending = None;
        match outcome {
            Ok(plan) => {
                info!(ticket, topic = %plan.topic, "generation finished");
                self.plan = Some(plan);
                self.error = None;
                self.phase = Phase::Showing;
            }
            Err(e) => {
                error!(ticket, error = %e, "generation failed");
                self.error = Some(USER_FAILURE_MESSAGE.to_string());
                self.phase = Phase::Failed;
            }
        }
        true
    }

    pub fn discard(&mut self) -> Result<(), ShellError> {
        if self.phase == Phase::Generating {
            return Err(ShellError::Busy);
        }
        self.plan = None;
        self.error = None;
        self.phase = Phase::Idle;
        Ok(())
    }
}
