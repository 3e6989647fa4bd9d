use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use crate::backend::GenerativeBackend;
use crate::client::{EnhanceError, EnhancementClient, EnhancementRequest, EnhancementResult};
use crate::config::ConfigSource;
use crate::options::EnhancementOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    AwaitingOptions,
    Running,
    Succeeded,
    Failed,
}

impl SessionState {
    pub fn can_transition_to(self, next: Self) -> bool {
        use SessionState::{AwaitingOptions, Failed, Idle, Running, Succeeded};

        matches!(
            (self, next),
            (Idle, AwaitingOptions)
                | (AwaitingOptions, Running)
                | (AwaitingOptions, Idle)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Succeeded, AwaitingOptions)
                | (Succeeded, Idle)
                | (Failed, AwaitingOptions)
                | (Failed, Idle)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Completed,
    // Generate is only accepted in AwaitingOptions; anywhere else it is a
    // no-op and no outbound request is made.
    Ignored,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a request is already running; wait for it to settle before selecting a new image")]
    Busy,
    #[error(transparent)]
    Enhance(#[from] EnhanceError),
}

// Single-session orchestration: owns the selected source, the options, and
// the held result. At most one request is in flight, enforced by the state
// machine rather than a queue.
pub struct SessionController<C, B> {
    client: EnhancementClient<C, B>,
    state: SessionState,
    source_image: Option<Vec<u8>>,
    options: EnhancementOptions,
    result: Option<EnhancementResult>,
    last_error: Option<String>,
}

impl<C, B> SessionController<C, B>
where
    C: ConfigSource,
    B: GenerativeBackend,
{
    pub fn new(client: EnhancementClient<C, B>) -> Self {
        Self {
            client,
            state: SessionState::Idle,
            source_image: None,
            options: EnhancementOptions::default(),
            result: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &EnhancementOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EnhancementOptions {
        &mut self.options
    }

    pub fn result(&self) -> Option<&EnhancementResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn select_source(&mut self, source_image: Vec<u8>) -> Result<(), SessionError> {
        if self.state == SessionState::Running {
            return Err(SessionError::Busy);
        }
        self.release_result();
        // Replacing the source drops the previous blob.
        self.source_image = Some(source_image);
        self.last_error = None;
        self.enter(SessionState::AwaitingOptions);
        Ok(())
    }

    pub fn generate(&mut self) -> Result<GenerateOutcome, SessionError> {
        if self.state != SessionState::AwaitingOptions {
            debug!(state = ?self.state, "generate ignored outside AwaitingOptions");
            return Ok(GenerateOutcome::Ignored);
        }
        let Some(source_image) = self.source_image.as_ref() else {
            return Ok(GenerateOutcome::Ignored);
        };

        let request = EnhancementRequest::new(source_image.clone(), self.options.clone());
        self.enter(SessionState::Running);
        let started = Instant::now();

        match self.client.enhance(&request) {
            Ok(mut result) => {
                result.elapsed_millis = started.elapsed().as_millis() as u64;
                self.release_result();
                self.result = Some(result);
                self.enter(SessionState::Succeeded);
                Ok(GenerateOutcome::Completed)
            }
            Err(error) => {
                // Source and options are preserved so the user can retry
                // without re-uploading.
                self.last_error = Some(error.to_string());
                self.enter(SessionState::Failed);
                self.enter(SessionState::AwaitingOptions);
                Err(SessionError::Enhance(error))
            }
        }
    }

    pub fn start_new(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Running {
            return Err(SessionError::Busy);
        }
        self.release_result();
        self.source_image = None;
        self.options = EnhancementOptions::default();
        self.last_error = None;
        self.enter(SessionState::Idle);
        Ok(())
    }

    fn release_result(&mut self) {
        // Explicit release of the stale displayable handle.
        self.result = None;
    }

    fn enter(&mut self, next: SessionState) {
        debug_assert!(
            self.state == next || self.state.can_transition_to(next),
            "invalid session transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }
}
