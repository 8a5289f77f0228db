//! Request Lifecycle Controller
//!
//! Every remote operation the engine performs (sending a chat turn, listing,
//! uploading and deleting documents, running a search) follows the same
//! shape: mark the operation in flight, run it, then reconcile local state
//! with either the payload or a fallback. [`RequestController`] is that shape,
//! written once and reused per channel.
//!
//! # State Machine
//!
//! ```text
//!            start()                 exec Ok(payload)
//!   Idle ─────────────► Pending ──────────────────────► Succeeded(payload)
//!    ▲                     │                                  │
//!    │                     │ exec Err(e)                      │ on_success(payload)
//!    │                     ▼                                  │
//!    │               Failed(reason) ── on_failure(reason) ────┤
//!    │                                                        │
//!    └────────────────────────────────────────────────────────┘
//! ```
//!
//! A channel that is `Pending` rejects further starts: the second `exec` is
//! never invoked. This is what keeps responses on one channel in issue order
//! without request ids or cancellation.
//!
//! # Usage
//!
//! ```
//! use docdesk_engine::lifecycle::{RequestController, StartOutcome};
//!
//! # tokio_test::block_on(async {
//! let controller = RequestController::new();
//! let mut replies = Vec::new();
//!
//! let outcome = controller
//!     .start(
//!         "chat",
//!         "hello".to_string(),
//!         |query| async move { Ok::<_, std::io::Error>(format!("echo: {query}")) },
//!         |reply| replies.push(reply),
//!         |_failure| {},
//!     )
//!     .await;
//!
//! assert_eq!(outcome, StartOutcome::Succeeded);
//! assert_eq!(replies, vec!["echo: hello".to_string()]);
//! assert!(!controller.is_pending("chat"));
//! # });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

use parking_lot::Mutex;

/// Normalized failure reason
///
/// Transport errors, non-success statuses and malformed bodies all collapse
/// into this one human-readable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    message: String,
}

impl Failure {
    /// Create a failure from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Normalize any displayable error
    pub fn from_error(error: &impl fmt::Display) -> Self {
        Self::new(error.to_string())
    }

    /// The human-readable reason
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

/// State of one channel
#[derive(Clone, Debug, PartialEq)]
pub enum OperationState<T> {
    /// Nothing in flight
    Idle,
    /// An operation has started and not yet resolved
    Pending,
    /// The operation resolved with a payload (handlers are running)
    Succeeded(T),
    /// The operation failed (handlers are running)
    Failed(Failure),
}

impl<T> OperationState<T> {
    /// Whether an operation is in flight
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the operation has resolved one way or the other
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Short label for logs and status lines
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What a call to [`RequestController::start`] ended up doing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The channel was already pending; nothing was executed
    Rejected,
    /// The operation ran and the success handler was invoked
    Succeeded,
    /// The operation ran and the failure handler was invoked
    Failed(Failure),
}

impl StartOutcome {
    /// Whether the operation ran and succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Whether the start was rejected because the channel was busy
    #[must_use]
    pub fn was_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Per-channel request lifecycle state machine
///
/// `C` is the channel identifier, typically a small `Copy` enum owned by the
/// session that drives the controller. Payloads are handed to the success
/// handler, so the stored snapshot only records which state a channel is in.
pub struct RequestController<C> {
    states: Mutex<HashMap<C, OperationState<()>>>,
}

impl<C> Default for RequestController<C>
where
    C: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for RequestController<C>
where
    C: Copy + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestController")
            .field("states", &*self.states.lock())
            .finish()
    }
}

impl<C> RequestController<C>
where
    C: Copy + Eq + Hash + fmt::Debug,
{
    /// Create a controller with every channel idle
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `channel` has an operation in flight
    #[must_use]
    pub fn is_pending(&self, channel: C) -> bool {
        self.state(channel).is_pending()
    }

    /// Current state of `channel`
    #[must_use]
    pub fn state(&self, channel: C) -> OperationState<()> {
        self.states
            .lock()
            .get(&channel)
            .cloned()
            .unwrap_or(OperationState::Idle)
    }

    /// Run one operation on `channel`
    ///
    /// If `channel` is already pending the call is rejected and `exec` is
    /// never invoked. Otherwise the channel moves to `Pending`, `exec` runs
    /// with `request`, and exactly one of `on_success` / `on_failure` is
    /// invoked with the result before the channel returns to `Idle`.
    ///
    /// If the returned future is dropped while `exec` is in flight, the
    /// channel is returned to `Idle` and neither handler runs.
    pub async fn start<Req, Res, Err, Exec, Fut, OnOk, OnErr>(
        &self,
        channel: C,
        request: Req,
        exec: Exec,
        on_success: OnOk,
        on_failure: OnErr,
    ) -> StartOutcome
    where
        Exec: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<Res, Err>>,
        Err: fmt::Display,
        OnOk: FnOnce(Res),
        OnErr: FnOnce(&Failure),
    {
        if !self.try_begin(channel) {
            tracing::debug!(channel = ?channel, "Rejected start: channel already pending");
            return StartOutcome::Rejected;
        }

        let _idle = IdleOnDrop {
            controller: self,
            channel,
        };
        tracing::debug!(channel = ?channel, "Operation pending");

        match exec(request).await {
            Ok(payload) => {
                self.set(channel, OperationState::Succeeded(()));
                tracing::debug!(channel = ?channel, "Operation succeeded");
                on_success(payload);
                StartOutcome::Succeeded
            }
            Err(error) => {
                let failure = Failure::from_error(&error);
                tracing::warn!(channel = ?channel, error = %failure, "Operation failed");
                self.set(channel, OperationState::Failed(failure.clone()));
                on_failure(&failure);
                StartOutcome::Failed(failure)
            }
        }
    }

    /// Atomically move `channel` to `Pending` unless it already is
    fn try_begin(&self, channel: C) -> bool {
        let mut states = self.states.lock();
        let state = states.entry(channel).or_insert(OperationState::Idle);
        if state.is_pending() {
            return false;
        }
        *state = OperationState::Pending;
        true
    }

    fn set(&self, channel: C, state: OperationState<()>) {
        self.states.lock().insert(channel, state);
    }
}

/// Returns a channel to `Idle` when the operation ends, however it ends
struct IdleOnDrop<'a, C>
where
    C: Copy + Eq + Hash + fmt::Debug,
{
    controller: &'a RequestController<C>,
    channel: C,
}

impl<C> Drop for IdleOnDrop<'_, C>
where
    C: Copy + Eq + Hash + fmt::Debug,
{
    fn drop(&mut self) {
        self.controller.set(self.channel, OperationState::Idle);
    }
}
