use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    /// In flight. `last_known` keeps the previous payload on screen until the
    /// new one replaces it.
    Pending { last_known: Option<T> },
    Succeeded(T),
    Failed(ConsoleError),
}

impl<T> RequestState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The payload to display: the fresh one, or the last known while pending.
    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Succeeded(payload) => Some(payload),
            Self::Pending { last_known } => last_known.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ConsoleError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// What `run` does when the operation is already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPolicy {
    /// The new start is a no-op; nothing is sent.
    #[default]
    IgnoreWhilePending,
    /// The new run supersedes the in-flight one, whose resolution is dropped.
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<T> {
    /// This run wrote its result into the lifecycle.
    Settled(ConsoleResult<T>),
    /// Another run was already pending; this one never started.
    AlreadyPending,
    /// The run resolved after being superseded; its result was discarded.
    Superseded,
}

impl<T> RunOutcome<T> {
    pub fn settled(self) -> Option<ConsoleResult<T>> {
        match self {
            Self::Settled(result) => Some(result),
            _ => None,
        }
    }
}

/// Tracks one operation through its states. Runs are stamped with a
/// generation and only the current generation may write a terminal state.
pub struct RequestLifecycle<T> {
    name: &'static str,
    policy: StartPolicy,
    state: watch::Sender<RequestState<T>>,
    // Only touched inside `watch` modify closures, which serialise access.
    generation: AtomicU64,
}

impl<T> RequestLifecycle<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(name: &'static str, policy: StartPolicy) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            name,
            policy,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> StartPolicy {
        self.policy
    }

    pub fn state(&self) -> RequestState<T> {
        self.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Receiver that is marked changed after every transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.state.subscribe()
    }

    /// Moves to `Pending`, awaits `operation` and records its result.
    ///
    /// `operation` is not polled unless the run actually starts, so an ignored
    /// start never reaches the network.
    pub async fn run<F>(&self, operation: F) -> RunOutcome<T>
    where
        F: Future<Output = ConsoleResult<T>>,
    {
        let policy = self.policy;
        let mut started = None;
        self.state.send_if_modified(|state| {
            if state.is_pending() && policy == StartPolicy::IgnoreWhilePending {
                return false;
            }
            let last_known = state.payload().cloned();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            started = Some(generation);
            *state = RequestState::Pending { last_known };
            true
        });

        let Some(generation) = started else {
            log::debug!("[{}] start ignored, request already pending", self.name);
            return RunOutcome::AlreadyPending;
        };
        log::debug!("[{}] generation {} pending", self.name, generation);

        // A run dropped mid-flight falls back like `cancel`.
        let mut guard = AbandonGuard {
            lifecycle: self,
            generation,
            armed: true,
        };
        let result = operation.await;
        guard.armed = false;

        let written = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = match &result {
                Ok(payload) => RequestState::Succeeded(payload.clone()),
                Err(e) => RequestState::Failed(e.clone()),
            };
            true
        });

        if !written {
            log::debug!(
                "[{}] dropping stale resolution of generation {}",
                self.name,
                generation
            );
            return RunOutcome::Superseded;
        }

        match &result {
            Ok(_) => log::debug!("[{}] generation {} succeeded", self.name, generation),
            Err(e) => log::warn!("[{}] generation {} failed: {}", self.name, generation, e),
        }
        RunOutcome::Settled(result)
    }

    /// Abandons the in-flight run, if any. The state falls back to the last
    /// known payload, or `Idle`. Returns whether a run was pending.
    pub fn cancel(&self) -> bool {
        self.abandon(None)
    }

    /// Falls back from `Pending` when `only` is `None` or still the current generation.
    fn abandon(&self, only: Option<u64>) -> bool {
        self.state.send_if_modified(|state| {
            if only.is_some_and(|g| g != self.generation.load(Ordering::SeqCst)) {
                return false;
            }
            let RequestState::Pending { last_known } = state else {
                return false;
            };
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = match last_known.take() {
                Some(payload) => RequestState::Succeeded(payload),
                None => RequestState::Idle,
            };
            true
        })
    }

    /// Forgets everything, including any in-flight run.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let changed = !state.is_idle();
            if changed {
                log::debug!("[{}] reset from {}", self.name, state.label());
            }
            *state = RequestState::Idle;
            changed
        });
    }
}

struct AbandonGuard<'a, T>
where
    T: Clone + Send + Sync,
{
    lifecycle: &'a RequestLifecycle<T>,
    generation: u64,
    armed: bool,
}

impl<T> Drop for AbandonGuard<'_, T>
where
    T: Clone + Send + Sync,
{
    fn drop(&mut self) {
        if self.armed && self.lifecycle.abandon(Some(self.generation)) {
            log::debug!(
                "[{}] generation {} dropped before settling",
                self.lifecycle.name,
                self.generation
            );
        }
    }
}
