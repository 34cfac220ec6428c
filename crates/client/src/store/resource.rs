//! The request lifecycle shared by every slice.
//!
//! [`AsyncResource`] is the state machine (`Idle → Pending → Fulfilled |
//! Rejected`) around a slice's data. [`Slice`] publishes it on a `watch`
//! channel and drives one backend call through it.

use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ClientError, add_breadcrumb};

/// Where a resource is in its request lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Nothing requested yet, or the last request was unauthorized.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request to settle succeeded.
    Fulfilled,
    /// The last request to settle failed; see the error message.
    Rejected,
}

impl Lifecycle {
    /// Lowercase name, for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data plus the state of the request that last touched it.
///
/// A rejection never touches `data`. A new request clears the previous
/// error. `generation` counts requests started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsyncResource<T> {
    data: T,
    lifecycle: Lifecycle,
    error: Option<String>,
    generation: u64,
    /// Requests up to this generation were started before the last reset.
    reset_at: u64,
}

impl<T> AsyncResource<T> {
    /// An idle resource holding `data`.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            data,
            lifecycle: Lifecycle::Idle,
            error: None,
            generation: 0,
            reset_at: 0,
        }
    }

    #[must_use]
    pub const fn data(&self) -> &T {
        &self.data
    }

    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Message from the last rejection, if the last settled request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lifecycle == Lifecycle::Pending
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a request. Returns its generation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.lifecycle = Lifecycle::Pending;
        self.error = None;
        self.generation
    }

    /// Settle successfully, merging the payload with `apply`.
    pub fn fulfill(&mut self, apply: impl FnOnce(&mut T)) {
        apply(&mut self.data);
        self.lifecycle = Lifecycle::Fulfilled;
        self.error = None;
    }

    /// Settle with a failure. `data` is left as it was.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.lifecycle = Lifecycle::Rejected;
        self.error = Some(message.into());
    }

    /// Settle with a backend result.
    ///
    /// Unauthorized results return to `Idle` with no error: the interceptor
    /// has already dealt with them.
    pub fn settle<R>(
        &mut self,
        result: Result<R, ClientError>,
        fallback: &str,
        apply: impl FnOnce(&mut T, R),
    ) -> Lifecycle {
        match result {
            Ok(payload) => self.fulfill(|data| apply(data, payload)),
            Err(e) if e.is_unauthorized() => {
                self.lifecycle = Lifecycle::Idle;
                self.error = None;
            }
            Err(e) => self.reject(e.user_message(fallback)),
        }
        self.lifecycle
    }

    /// Change `data` without a request. The lifecycle is untouched.
    pub fn update(&mut self, change: impl FnOnce(&mut T)) {
        change(&mut self.data);
    }
}

impl<T: Default> AsyncResource<T> {
    /// Back to empty and idle. The generation keeps counting, and requests
    /// already in flight will not settle into the fresh state.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation,
            reset_at: self.generation,
            ..Self::default()
        };
    }
}

// =============================================================================
// Slice
// =============================================================================

/// An observable [`AsyncResource`].
///
/// Every change is one atomic `send_modify`; nothing is held across the
/// backend call.
#[derive(Debug)]
pub struct Slice<T> {
    name: &'static str,
    state: watch::Sender<AsyncResource<T>>,
}

impl<T: Clone + Send + Sync> Slice<T> {
    /// An idle slice named `name` (used in logs) holding `data`.
    #[must_use]
    pub fn new(name: &'static str, data: T) -> Self {
        let (state, _) = watch::channel(AsyncResource::new(data));
        Self { name, state }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<T> {
        self.state.borrow().clone()
    }

    /// Read the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&AsyncResource<T>) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Observe changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<T>> {
        self.state.subscribe()
    }

    /// Change the data locally.
    pub fn update(&self, change: impl FnOnce(&mut T)) {
        self.state.send_modify(|resource| resource.update(change));
    }

    /// Fail `op` without contacting the backend.
    pub fn reject_locally(&self, op: &'static str, message: impl Into<String>) -> Lifecycle {
        let error = ClientError::InvalidInput(message.into());
        warn!(slice = self.name, op, error = %error, "Rejected before dispatch");
        self.state.send_modify(|resource| {
            resource.begin();
            resource.settle(Err::<(), _>(error), "Invalid input", |_, ()| {});
        });
        Lifecycle::Rejected
    }

    /// Drive `request` through the lifecycle and merge its payload with
    /// `apply`. Returns the settled lifecycle.
    ///
    /// Overlapping calls are not coalesced; whichever settles last wins.
    pub async fn run<R, F>(
        &self,
        op: &'static str,
        fallback: &str,
        request: F,
        apply: impl FnOnce(&mut T, R),
    ) -> Lifecycle
    where
        F: Future<Output = Result<R, ClientError>>,
    {
        let mut generation = 0;
        self.state.send_modify(|resource| generation = resource.begin());
        debug!(slice = self.name, op, generation, "Dispatched");

        let result = request.await;

        let mut outcome = Lifecycle::Idle;
        let settled = self.state.send_if_modified(|resource| {
            if generation <= resource.reset_at {
                return false;
            }
            outcome = resource.settle(result, fallback, apply);
            true
        });
        if !settled {
            debug!(slice = self.name, op, generation, "Dropped, slice was reset");
            return outcome;
        }

        match outcome {
            Lifecycle::Rejected => {
                let error = self.read(|r| r.error().map(String::from)).unwrap_or_default();
                warn!(slice = self.name, op, generation, %error, "Rejected");
            }
            _ => debug!(slice = self.name, op, generation, outcome = %outcome, "Settled"),
        }
        let generation = generation.to_string();
        add_breadcrumb(
            self.name,
            &format!("{op} {outcome}"),
            Some(&[("generation", generation.as_str())]),
        );

        outcome
    }
}

impl<T: Clone + Default + Send + Sync> Slice<T> {
    /// Back to empty and idle.
    pub fn reset(&self) {
        self.state.send_modify(AsyncResource::reset);
    }
}
