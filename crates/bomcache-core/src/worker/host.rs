//! Host side of the worker lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::lifecycle::{ActivationReport, FetchOutcome, OfflineWorker, ResponseSource};
use super::WorkerError;
use crate::cache::{CacheBucket, CacheStorage};
use crate::net::{Fetcher, Request, Response};

/// Capabilities the host offers to a worker during its lifecycle.
pub trait HostControl: Send + Sync {
    /// Activate the new worker without waiting for existing clients to close.
    fn skip_waiting(&self);

    /// Take control of pages that are already open.
    fn claim_clients(&self);
}

/// Records the worker's skip-waiting and claim requests.
#[derive(Debug, Default)]
pub struct ClientControl {
    skip_waiting: AtomicBool,
    claimed: AtomicBool,
}

impl ClientControl {
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn clients_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

impl HostControl for ClientControl {
    fn skip_waiting(&self) {
        debug!("Worker requested skip waiting");
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    fn claim_clients(&self) {
        debug!("Worker claimed clients");
        self.claimed.store(true, Ordering::SeqCst);
    }
}

/// Worker lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Registered, not installed yet
    Parsed,
    Installing,
    /// Installed, waiting to activate
    Installed,
    Activating,
    /// Active and controlling pages
    Activated,
    /// Install failed; discarded until the host registers it again
    Redundant,
}

impl WorkerState {
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    /// Whether an install may start from this state
    pub fn can_install(&self) -> bool {
        matches!(self, WorkerState::Parsed | WorkerState::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Parsed => write!(f, "parsed"),
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Installed => write!(f, "installed"),
            WorkerState::Activating => write!(f, "activating"),
            WorkerState::Activated => write!(f, "activated"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Install => write!(f, "install"),
            EventKind::Activate => write!(f, "activate"),
            EventKind::Fetch => write!(f, "fetch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Install,
    Activate,
    Fetch(Request),
}

impl LifecycleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LifecycleEvent::Install => EventKind::Install,
            LifecycleEvent::Activate => EventKind::Activate,
            LifecycleEvent::Fetch(_) => EventKind::Fetch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed,
    Activated(ActivationReport),
    Fetched {
        response: Response,
        source: ResponseSource,
    },
}

/// Drives an `OfflineWorker` the way a browser would.
///
/// Each dispatched event completes only once the worker's handler has
/// settled. Install must succeed before activate is accepted; a failed
/// install marks the worker `Redundant`, and installing again registers it
/// anew, as a browser does on the next page load.
pub struct ServiceHost<S, F> {
    worker: OfflineWorker<S, F>,
    control: ClientControl,
    state: WorkerState,
}

impl<S: CacheStorage, F: Fetcher> ServiceHost<S, F> {
    pub fn new(worker: OfflineWorker<S, F>) -> Self {
        Self {
            worker,
            control: ClientControl::default(),
            state: WorkerState::Parsed,
        }
    }

    /// Rebuild the host of a worker installed in an earlier session from
    /// what its storage holds: `Installed` when the current bucket has every
    /// asset, `Activated` when no stale bucket is left besides it.
    pub async fn restore(worker: OfflineWorker<S, F>) -> Result<Self, WorkerError> {
        let state = Self::persisted_state(&worker).await?;
        debug!(state = %state, "Restored worker state");
        Ok(Self {
            worker,
            control: ClientControl::default(),
            state,
        })
    }

    async fn persisted_state(worker: &OfflineWorker<S, F>) -> Result<WorkerState, WorkerError> {
        let storage = worker.storage();
        let current = worker.manifest().cache_name.as_str();
        if !storage.has(current).await? {
            return Ok(WorkerState::Parsed);
        }

        let cached = storage.open(current).await?.keys().await?;
        for path in &worker.manifest().files {
            let url = worker.resolve(path)?;
            if !cached.iter().any(|key| key == &url) {
                return Ok(WorkerState::Parsed);
            }
        }

        let stale = storage.keys().await?.iter().any(|name| name != current);
        Ok(if stale {
            WorkerState::Installed
        } else {
            WorkerState::Activated
        })
    }

    pub fn worker(&self) -> &OfflineWorker<S, F> {
        &self.worker
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn control(&self) -> &ClientControl {
        &self.control
    }

    fn expect_state(&self, expected: WorkerState) -> Result<(), WorkerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    pub async fn dispatch(&mut self, event: LifecycleEvent) -> Result<EventOutcome, WorkerError> {
        debug!(event = %event.kind(), state = %self.state, "Dispatching event");
        match event {
            LifecycleEvent::Install => self.install().await.map(|_| EventOutcome::Installed),
            LifecycleEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            LifecycleEvent::Fetch(request) => {
                let (response, source) = self.fetch(&request).await?;
                Ok(EventOutcome::Fetched { response, source })
            }
        }
    }

    pub async fn install(&mut self) -> Result<(), WorkerError> {
        if !self.state.can_install() {
            return Err(WorkerError::InvalidState {
                expected: WorkerState::Parsed,
                actual: self.state,
            });
        }
        self.state = WorkerState::Installing;

        match self.worker.install(&self.control).await {
            Ok(()) => {
                self.state = WorkerState::Installed;
                info!("Worker installed");
                Ok(())
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                warn!(error = %e, "Worker install failed");
                Err(e)
            }
        }
    }

    pub async fn activate(&mut self) -> Result<ActivationReport, WorkerError> {
        self.expect_state(WorkerState::Installed)?;
        self.state = WorkerState::Activating;

        match self.worker.activate(&self.control).await {
            Ok(report) => {
                self.state = WorkerState::Activated;
                info!(removed = report.removed.len(), "Worker activated");
                Ok(report)
            }
            Err(e) => {
                self.state = WorkerState::Installed;
                warn!(error = %e, "Worker activation failed");
                Err(e)
            }
        }
    }

    /// Install, then activate right away if the worker asked to skip waiting.
    ///
    /// Returns `None` when the worker stays installed and waiting.
    pub async fn start(&mut self) -> Result<Option<ActivationReport>, WorkerError> {
        self.install().await?;
        if !self.control.skip_waiting_requested() {
            info!("Worker waiting for existing clients to close");
            return Ok(None);
        }
        self.activate().await.map(Some)
    }

    /// Route a page request through the worker when it controls the page,
    /// otherwise (or when the worker passes it through) fetch it directly.
    pub async fn fetch(&self, request: &Request) -> Result<(Response, ResponseSource), WorkerError> {
        if self.state.can_intercept_fetch() {
            if let FetchOutcome::Respond { response, source } = self.worker.handle_fetch(request).await {
                return Ok((response, source));
            }
        }
        let response = self.worker.fetcher().fetch(request).await?;
        Ok((response, ResponseSource::Passthrough))
    }
}
