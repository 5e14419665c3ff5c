//! Application state shared by every request.

use dynamo_core::{Settings, StoragePolicy};
use dynamo_storage::StorageHandle;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<Settings>,
    pub policy: Arc<StoragePolicy>,
    pub storage: Arc<StorageHandle>,
    draining: AtomicBool,
    in_flight: AtomicUsize,
}

impl AppState {
    /// State with the policy derived from `settings`.
    pub fn new(settings: Settings, storage: StorageHandle) -> Self {
        let policy = settings.storage_policy();
        Self::with_policy(settings, policy, storage)
    }

    pub fn with_policy(settings: Settings, policy: StoragePolicy, storage: StorageHandle) -> Self {
        Self {
            settings: Arc::new(settings),
            policy: Arc::new(policy),
            storage: Arc::new(storage),
            draining: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Stop admitting new requests. Requests already running are unaffected.
    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Release);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub(crate) fn request_started(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn request_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
