//! Thread-safe surface registry (§4.5 "Registry operations"). Decouples
//! external registration/destruction/resize requests, which can arrive from
//! any thread at any time, from the frame loop, which only ever touches
//! surfaces at `FrameStart`.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::backend::Surface;
use crate::surface::SurfaceKey;

/// Invoked once a pending request has been processed. Always called with
/// `true` once the registry has acted on the request, even if the backend
/// itself failed partway through (§7: "callback exceptions are swallowed").
pub type Callback = Box<dyn FnOnce(bool) + Send>;

struct PendingRegistration {
    key: SurfaceKey,
    surface: Arc<dyn Surface>,
    callback: Callback,
}

struct PendingDestruction {
    key: SurfaceKey,
    callback: Callback,
}

/// The committed map plus the three pending queues. All fields are
/// independently locked mutexes (§5 "registry map is protected by a
/// mutex; snapshots return value copies").
#[derive(Default)]
pub struct SurfaceRegistry {
    committed: Mutex<FxHashMap<SurfaceKey, Arc<dyn Surface>>>,
    pending_registrations: Mutex<Vec<PendingRegistration>>,
    pending_destructions: Mutex<Vec<PendingDestruction>>,
    resize_callbacks: Mutex<FxHashMap<SurfaceKey, Vec<Callback>>>,
}

impl SurfaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a registration to be committed at the next `FrameStart`.
    pub fn register_async(&self, key: SurfaceKey, surface: Arc<dyn Surface>, callback: Callback) {
        self.pending_registrations.lock().push(PendingRegistration {
            key,
            surface,
            callback,
        });
    }

    /// Enqueues a destruction to be processed at the next `FrameStart`.
    pub fn destroy_async(&self, key: SurfaceKey, callback: Callback) {
        self.pending_destructions
            .lock()
            .push(PendingDestruction { key, callback });
    }

    /// Attaches a completion callback to `key`'s pending-resize queue. The
    /// surface itself records the requested size through its own API; this
    /// only registers who gets told when the resize dance completes.
    pub fn request_resize(&self, key: SurfaceKey, callback: Callback) {
        self.resize_callbacks.lock().entry(key).or_default().push(callback);
    }

    /// A value-copy snapshot of the committed map.
    #[must_use]
    pub fn snapshot_surfaces(&self) -> FxHashMap<SurfaceKey, Arc<dyn Surface>> {
        self.committed
            .lock()
            .iter()
            .map(|(k, v)| (*k, Arc::clone(v)))
            .collect()
    }

    #[must_use]
    pub fn drain_pending_registrations(&self) -> Vec<(SurfaceKey, Arc<dyn Surface>, Callback)> {
        self.pending_registrations
            .lock()
            .drain(..)
            .map(|p| (p.key, p.surface, p.callback))
            .collect()
    }

    #[must_use]
    pub fn drain_pending_destructions(&self) -> Vec<(SurfaceKey, Callback)> {
        self.pending_destructions
            .lock()
            .drain(..)
            .map(|p| (p.key, p.callback))
            .collect()
    }

    #[must_use]
    pub fn drain_resize_callbacks(&self, key: SurfaceKey) -> Vec<Callback> {
        self.resize_callbacks.lock().remove(&key).unwrap_or_default()
    }

    pub fn commit_registration(&self, key: SurfaceKey, surface: Arc<dyn Surface>) {
        self.committed.lock().insert(key, surface);
    }

    pub fn remove_committed(&self, key: SurfaceKey) -> Option<Arc<dyn Surface>> {
        self.committed.lock().remove(&key)
    }
}
