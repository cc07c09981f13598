//! Per-session client state.
//!
//! Each signed-in session owns one [`SessionStore`] holding its slices and
//! upload tracker. [`StoreRegistry`] maps session keys to stores and is the
//! only shared structure handlers touch. Stores idle for longer than the
//! session lifetime are evicted, since their cookies can no longer be sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::debug;

use super::content::{Applicant, Member};
use super::ports::{ContentSource, ContentSourceError, FileUploader};
use super::slice::{Slice, SliceAction, SliceState};
use super::thunk::run_thunk;
use super::upload::UploadTracker;

/// Slices and upload state for one session.
#[derive(Debug)]
pub struct SessionStore {
    applicant: Slice<Option<Applicant>>,
    members: Slice<Vec<Member>>,
    upload: UploadTracker,
}

impl SessionStore {
    /// Empty store whose uploads go through `uploader`.
    #[must_use]
    pub fn new(uploader: Arc<dyn FileUploader>) -> Self {
        Self {
            applicant: Slice::new("applicant"),
            members: Slice::new("members"),
            upload: UploadTracker::new(uploader),
        }
    }

    /// Snapshot of the `applicant` slice.
    #[must_use]
    pub fn applicant(&self) -> SliceState<Option<Applicant>> {
        self.applicant.snapshot()
    }

    /// Snapshot of the `members` slice.
    #[must_use]
    pub fn members(&self) -> SliceState<Vec<Member>> {
        self.members.snapshot()
    }

    /// Upload tracker for this session.
    #[must_use]
    pub const fn upload(&self) -> &UploadTracker {
        &self.upload
    }

    /// Load the member directory into the `members` slice.
    ///
    /// # Errors
    /// The content source error; the slice records its message.
    pub async fn load_members(
        &self,
        content: &dyn ContentSource,
    ) -> Result<Vec<Member>, ContentSourceError> {
        run_thunk(&self.members, content.fetch_members()).await
    }

    /// Load the application for `user_id` into the `applicant` slice.
    ///
    /// # Errors
    /// The content source error; the slice records its message.
    pub async fn load_applicant(
        &self,
        content: &dyn ContentSource,
        user_id: &str,
    ) -> Result<Option<Applicant>, ContentSourceError> {
        run_thunk(&self.applicant, content.fetch_applicant(user_id)).await
    }

    /// Record a freshly submitted application without refetching.
    pub fn store_applicant(&self, applicant: Applicant) {
        let request = self.applicant.begin();
        self.applicant.dispatch(SliceAction::Pending { request });
        self.applicant.dispatch(SliceAction::Fulfilled {
            request,
            payload: Some(applicant),
        });
        self.applicant.dispatch(SliceAction::Settled { request });
    }

    /// Return every slice to its initial state.
    pub fn reset(&self) {
        self.applicant.dispatch(SliceAction::Reset);
        self.members.dispatch(SliceAction::Reset);
        self.upload.reset();
    }
}

/// Default idle lifetime, matching the default session cookie TTL.
pub const DEFAULT_STORE_IDLE_TTL: Duration = Duration::from_secs(2 * 3600);

struct TrackedStore {
    store: Arc<SessionStore>,
    last_seen: DateTime<Utc>,
}

/// Session key to store map.
pub struct StoreRegistry {
    uploader: Arc<dyn FileUploader>,
    clock: Arc<dyn Clock>,
    idle_ttl: TimeDelta,
    stores: Mutex<HashMap<String, TrackedStore>>,
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("sessions", &self.lock().len())
            .field("idle_ttl", &self.idle_ttl)
            .finish_non_exhaustive()
    }
}

impl StoreRegistry {
    /// Empty registry evicting stores idle for [`DEFAULT_STORE_IDLE_TTL`].
    #[must_use]
    pub fn new(uploader: Arc<dyn FileUploader>, clock: Arc<dyn Clock>) -> Self {
        Self {
            uploader,
            clock,
            idle_ttl: idle_delta(DEFAULT_STORE_IDLE_TTL),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Evict stores idle for longer than `ttl` instead of the default.
    #[must_use]
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = idle_delta(ttl);
        self
    }

    /// Empty registry sharing this one's uploader, clock and idle lifetime.
    #[must_use]
    pub fn rebuilt(&self) -> Self {
        Self {
            uploader: Arc::clone(&self.uploader),
            clock: Arc::clone(&self.clock),
            idle_ttl: self.idle_ttl,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Store for `key`, created empty on first use.
    ///
    /// Every call refreshes the store's idle timer and evicts stores whose
    /// sessions have lapsed.
    pub fn for_session(&self, key: &str) -> Arc<SessionStore> {
        let now = self.clock.utc();
        let mut stores = self.lock();
        self.evict_idle(&mut stores, now);
        if let Some(tracked) = stores.get_mut(key) {
            tracked.last_seen = now;
            return Arc::clone(&tracked.store);
        }
        debug!(session = key, "creating session store");
        let store = Arc::new(SessionStore::new(Arc::clone(&self.uploader)));
        stores.insert(
            key.to_owned(),
            TrackedStore {
                store: Arc::clone(&store),
                last_seen: now,
            },
        );
        store
    }

    /// Reset and drop the store for `key`, typically on sign-out.
    ///
    /// Handlers still holding the store see empty slices afterwards.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.lock().remove(key);
        match removed {
            Some(tracked) => {
                tracked.store.reset();
                true
            }
            None => false,
        }
    }

    /// Number of live stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session holds a store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_idle(&self, stores: &mut HashMap<String, TrackedStore>, now: DateTime<Utc>) {
        stores.retain(|key, tracked| {
            let live = now.signed_duration_since(tracked.last_seen) <= self.idle_ttl;
            if !live {
                debug!(session = %key, "evicting idle session store");
                tracked.store.reset();
            }
            live
        });
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TrackedStore>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn idle_delta(ttl: Duration) -> TimeDelta {
    TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
}
