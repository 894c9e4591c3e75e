//! Client-side data store
//!
//! Single source of truth for the server-backed collections the CLI
//! renders: learner rosters, backend sessions, and per-learner goals.
//! Each collection lives in its own slot with independent loading and
//! error state, so one failing endpoint never contaminates the others.
//!
//! Fetches never hold a lock across an API call: a slot is marked loading,
//! the request is awaited, and the outcome is applied afterwards. Duplicate
//! concurrent fetches of one collection are not de-duplicated; the last
//! response to arrive wins.

pub mod activity;
pub mod collection;
pub mod events;
pub mod summaries;

pub use activity::{ActivityKind, ActivityLog, RecentActivity};
pub use collection::CollectionState;
pub use events::{EventBus, StoreEvent};
pub use summaries::{summarize_by_month, MonthlySummary};

use crate::api::{BackendSession, ChildGoal, Learner, PracticeApi};
use crate::error::Result;
use crate::metrics::FetchMetrics;
use futures::future::{join_all, BoxFuture};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Shared store of server-backed collections.
///
/// Cheap to share: wrap in an `Arc` and hand clones to every consumer.
/// All mutation goes through the fetch methods; readers take snapshots.
pub struct DataStore {
    api: Arc<dyn PracticeApi>,
    learners: RwLock<CollectionState<Learner>>,
    my_students: RwLock<CollectionState<Learner>>,
    temp_students: RwLock<CollectionState<Learner>>,
    sessions: RwLock<CollectionState<BackendSession>>,
    todays_sessions: RwLock<CollectionState<BackendSession>>,
    goals: RwLock<HashMap<String, CollectionState<ChildGoal>>>,
    activity: ActivityLog,
    events: EventBus,
}

impl DataStore {
    /// Creates an empty store over the given API client and activity log.
    pub fn new(api: Arc<dyn PracticeApi>, activity: ActivityLog) -> Self {
        Self {
            api,
            learners: RwLock::new(CollectionState::new()),
            my_students: RwLock::new(CollectionState::new()),
            temp_students: RwLock::new(CollectionState::new()),
            sessions: RwLock::new(CollectionState::new()),
            todays_sessions: RwLock::new(CollectionState::new()),
            goals: RwLock::new(HashMap::new()),
            activity,
            events: EventBus::default(),
        }
    }

    // ---------- Collection fetches ----------

    /// Fetches the full learner roster into the `learners` slot.
    pub async fn fetch_learners(&self) -> Result<Vec<Learner>> {
        let metrics = FetchMetrics::new("learners");
        Self::begin(&self.learners);
        let result = self.api.list_students().await;
        Self::finish("learners", &self.learners, &metrics, result)
    }

    /// Fetches the learners assigned to the signed-in therapist.
    pub async fn fetch_my_students(&self) -> Result<Vec<Learner>> {
        let metrics = FetchMetrics::new("my_students");
        Self::begin(&self.my_students);
        let result = self.api.list_my_students().await;
        Self::finish("my_students", &self.my_students, &metrics, result)
    }

    /// Fetches learners enrolled but not yet assigned a therapist.
    pub async fn fetch_temp_students(&self) -> Result<Vec<Learner>> {
        let metrics = FetchMetrics::new("temp_students");
        Self::begin(&self.temp_students);
        let result = self.api.list_temp_students().await;
        Self::finish("temp_students", &self.temp_students, &metrics, result)
    }

    /// Fetches every backend session.
    pub async fn fetch_sessions(&self) -> Result<Vec<BackendSession>> {
        let metrics = FetchMetrics::new("sessions");
        Self::begin(&self.sessions);
        let result = self.api.list_sessions().await;
        Self::finish("sessions", &self.sessions, &metrics, result)
    }

    /// Fetches the sessions scheduled for today.
    pub async fn fetch_todays_sessions(&self) -> Result<Vec<BackendSession>> {
        let metrics = FetchMetrics::new("todays_sessions");
        Self::begin(&self.todays_sessions);
        let result = self.api.list_todays_sessions().await;
        Self::finish("todays_sessions", &self.todays_sessions, &metrics, result)
    }

    fn begin<T>(slot: &RwLock<CollectionState<T>>) {
        if let Ok(mut state) = slot.write() {
            state.begin_fetch();
        }
    }

    fn finish<T: Clone>(
        collection: &'static str,
        slot: &RwLock<CollectionState<T>>,
        metrics: &FetchMetrics,
        result: Result<Vec<T>>,
    ) -> Result<Vec<T>> {
        match result {
            Ok(items) => {
                if let Ok(mut state) = slot.write() {
                    state.apply_success(items.clone());
                }
                metrics.record_outcome("success");
                debug!(collection, count = items.len(), "Collection fetch succeeded");
                Ok(items)
            }
            Err(e) => {
                let message = e.to_string();
                if let Ok(mut state) = slot.write() {
                    state.apply_failure(message.clone());
                }
                metrics.record_outcome("failure");
                warn!(collection, error = %message, "Collection fetch failed");
                Err(e)
            }
        }
    }

    // ---------- Goals cache ----------

    /// Returns goals for a learner, from cache when possible.
    ///
    /// Without `force`, an entry whose latest fetch succeeded (a zero-goal
    /// list included) is returned without touching the network; an entry
    /// whose latest fetch failed is retried. With `force`, the round-trip
    /// always happens and the cached entry is replaced. Loading and error
    /// state are tracked per learner id, never globally.
    pub async fn goals_for_learner(&self, learner_id: &str, force: bool) -> Result<Vec<ChildGoal>> {
        if !force {
            if let Ok(map) = self.goals.read() {
                if let Some(state) = map.get(learner_id) {
                    if state.is_loaded() {
                        crate::metrics::record_goals_cache("hit");
                        debug!(learner_id, count = state.items.len(), "Using cached goals");
                        return Ok(state.items.clone());
                    }
                }
            }
            crate::metrics::record_goals_cache("miss");
        } else {
            crate::metrics::record_goals_cache("refresh");
        }

        let metrics = FetchMetrics::new("goals");
        if let Ok(mut map) = self.goals.write() {
            map.entry(learner_id.to_string()).or_default().begin_fetch();
        }

        match self.api.child_goals(learner_id).await {
            Ok(items) => {
                if let Ok(mut map) = self.goals.write() {
                    map.entry(learner_id.to_string())
                        .or_default()
                        .apply_success(items.clone());
                }
                metrics.record_outcome("success");
                debug!(learner_id, count = items.len(), "Goals fetch succeeded");
                Ok(items)
            }
            Err(e) => {
                let message = e.to_string();
                if let Ok(mut map) = self.goals.write() {
                    map.entry(learner_id.to_string())
                        .or_default()
                        .apply_failure(message.clone());
                }
                metrics.record_outcome("failure");
                warn!(learner_id, error = %message, "Goals fetch failed");
                Err(e)
            }
        }
    }

    // ---------- Fan-out refresh ----------

    /// Refreshes every top-level collection concurrently.
    ///
    /// Each fetch settles independently; a failure in one never blocks the
    /// others or discards their results. Returns the number of fetches
    /// that failed.
    pub async fn refresh_all(&self) -> usize {
        debug!("Refreshing all collections");

        let fetches: Vec<BoxFuture<'_, bool>> = vec![
            Box::pin(async { self.fetch_learners().await.is_err() }),
            Box::pin(async { self.fetch_my_students().await.is_err() }),
            Box::pin(async { self.fetch_temp_students().await.is_err() }),
            Box::pin(async { self.fetch_sessions().await.is_err() }),
            Box::pin(async { self.fetch_todays_sessions().await.is_err() }),
        ];

        let failed = join_all(fetches)
            .await
            .into_iter()
            .filter(|failed| *failed)
            .count();

        if failed > 0 {
            warn!(failed, "Some collections failed to refresh");
        }
        failed
    }

    // ---------- Activity log ----------

    /// Records an audit-trail entry and notifies subscribers.
    ///
    /// The entry is persisted before this returns; the log keeps only the
    /// ten most recent entries.
    pub fn add_activity(&self, message: &str, kind: ActivityKind) -> Result<RecentActivity> {
        let activity = self.activity.record(message, kind)?;
        self.events.publish(StoreEvent::ActivityRecorded {
            activity: activity.clone(),
        });
        Ok(activity)
    }

    /// Returns the retained audit-trail entries, newest first.
    pub fn recent_activity(&self) -> Result<Vec<RecentActivity>> {
        self.activity.recent()
    }

    /// Clears the audit trail.
    pub fn clear_activity(&self) -> Result<()> {
        self.activity.clear()
    }

    // ---------- Events ----------

    /// Subscribes to store events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Publishes an event to all subscribers.
    pub fn publish(&self, event: StoreEvent) {
        self.events.publish(event);
    }

    /// Reacts to a store event.
    ///
    /// A schedule change re-populates every collection wholesale; an
    /// activity announcement is appended to the audit log.
    pub async fn handle_event(&self, event: StoreEvent) {
        match event {
            StoreEvent::ScheduleChanged => {
                debug!("Schedule changed; refreshing all collections");
                self.refresh_all().await;
            }
            StoreEvent::ActivityAdded { message, kind } => {
                if let Err(e) = self.add_activity(&message, kind) {
                    warn!(error = %e, "Failed to record activity from event");
                }
            }
            StoreEvent::ActivityRecorded { .. } => {}
        }
    }

    // ---------- Snapshots ----------

    /// Snapshot of the learner roster slot.
    pub fn learners(&self) -> CollectionState<Learner> {
        self.learners.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Snapshot of the assigned-learners slot.
    pub fn my_students(&self) -> CollectionState<Learner> {
        self.my_students
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the unassigned-learners slot.
    pub fn temp_students(&self) -> CollectionState<Learner> {
        self.temp_students
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the backend sessions slot.
    pub fn sessions(&self) -> CollectionState<BackendSession> {
        self.sessions.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Snapshot of the today's-sessions slot.
    pub fn todays_sessions(&self) -> CollectionState<BackendSession> {
        self.todays_sessions
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Snapshot of one learner's cached goals entry, if any fetch has
    /// been attempted for them.
    pub fn goals(&self, learner_id: &str) -> Option<CollectionState<ChildGoal>> {
        self.goals
            .read()
            .ok()
            .and_then(|map| map.get(learner_id).cloned())
    }
}
