//! In-memory session store.
//!
//! Sessions are immutable once created and shared as `Arc<BattleSession>`, so readers
//! never observe a half-written record and the expiry sweep only ever removes whole
//! entries. Two limits apply to every session: a fixed time-to-live from creation and a
//! hard capacity, past which the oldest-created session is evicted.

use crate::error::{EngineError, Result};
use crate::session::{BattleSession, SimulatedBattle};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_TTL_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Default)]
struct StoreInner {
    sessions: HashMap<Uuid, Arc<BattleSession>>,
    /// Ids in creation order, oldest first.
    order: VecDeque<Uuid>,
}

#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<StoreInner>,
    ttl: TimeDelta,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: TimeDelta, max_sessions: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Persist `battle` under a freshly generated id and return that id.
    pub fn create(&self, battle: SimulatedBattle) -> Uuid {
        self.create_session(battle).id
    }

    /// Like [`Self::create`] but hands back the stored record.
    pub fn create_session(&self, battle: SimulatedBattle) -> Arc<BattleSession> {
        self.create_at(battle, Utc::now())
    }

    pub fn create_at(&self, battle: SimulatedBattle, now: DateTime<Utc>) -> Arc<BattleSession> {
        let mut inner = self.inner.write();
        let mut id = Uuid::new_v4();
        while inner.sessions.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let session = Arc::new(BattleSession {
            id,
            battle,
            created_at: now,
            expires_at: now + self.ttl,
        });
        inner.sessions.insert(id, Arc::clone(&session));
        inner.order.push_back(id);

        while inner.sessions.len() > self.max_sessions {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            if inner.sessions.remove(&oldest).is_some() {
                debug!(session = %oldest, "evicted oldest session at capacity");
            }
        }
        session
    }

    pub fn get(&self, id: &Uuid) -> Result<Arc<BattleSession>> {
        self.get_at(id, Utc::now())
    }

    /// Expired sessions read as missing even if the sweep has not removed them yet.
    pub fn get_at(&self, id: &Uuid, now: DateTime<Utc>) -> Result<Arc<BattleSession>> {
        self.inner
            .read()
            .sessions
            .get(id)
            .filter(|session| !session.is_expired(now))
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Drop every session expired at `now`; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.inner.write();
        let StoreInner { sessions, order } = &mut *guard;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        order.retain(|id| sessions.contains_key(id));
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "purged expired battle sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_TTL_SECS as i64), DEFAULT_MAX_SESSIONS)
    }
}
