//! In-process store of service-side conversation records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::client::message::Message;
use crate::ids::SessionId;

use super::extract::{Beneficiary, Field};
use super::program::Program;

/// Everything the service remembers about one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Session the record belongs to.
    pub session_id: SessionId,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
    /// Program chosen on the first routed message.
    pub program: Option<Program>,
    /// Details collected so far.
    pub beneficiary: Beneficiary,
    /// Field the last assistant message asked for.
    pub awaiting: Option<Field>,
    /// Whether the referral has been sent.
    pub referral_submitted: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            messages: Vec::new(),
            program: None,
            beneficiary: Beneficiary::default(),
            awaiting: None,
            referral_submitted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Conversations kept before the least recently updated one is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Thread-safe conversation store kept in process memory.
///
/// Clients choose their session ids, so the store is capped: inserting a new
/// session into a full store evicts the least recently updated record.
#[derive(Clone)]
pub struct ConversationStore {
    records: Arc<DashMap<SessionId, ConversationRecord>>,
    turns: Arc<DashMap<SessionId, Arc<Mutex<()>>>>,
    max_sessions: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }
}

impl ConversationStore {
    /// Create an empty store holding up to [`DEFAULT_MAX_SESSIONS`] conversations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding up to `max_sessions` conversations (at least one).
    #[must_use]
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            turns: Arc::new(DashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Mint a session id and register an empty record for it.
    #[must_use]
    pub fn create_session(&self) -> SessionId {
        let id = SessionId::generate();
        self.insert(ConversationRecord::new(id.clone()));
        tracing::debug!(session_id = %id, "session created");
        id
    }

    /// Copy of the record for `id`.
    #[must_use]
    pub fn load(&self, id: &SessionId) -> Option<ConversationRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    /// Insert or replace a record, stamping its update time.
    pub fn save(&self, mut record: ConversationRecord) {
        record.updated_at = Utc::now();
        self.insert(record);
    }

    /// Lock serializing the turns of one session.
    ///
    /// Hold the guard from `load` to `save` so concurrent turns on the same
    /// session cannot overwrite each other.
    #[must_use]
    pub fn turn_lock(&self, id: &SessionId) -> Arc<Mutex<()>> {
        Arc::clone(self.turns.entry(id.clone()).or_default().value())
    }

    /// Whether a record exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of stored conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of stored conversations.
    #[must_use]
    pub const fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn insert(&self, record: ConversationRecord) {
        if !self.records.contains_key(&record.session_id) && self.records.len() >= self.max_sessions {
            self.evict_oldest();
        }
        self.records.insert(record.session_id.clone(), record);
    }

    fn evict_oldest(&self) {
        let oldest = self
            .records
            .iter()
            .min_by_key(|entry| entry.value().updated_at)
            .map(|entry| entry.key().clone());

        if let Some(id) = oldest {
            self.records.remove(&id);
            // A lock still held by a running turn stays until that turn ends.
            self.turns.remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
            tracing::info!(session_id = %id, max_sessions = self.max_sessions, "evicted least recently updated conversation");
        }
    }
}
