//! Session State
//!
//! Each browser session owns one `HedgehogSession`: the three profile lists,
//! the current page, the cached analysis and a one-shot notice. Sessions live
//! in a `SessionStore` keyed by an opaque id and are discarded on reset or
//! after sitting idle past the configured TTL.

use super::analysis::AnalysisOutcome;
use super::navigation::{transition, AnalysisGate, Page};
use super::types::{Category, Notice};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

// ============================================================
// ENTRY PARSING
// ============================================================

/// Split raw text into trimmed, non-empty lines, keeping their order.
pub fn parse_entries(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================
// HEDGEHOG SESSION
// ============================================================

/// State of one interactive session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgehogSession {
    pub id: Uuid,
    passions: Vec<String>,
    strengths: Vec<String>,
    market_needs: Vec<String>,
    analysis: Option<AnalysisOutcome>,
    page: Page,
    notice: Option<Notice>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl HedgehogSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            passions: Vec::new(),
            strengths: Vec::new(),
            market_needs: Vec::new(),
            analysis: None,
            page: Page::default(),
            notice: None,
            created_at: now,
            last_seen: now,
        }
    }

    pub fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Passion => &self.passions,
            Category::Strength => &self.strengths,
            Category::MarketNeed => &self.market_needs,
        }
    }

    pub fn passions(&self) -> &[String] {
        &self.passions
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn market_needs(&self) -> &[String] {
        &self.market_needs
    }

    /// Replace a list wholesale from multi-line text.
    ///
    /// Returns `false` when the text holds no usable line; the stored list is
    /// left as it was in that case. A successful save keeps the user on the
    /// profile page.
    pub fn replace_entries(&mut self, category: Category, raw: &str) -> bool {
        let entries = parse_entries(raw);
        if entries.is_empty() {
            return false;
        }

        match category {
            Category::Passion => self.passions = entries,
            Category::Strength => self.strengths = entries,
            Category::MarketNeed => self.market_needs = entries,
        }
        self.page = Page::Profile;
        true
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn navigate(&mut self, target: Page) -> Page {
        self.page = transition(self.page, target);
        self.page
    }

    pub fn analysis_gate(&self) -> AnalysisGate {
        AnalysisGate::evaluate(&self.passions, &self.strengths, &self.market_needs)
    }

    pub fn is_profile_complete(&self) -> bool {
        self.analysis_gate().is_open()
    }

    pub fn analysis(&self) -> Option<&AnalysisOutcome> {
        self.analysis.as_ref()
    }

    /// Cache an analysis outcome, replacing whatever was there (failures included).
    pub fn store_analysis(&mut self, outcome: AnalysisOutcome) {
        self.analysis = Some(outcome);
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_seen > ttl
    }
}

impl Default for HedgehogSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// SESSION STORE
// ============================================================

/// Longest accepted idle lifetime (one year)
pub const MAX_SESSION_TTL_MINUTES: i64 = 525_600;

/// In-memory store of live sessions
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, HedgehogSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES)),
        }
    }

    // Session data stays usable after a panicking handler, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, HedgehogSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new session and return its id
    pub fn create(&self) -> Uuid {
        let session = HedgehogSession::new();
        let id = session.id;
        self.lock().insert(id, session);
        log::debug!("Session {} started", id);
        id
    }

    /// The live session named by `id`, if any. Never creates one.
    pub fn find(&self, id: Option<Uuid>) -> Option<Uuid> {
        self.purge_expired();

        let id = id?;
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id)?;
        session.touch(Utc::now());
        Some(id)
    }

    /// Return the live session for `id`, or start a new one.
    ///
    /// The boolean is `true` when a new session was created.
    pub fn resolve(&self, id: Option<Uuid>) -> (Uuid, bool) {
        match self.find(id) {
            Some(id) => (id, false),
            None => (self.create(), true),
        }
    }

    /// Run `f` against a live session under the store lock
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut HedgehogSession) -> R) -> Option<R> {
        let mut sessions = self.lock();
        sessions.get_mut(&id).map(|session| {
            session.touch(Utc::now());
            f(session)
        })
    }

    /// Clone of a session's current state
    pub fn snapshot(&self, id: Uuid) -> Option<HedgehogSession> {
        self.lock().get(&id).cloned()
    }

    /// End a session. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            log::debug!("Session {} ended", id);
        }
        removed
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        let purged = before - sessions.len();
        if purged > 0 {
            log::info!("Discarded {} idle session(s)", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
