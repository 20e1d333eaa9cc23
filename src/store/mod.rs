//! Knowledge Store — persistence collaborator for the consolidation pipeline.
//!
//! Keyed reads/writes of rolling summaries per (user, stream), the cached
//! overall summary per user, and profile fields assembled into fresh
//! snapshots. The trait keeps the merger/synthesizer testable against an
//! in-memory fake; `SqliteKnowledgeStore` is the shipped implementation.

pub mod sqlite;
pub mod types;

pub use sqlite::SqliteKnowledgeStore;
pub use types::{OverallSummary, RollingSummary, SummaryStream, UserProfileSnapshot};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored value could not be decoded: {0}")]
    Decoding(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed persistence for the consolidation pipeline.
///
/// Each record has exactly one logical writer role (the merger writes
/// rolling summaries, the synthesizer writes the overall summary); no
/// multi-record transaction is required.
pub trait KnowledgeStore: Send + Sync {
    fn rolling_summary(
        &self,
        user_id: &str,
        stream: SummaryStream,
    ) -> Result<Option<RollingSummary>, StoreError>;

    fn put_rolling_summary(
        &self,
        user_id: &str,
        stream: SummaryStream,
        summary: &RollingSummary,
    ) -> Result<(), StoreError>;

    fn overall_summary(&self, user_id: &str) -> Result<Option<OverallSummary>, StoreError>;

    /// Overwrites the cached artifact wholesale.
    fn put_overall_summary(
        &self,
        user_id: &str,
        summary: &OverallSummary,
    ) -> Result<(), StoreError>;

    /// Assemble a fresh profile snapshot. A user with no profile row yields
    /// the default (empty) snapshot, not an error.
    fn profile_snapshot(&self, user_id: &str) -> Result<UserProfileSnapshot, StoreError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic in-memory store for pipeline tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct State {
        rolling: HashMap<(String, &'static str), RollingSummary>,
        overall: HashMap<String, OverallSummary>,
        profiles: HashMap<String, UserProfileSnapshot>,
    }

    /// In-memory `KnowledgeStore` with switchable failure injection.
    #[derive(Default)]
    pub(crate) struct MemoryKnowledgeStore {
        state: Mutex<State>,
        pub fail_profile_reads: bool,
        pub fail_overall_writes: bool,
    }

    impl MemoryKnowledgeStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_rolling(&self, user_id: &str, stream: SummaryStream, summary: RollingSummary) {
            self.state
                .lock()
                .unwrap()
                .rolling
                .insert((user_id.to_string(), stream.as_str()), summary);
        }

        pub fn seed_overall(&self, user_id: &str, summary: OverallSummary) {
            self.state.lock().unwrap().overall.insert(user_id.to_string(), summary);
        }

        pub fn seed_profile(&self, user_id: &str, profile: UserProfileSnapshot) {
            self.state.lock().unwrap().profiles.insert(user_id.to_string(), profile);
        }

        pub fn stored_overall(&self, user_id: &str) -> Option<OverallSummary> {
            self.state.lock().unwrap().overall.get(user_id).cloned()
        }
    }

    impl KnowledgeStore for MemoryKnowledgeStore {
        fn rolling_summary(
            &self,
            user_id: &str,
            stream: SummaryStream,
        ) -> Result<Option<RollingSummary>, StoreError> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .rolling
                .get(&(user_id.to_string(), stream.as_str()))
                .cloned())
        }

        fn put_rolling_summary(
            &self,
            user_id: &str,
            stream: SummaryStream,
            summary: &RollingSummary,
        ) -> Result<(), StoreError> {
            self.state
                .lock()
                .unwrap()
                .rolling
                .insert((user_id.to_string(), stream.as_str()), summary.clone());
            Ok(())
        }

        fn overall_summary(&self, user_id: &str) -> Result<Option<OverallSummary>, StoreError> {
            Ok(self.state.lock().unwrap().overall.get(user_id).cloned())
        }

        fn put_overall_summary(
            &self,
            user_id: &str,
            summary: &OverallSummary,
        ) -> Result<(), StoreError> {
            if self.fail_overall_writes {
                return Err(StoreError::Unavailable("injected write failure".into()));
            }
            self.state.lock().unwrap().overall.insert(user_id.to_string(), summary.clone());
            Ok(())
        }

        fn profile_snapshot(&self, user_id: &str) -> Result<UserProfileSnapshot, StoreError> {
            if self.fail_profile_reads {
                return Err(StoreError::Unavailable("injected read failure".into()));
            }
            Ok(self.state.lock().unwrap().profiles.get(user_id).cloned().unwrap_or_default())
        }
    }
}
