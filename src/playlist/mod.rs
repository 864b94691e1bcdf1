//! Playlist generation core: store access, filter evaluation, M3U emission.
//!
//! The pipeline is `list_active_streams` -> [`FilterEngine`] ->
//! [`emit_playlist`]; every step is a pure, synchronous transformation once
//! the access layer has produced its rows, so concurrent generations for
//! different users never interact.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::StreamType;

pub mod emitter;
pub mod filter_engine;

pub use emitter::emit_playlist;
pub use filter_engine::FilterEngine;

/// A generated playlist plus counters for logging and API responses
#[derive(Debug, Clone)]
pub struct GeneratedPlaylist {
    pub content: String,
    pub candidate_count: usize,
    pub included_count: usize,
}

#[derive(Clone)]
pub struct PlaylistService {
    database: Database,
}

impl PlaylistService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Generate the M3U8 export for one user and stream type, optionally
    /// narrowed to a single provider.
    ///
    /// Streams arrive from the store ordered by provider priority then name
    /// and keep that order through emission. Streams with no provider have
    /// no should-filter opt-out, so rules apply to them.
    pub async fn generate(
        &self,
        user_id: Uuid,
        stream_type: StreamType,
        provider_id: Option<Uuid>,
    ) -> AppResult<GeneratedPlaylist> {
        let streams = self
            .database
            .list_active_streams(user_id, stream_type, provider_id)
            .await?;
        let rules = self.database.list_active_filter_rules(user_id).await?;

        let mut engine = FilterEngine::new();
        let mut should_filter_cache: HashMap<Uuid, bool> = HashMap::new();
        let mut included = Vec::with_capacity(streams.len());

        let candidate_count = streams.len();
        for stream in streams {
            let should_filter = match stream.provider_id {
                Some(provider_id) => match should_filter_cache.get(&provider_id) {
                    Some(flag) => *flag,
                    None => {
                        let flag = self
                            .database
                            .get_provider(provider_id)
                            .await?
                            .map(|p| p.should_filter)
                            .unwrap_or(true);
                        should_filter_cache.insert(provider_id, flag);
                        flag
                    }
                },
                None => true,
            };

            if engine.evaluate(&stream, &rules, should_filter) {
                included.push(stream);
            }
        }

        let included_count = included.len();
        debug!(
            "Generated {} playlist for user {}: {} of {} streams included",
            stream_type, user_id, included_count, candidate_count
        );

        Ok(GeneratedPlaylist {
            content: emit_playlist(&included),
            candidate_count,
            included_count,
        })
    }
}
