//! Reconciliation of a freshly fetched provider listing against the stored
//! streams for that provider.
//!
//! Streams are keyed by `(stream_type, original_name)`. Entries new to the
//! listing are inserted active; stored streams absent from the listing are
//! deactivated and recorded as missing (which keeps them out of the active
//! set the playlist core reads); previously missing streams that re-appear
//! are re-activated and their missing record cleared. User edits to name,
//! channel number or TVG metadata are never overwritten by a refresh.

use std::collections::{HashMap, HashSet};

use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{NewStream, Provider, RefreshSummary};

use super::FetchedStream;

pub async fn reconcile_provider_streams(
    database: &Database,
    provider: &Provider,
    fetched: Vec<FetchedStream>,
) -> AppResult<RefreshSummary> {
    let existing = database
        .list_provider_streams(provider.user_id, provider.id)
        .await?;

    let mut by_key: HashMap<(i64, String), &crate::models::Stream> = HashMap::new();
    for stream in &existing {
        by_key.insert(
            (stream.stream_type.code(), stream.original_name.clone()),
            stream,
        );
    }

    let mut summary = RefreshSummary::default();
    let mut seen: HashSet<(i64, String)> = HashSet::new();

    for entry in fetched {
        let key = (entry.stream_type.code(), entry.original_name.clone());
        if !seen.insert(key.clone()) {
            // Providers occasionally list the same entry twice
            continue;
        }
        summary.fetched += 1;

        match by_key.get(&key) {
            Some(stream) => {
                if !stream.is_active {
                    database
                        .set_stream_active(provider.user_id, stream.id, true)
                        .await?;
                    database
                        .clear_missing_for_stream(provider.user_id, stream.id)
                        .await?;
                    summary.reactivated += 1;
                }
            }
            None => {
                database
                    .create_stream(
                        provider.user_id,
                        &NewStream {
                            provider_id: Some(provider.id),
                            stream_type: entry.stream_type,
                            channel_number: entry.channel_number,
                            name: entry.name,
                            original_name: entry.original_name,
                            stream_url: entry.stream_url,
                            tvg_id: entry.tvg_id,
                            tvg_group: entry.tvg_group,
                            tvg_logo: entry.tvg_logo,
                            extras: None,
                        },
                    )
                    .await?;
                summary.added += 1;
            }
        }
    }

    for stream in &existing {
        let key = (stream.stream_type.code(), stream.original_name.clone());
        if !seen.contains(&key) && stream.is_active {
            database
                .set_stream_active(provider.user_id, stream.id, false)
                .await?;
            database
                .record_missing_stream(
                    provider.user_id,
                    provider.id,
                    Some(stream.id),
                    &stream.name,
                )
                .await?;
            summary.deactivated += 1;
        }
    }

    Ok(summary)
}
