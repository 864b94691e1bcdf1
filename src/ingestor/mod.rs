//! Provider ingestion: pulling listings from Xtream or M3U sources and
//! reconciling them into the per-user stream store.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::database::Database;
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::{Provider, ProviderKind, RefreshSummary, StreamType};

pub mod m3u;
pub mod reconcile;
pub mod scheduler;
pub mod xtream;

pub use m3u::M3uClient;
pub use scheduler::RefreshScheduler;
pub use xtream::XtreamClient;

/// A stream entry as returned by a provider, before it is reconciled into
/// the store
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedStream {
    pub stream_type: StreamType,
    pub name: String,
    pub original_name: String,
    pub stream_url: String,
    pub channel_number: String,
    pub tvg_id: Option<String>,
    pub tvg_group: Option<String>,
    pub tvg_logo: Option<String>,
}

/// A client able to pull the current listing from one provider kind
#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch_streams(&self, provider: &Provider) -> AppResult<Vec<FetchedStream>>;
}

/// Fetches a provider's current listing and reconciles it into the store
#[derive(Clone)]
pub struct IngestorService {
    database: Database,
    m3u: M3uClient,
    xtream: XtreamClient,
}

impl IngestorService {
    pub fn new(database: Database, request_timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent("m3u-console/0.1")
            .build()
            .map_err(|e| {
                AppError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            database,
            m3u: M3uClient::new(client.clone()),
            xtream: XtreamClient::new(client),
        })
    }

    pub async fn refresh_provider(&self, provider: &Provider) -> AppResult<RefreshSummary> {
        if !provider.is_active {
            return Err(SourceError::invalid_config("is_active", "provider is disabled").into());
        }

        let fetched = match provider.kind {
            ProviderKind::M3u => self.m3u.fetch_streams(provider).await?,
            ProviderKind::Xtream => self.xtream.fetch_streams(provider).await?,
        };

        let summary =
            reconcile::reconcile_provider_streams(&self.database, provider, fetched).await?;
        self.database.mark_provider_refreshed(provider.id).await?;

        info!(
            "Refreshed provider '{}': {} fetched, {} added, {} deactivated, {} reactivated",
            provider.name,
            summary.fetched,
            summary.added,
            summary.deactivated,
            summary.reactivated
        );
        Ok(summary)
    }
}
