//! Xtream-codes API client
//!
//! Talks to `player_api.php` and maps the live/VOD/series listings into
//! fetched stream entries. Xtream panels are notoriously loose about JSON
//! types (numbers arriving as strings and vice versa), so the response
//! structs deserialize those fields tolerantly.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::{AppResult, SourceError};
use crate::models::{Provider, StreamType};

use super::{FetchedStream, SourceClient};

fn number_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(D::Error::custom("expected string or number")),
    }
}

fn optional_number_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("expected string, number, or null")),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct XtreamLiveStream {
    pub name: String,
    #[serde(deserialize_with = "number_as_string")]
    pub stream_id: String,
    #[serde(default, deserialize_with = "optional_number_as_string")]
    pub num: Option<String>,
    #[serde(default)]
    pub stream_icon: Option<String>,
    #[serde(default)]
    pub epg_channel_id: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XtreamVodStream {
    pub name: String,
    #[serde(deserialize_with = "number_as_string")]
    pub stream_id: String,
    #[serde(default, deserialize_with = "optional_number_as_string")]
    pub num: Option<String>,
    #[serde(default)]
    pub stream_icon: Option<String>,
    #[serde(default)]
    pub container_extension: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XtreamSeries {
    pub name: String,
    #[serde(deserialize_with = "number_as_string")]
    pub series_id: String,
    #[serde(default, deserialize_with = "optional_number_as_string")]
    pub num: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[derive(Clone)]
pub struct XtreamClient {
    client: Client,
}

impl XtreamClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn credentials<'a>(provider: &'a Provider) -> AppResult<(&'a str, &'a str)> {
        let username = provider
            .username
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SourceError::invalid_config("username", "required for xtream"))?;
        let password = provider
            .password
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SourceError::invalid_config("password", "required for xtream"))?;
        Ok((username, password))
    }

    fn api_url(provider: &Provider, action: &str) -> AppResult<String> {
        let base = Url::parse(&provider.url)
            .map_err(|e| SourceError::invalid_config("url", e.to_string()))?;
        let (username, password) = Self::credentials(provider)?;

        Ok(format!(
            "{}/player_api.php?username={}&password={}&action={}",
            base.as_str().trim_end_matches('/'),
            urlencoding::encode(username),
            urlencoding::encode(password),
            action
        ))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        provider: &Provider,
        action: &str,
    ) -> AppResult<T> {
        let url = Self::api_url(provider, action)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::request_failed(&provider.url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Http {
                status: response.status().as_u16(),
                url: provider.url.clone(),
            }
            .into());
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::parse_error("xtream", e.to_string()).into())
    }

    pub async fn get_live_streams(&self, provider: &Provider) -> AppResult<Vec<XtreamLiveStream>> {
        self.get_json(provider, "get_live_streams").await
    }

    pub async fn get_vod_streams(&self, provider: &Provider) -> AppResult<Vec<XtreamVodStream>> {
        self.get_json(provider, "get_vod_streams").await
    }

    pub async fn get_series(&self, provider: &Provider) -> AppResult<Vec<XtreamSeries>> {
        self.get_json(provider, "get_series").await
    }
}

#[async_trait]
impl SourceClient for XtreamClient {
    async fn fetch_streams(&self, provider: &Provider) -> AppResult<Vec<FetchedStream>> {
        let base = provider.url.trim_end_matches('/');
        let (username, password) = Self::credentials(provider)?;

        let mut streams = Vec::new();

        for live in self.get_live_streams(provider).await? {
            streams.push(FetchedStream {
                stream_type: StreamType::Live,
                original_name: live.name.clone(),
                name: live.name,
                stream_url: format!(
                    "{base}/live/{username}/{password}/{}.{}",
                    live.stream_id, provider.stream_kind
                ),
                channel_number: live.num.unwrap_or_default(),
                tvg_id: live.epg_channel_id,
                tvg_group: live.category_name,
                tvg_logo: live.stream_icon,
            });
        }

        for vod in self.get_vod_streams(provider).await? {
            let extension = vod.container_extension.as_deref().unwrap_or("mp4");
            streams.push(FetchedStream {
                stream_type: StreamType::Vod,
                original_name: vod.name.clone(),
                name: vod.name,
                stream_url: format!(
                    "{base}/movie/{username}/{password}/{}.{extension}",
                    vod.stream_id
                ),
                channel_number: vod.num.unwrap_or_default(),
                tvg_id: None,
                tvg_group: vod.category_name,
                tvg_logo: vod.stream_icon,
            });
        }

        for series in self.get_series(provider).await? {
            streams.push(FetchedStream {
                stream_type: StreamType::Series,
                original_name: series.name.clone(),
                name: series.name,
                stream_url: format!(
                    "{base}/series/{username}/{password}/{}",
                    series.series_id
                ),
                channel_number: series.num.unwrap_or_default(),
                tvg_id: None,
                tvg_group: series.category_name,
                tvg_logo: series.cover,
            });
        }

        debug!(
            "Fetched {} entries from xtream provider '{}'",
            streams.len(),
            provider.name
        );
        Ok(streams)
    }
}
