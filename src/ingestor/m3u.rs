//! M3U source client
//!
//! Fetches and parses standard and extended M3U/M3U8 playlists with EXTINF
//! metadata. Entries from an M3U provider are always live channels; VOD and
//! series listings only exist on Xtream sources.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::errors::{AppResult, SourceError};
use crate::models::{Provider, StreamType};

use super::{FetchedStream, SourceClient};

#[derive(Clone)]
pub struct M3uClient {
    client: Client,
}

impl M3uClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_playlist(&self, url: &str) -> AppResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::request_failed(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::request_failed(url, e.to_string()).into())
    }
}

#[async_trait]
impl SourceClient for M3uClient {
    async fn fetch_streams(&self, provider: &Provider) -> AppResult<Vec<FetchedStream>> {
        let content = self.fetch_playlist(&provider.url).await?;
        let streams = parse_m3u_playlist(&content);
        debug!(
            "Parsed {} entries from M3U provider '{}'",
            streams.len(),
            provider.name
        );
        Ok(streams)
    }
}

/// Parse M3U content into fetched stream entries.
///
/// URL lines with no preceding `#EXTINF` still produce an entry, named after
/// the URL, so sloppy playlists are not silently truncated.
pub fn parse_m3u_playlist(content: &str) -> Vec<FetchedStream> {
    let mut streams = Vec::new();
    let mut pending: Option<(String, HashMap<String, String>, String)> = None;

    for (line_num, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(extinf) = line.strip_prefix("#EXTINF:") {
            match parse_extinf(extinf) {
                Some((title, attributes, channel_number)) => {
                    pending = Some((title, attributes, channel_number));
                }
                None => {
                    warn!("Skipping malformed EXTINF at line {}", line_num + 1);
                    pending = None;
                }
            }
        } else if !line.starts_with('#') {
            let (title, attributes, channel_number) = pending.take().unwrap_or_else(|| {
                warn!(
                    "Stream URL without EXTINF metadata at line {}: {}",
                    line_num + 1,
                    line
                );
                (line.to_string(), HashMap::new(), String::new())
            });

            let name = match attributes.get("tvg-name") {
                Some(tvg_name) if !tvg_name.is_empty() => tvg_name.clone(),
                _ => title,
            };
            let group = attributes
                .get("group-title")
                .or_else(|| attributes.get("tvg-group"))
                .cloned();

            streams.push(FetchedStream {
                stream_type: StreamType::Live,
                original_name: name.clone(),
                name,
                stream_url: line.to_string(),
                channel_number: attributes
                    .get("tvg-chno")
                    .cloned()
                    .unwrap_or_else(|| channel_number.clone()),
                tvg_id: attributes.get("tvg-id").cloned(),
                tvg_group: group,
                tvg_logo: attributes.get("tvg-logo").cloned(),
            });
        }
    }

    streams
}

/// Split an EXTINF payload (`duration attrs,title`) into title, attribute
/// map and channel number hint. Returns `None` when no title separator is
/// present.
fn parse_extinf(extinf: &str) -> Option<(String, HashMap<String, String>, String)> {
    // The title follows the last comma outside quotes
    let comma_pos = find_title_comma(extinf)?;
    let (duration_and_attrs, title) = extinf.split_at(comma_pos);
    let title = title.trim_start_matches(',').trim().to_string();

    let attributes = parse_attributes(duration_and_attrs);
    Some((title, attributes, String::new()))
}

fn find_title_comma(extinf: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut last_comma = None;
    for (idx, ch) in extinf.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last_comma = Some(idx),
            _ => {}
        }
    }
    last_comma
}

/// Scan `key="value"` pairs out of the attribute section of an EXTINF line
fn parse_attributes(attrs_part: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let mut rest = attrs_part;

    while let Some(eq_pos) = rest.find('=') {
        let key = rest[..eq_pos]
            .rsplit(|c: char| c.is_whitespace())
            .next()
            .unwrap_or("")
            .trim();
        rest = &rest[eq_pos + 1..];

        let value = if let Some(stripped) = rest.strip_prefix('"') {
            match stripped.find('"') {
                Some(end) => {
                    let value = &stripped[..end];
                    rest = &stripped[end + 1..];
                    value
                }
                None => {
                    // Unterminated quote, take the remainder
                    rest = "";
                    stripped
                }
            }
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace())
                .unwrap_or(rest.len());
            let value = &rest[..end];
            rest = &rest[end..];
            value
        };

        if !key.is_empty() {
            attributes.insert(key.to_string(), value.to_string());
        }
    }

    attributes
}
