//! IPTV stream console core.
//!
//! Users register providers (Xtream-codes API or static M3U sources); the
//! service pulls their listings into a per-user stream store, evaluates the
//! user's filter rules against candidate streams, and exports curated M3U8
//! playlists over HTTP.

pub mod config;
pub mod database;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod playlist;
pub mod web;
