use uuid::Uuid;

use m3u_console::config::DatabaseConfig;
use m3u_console::database::Database;
use m3u_console::models::*;

/// A file-backed throwaway database; SQLite in-memory databases are
/// per-connection, which does not mix with a connection pool.
pub async fn test_database() -> Database {
    let path = std::env::temp_dir().join(format!("m3u-console-test-{}.db", Uuid::new_v4()));
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: Some(2),
    };

    let database = Database::new(&config).await.expect("create test database");
    database.migrate().await.expect("run migrations");
    database
}

pub fn provider_request(name: &str, priority: i32, should_filter: bool) -> ProviderCreateRequest {
    ProviderCreateRequest {
        name: name.to_string(),
        kind: ProviderKind::M3u,
        url: format!("http://{}.example.com/playlist.m3u8", name),
        username: None,
        password: None,
        stream_kind: None,
        priority: Some(priority),
        should_filter: Some(should_filter),
        refresh_period_days: Some(1),
    }
}

pub fn new_stream(provider_id: Option<Uuid>, name: &str, url: &str) -> NewStream {
    NewStream {
        provider_id,
        stream_type: StreamType::Live,
        channel_number: String::new(),
        name: name.to_string(),
        original_name: name.to_string(),
        stream_url: url.to_string(),
        tvg_id: None,
        tvg_group: None,
        tvg_logo: None,
        extras: None,
    }
}
