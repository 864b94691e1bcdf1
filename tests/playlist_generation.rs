//! End-to-end playlist generation: store -> filter engine -> emitter.

mod common;

use uuid::Uuid;

use common::{new_stream, provider_request, test_database};
use m3u_console::models::*;
use m3u_console::playlist::PlaylistService;

#[tokio::test]
async fn empty_store_emits_bare_header() {
    let db = test_database().await;
    let service = PlaylistService::new(db);

    let playlist = service
        .generate(Uuid::new_v4(), StreamType::Live, None)
        .await
        .unwrap();

    assert_eq!(playlist.content, "#EXTM3U\n");
    assert_eq!(playlist.candidate_count, 0);
    assert_eq!(playlist.included_count, 0);
}

#[tokio::test]
async fn streams_are_ordered_by_provider_priority_then_name() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let low = db
        .create_provider(user_id, &provider_request("low", 10, true))
        .await
        .unwrap();
    let high = db
        .create_provider(user_id, &provider_request("high", 1, true))
        .await
        .unwrap();

    db.create_stream(user_id, &new_stream(Some(low.id), "Zebra TV", "http://x/z"))
        .await
        .unwrap();
    db.create_stream(user_id, &new_stream(Some(high.id), "Beta TV", "http://x/b"))
        .await
        .unwrap();
    db.create_stream(user_id, &new_stream(Some(high.id), "Alpha TV", "http://x/a"))
        .await
        .unwrap();

    let service = PlaylistService::new(db);
    let playlist = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();

    let uris: Vec<&str> = playlist
        .content
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect();
    assert_eq!(uris, vec!["http://x/a", "http://x/b", "http://x/z"]);
}

#[tokio::test]
async fn exclude_rule_removes_matching_streams() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let provider = db
        .create_provider(user_id, &provider_request("main", 0, true))
        .await
        .unwrap();

    let mut adult = new_stream(Some(provider.id), "Adult Channel", "http://x/1");
    adult.tvg_group = Some("XXX".to_string());
    db.create_stream(user_id, &adult).await.unwrap();
    db.create_stream(user_id, &new_stream(Some(provider.id), "News 24", "http://x/2"))
        .await
        .unwrap();

    db.create_filter_rule(
        user_id,
        &FilterRuleCreateRequest {
            kind: FilterRuleKind::ExcludeName,
            pattern: "Adult".to_string(),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let service = PlaylistService::new(db);
    let playlist = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();

    assert_eq!(playlist.candidate_count, 2);
    assert_eq!(playlist.included_count, 1);
    assert!(playlist.content.contains("http://x/2"));
    assert!(!playlist.content.contains("http://x/1"));
}

#[tokio::test]
async fn should_filter_false_provider_bypasses_rules() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let unfiltered = db
        .create_provider(user_id, &provider_request("unfiltered", 0, false))
        .await
        .unwrap();
    db.create_stream(
        user_id,
        &new_stream(Some(unfiltered.id), "Adult Channel", "http://x/1"),
    )
    .await
    .unwrap();

    db.create_filter_rule(
        user_id,
        &FilterRuleCreateRequest {
            kind: FilterRuleKind::ExcludeName,
            pattern: "Adult".to_string(),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let service = PlaylistService::new(db);
    let playlist = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();

    assert_eq!(playlist.included_count, 1);
    assert!(playlist.content.contains("http://x/1"));
}

#[tokio::test]
async fn invalid_regex_rule_does_not_abort_generation() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let provider = db
        .create_provider(user_id, &provider_request("main", 0, true))
        .await
        .unwrap();
    db.create_stream(user_id, &new_stream(Some(provider.id), "News 24", "http://x/2"))
        .await
        .unwrap();

    db.create_filter_rule(
        user_id,
        &FilterRuleCreateRequest {
            kind: FilterRuleKind::ExcludeNameRegex,
            pattern: "([unclosed".to_string(),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let service = PlaylistService::new(db);
    let playlist = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();

    assert_eq!(playlist.included_count, 1);
}

#[tokio::test]
async fn generation_is_scoped_by_user_type_and_activity() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    let provider = db
        .create_provider(user_id, &provider_request("main", 0, true))
        .await
        .unwrap();

    let visible = db
        .create_stream(user_id, &new_stream(Some(provider.id), "Visible", "http://x/v"))
        .await
        .unwrap();

    // Wrong type
    let mut vod = new_stream(Some(provider.id), "A Movie", "http://x/m");
    vod.stream_type = StreamType::Vod;
    db.create_stream(user_id, &vod).await.unwrap();

    // Inactive
    let inactive = db
        .create_stream(user_id, &new_stream(Some(provider.id), "Gone", "http://x/g"))
        .await
        .unwrap();
    db.set_stream_active(user_id, inactive.id, false)
        .await
        .unwrap();

    // Uncategorized
    let other_cat = db
        .create_stream(user_id, &new_stream(Some(provider.id), "Other", "http://x/o"))
        .await
        .unwrap();
    db.move_stream(
        user_id,
        other_cat.id,
        &StreamMoveRequest {
            stream_type: None,
            category: Some(StreamCategory::Other),
        },
    )
    .await
    .unwrap();

    // Wrong user
    db.create_stream(other_user, &new_stream(None, "Foreign", "http://x/f"))
        .await
        .unwrap();

    let service = PlaylistService::new(db);
    let playlist = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();

    assert_eq!(playlist.included_count, 1);
    assert!(playlist.content.contains(&visible.stream_url));
}

#[tokio::test]
async fn provider_filter_narrows_the_export() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let first = db
        .create_provider(user_id, &provider_request("first", 0, true))
        .await
        .unwrap();
    let second = db
        .create_provider(user_id, &provider_request("second", 1, true))
        .await
        .unwrap();

    db.create_stream(user_id, &new_stream(Some(first.id), "One", "http://x/1"))
        .await
        .unwrap();
    db.create_stream(user_id, &new_stream(Some(second.id), "Two", "http://x/2"))
        .await
        .unwrap();

    let service = PlaylistService::new(db);
    let playlist = service
        .generate(user_id, StreamType::Live, Some(first.id))
        .await
        .unwrap();

    assert_eq!(playlist.included_count, 1);
    assert!(playlist.content.contains("http://x/1"));
    assert!(!playlist.content.contains("http://x/2"));
}

#[tokio::test]
async fn generation_is_deterministic() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let provider = db
        .create_provider(user_id, &provider_request("main", 0, true))
        .await
        .unwrap();
    for i in 0..5 {
        db.create_stream(
            user_id,
            &new_stream(Some(provider.id), &format!("Channel {i}"), &format!("http://x/{i}")),
        )
        .await
        .unwrap();
    }

    let service = PlaylistService::new(db);
    let first = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();
    let second = service
        .generate(user_id, StreamType::Live, None)
        .await
        .unwrap();

    assert_eq!(first.content, second.content);
}
