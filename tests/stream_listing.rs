//! Paged stream listing: page/limit handling and filtering.

mod common;

use uuid::Uuid;

use common::{new_stream, provider_request, test_database};
use m3u_console::models::*;

fn list_request(page: Option<u32>, limit: Option<u32>) -> StreamListRequest {
    StreamListRequest {
        stream_type: None,
        provider: None,
        category: None,
        page,
        limit,
    }
}

#[tokio::test]
async fn listing_pages_through_streams_in_name_order() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    for name in ["Charlie", "Alpha", "Bravo"] {
        db.create_stream(user_id, &new_stream(None, name, &format!("http://x/{name}")))
            .await
            .unwrap();
    }

    let first = db
        .list_streams(user_id, &list_request(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(first.total_count, 3);
    assert_eq!(first.total_pages, 2);
    let names: Vec<&str> = first.streams.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo"]);

    let second = db
        .list_streams(user_id, &list_request(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(second.streams.len(), 1);
    assert_eq!(second.streams[0].name, "Charlie");
}

#[tokio::test]
async fn out_of_range_page_yields_empty_listing() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    for i in 0..3 {
        db.create_stream(
            user_id,
            &new_stream(None, &format!("Channel {i}"), &format!("http://x/{i}")),
        )
        .await
        .unwrap();
    }

    // Largest page a client can request; the offset must not overflow
    let listing = db
        .list_streams(user_id, &list_request(Some(u32::MAX), Some(50)))
        .await
        .unwrap();

    assert!(listing.streams.is_empty());
    assert_eq!(listing.total_count, 3);
    assert_eq!(listing.total_pages, 1);
}

#[tokio::test]
async fn listing_narrows_by_provider() {
    let db = test_database().await;
    let user_id = Uuid::new_v4();

    let provider = db
        .create_provider(user_id, &provider_request("main", 0, true))
        .await
        .unwrap();
    db.create_stream(user_id, &new_stream(Some(provider.id), "Owned", "http://x/1"))
        .await
        .unwrap();
    db.create_stream(user_id, &new_stream(None, "Loose", "http://x/2"))
        .await
        .unwrap();

    let mut request = list_request(None, None);
    request.provider = Some(provider.id);
    let listing = db.list_streams(user_id, &request).await.unwrap();

    assert_eq!(listing.total_count, 1);
    assert_eq!(listing.streams[0].name, "Owned");
}
