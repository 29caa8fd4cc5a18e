// ABOUTME: Test suite for the v2 usercollection API client
// ABOUTME: Verifies resource path mapping, date/cursor query translation, and error mapping

// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use chrono::NaiveDate;
use helpers::MockServer;
use oura_client::{OuraClientV2, OuraError, QueryWindow};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn daily_activity_sends_start_and_end_date_parameters() {
    let server = MockServer::spawn(|_| (200, r#"{"data":[],"next_token":null}"#.to_owned())).await;
    let client = OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url);

    let window = QueryWindow::dates(Some(day(2023, 3, 1)), Some(day(2023, 3, 7)));
    client.daily_activity(&window).await.unwrap();

    let requests = server.requests_to("/daily_activity");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].query,
        vec![
            ("start_date".to_owned(), "2023-03-01".to_owned()),
            ("end_date".to_owned(), "2023-03-07".to_owned()),
        ]
    );
    assert_eq!(requests[0].bearer.as_deref(), Some("pat-token"));
}

#[tokio::test]
async fn pagination_cursor_is_forwarded_unchanged() {
    let server = MockServer::spawn(|_| (200, r#"{"data":[],"next_token":null}"#.to_owned())).await;
    let client = OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url);

    let window = QueryWindow::dates(Some(day(2023, 3, 1)), None).with_next_token("cursor-xyz");
    client.heart_rate(&window).await.unwrap();

    let requests = server.requests_to("/heartrate");
    assert_eq!(
        requests[0].query,
        vec![
            ("start_date".to_owned(), "2023-03-01".to_owned()),
            ("next_token".to_owned(), "cursor-xyz".to_owned()),
        ]
    );
}

#[tokio::test]
async fn empty_window_sends_no_query_parameters() {
    let server = MockServer::spawn(|_| (200, r#"{"data":[]}"#.to_owned())).await;
    let client = OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url);

    client.sleep(&QueryWindow::default()).await.unwrap();

    assert!(server.requests_to("/sleep")[0].query.is_empty());
}

#[tokio::test]
async fn personal_info_hits_its_path_without_parameters() {
    let server = MockServer::spawn(|_| (200, r#"{"age":31,"email":"a@b.c"}"#.to_owned())).await;
    let client = OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url);

    let body = client.personal_info().await.unwrap();

    let requests = server.requests_to("/personal_info");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].query.is_empty());
    assert_eq!(body["email"], "a@b.c");
}

#[tokio::test]
async fn each_resource_maps_to_its_path_segment() {
    let server = MockServer::spawn(|_| (200, r#"{"data":[]}"#.to_owned())).await;
    let client = OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url);
    let window = QueryWindow::default();

    client.daily_activity(&window).await.unwrap();
    client.daily_readiness(&window).await.unwrap();
    client.daily_sleep(&window).await.unwrap();
    client.sleep(&window).await.unwrap();
    client.heart_rate(&window).await.unwrap();
    client.sessions(&window).await.unwrap();
    client.tags(&window).await.unwrap();
    client.workouts(&window).await.unwrap();
    client.cardiovascular_age(&window).await.unwrap();
    client.vo2_max(&window).await.unwrap();

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/daily_activity",
            "/daily_readiness",
            "/daily_sleep",
            "/sleep",
            "/heartrate",
            "/session",
            "/tag",
            "/workout",
            "/daily_cardiovascular_age",
            "/vO2_max",
        ]
    );
}

#[tokio::test]
async fn rate_limit_responses_carry_status_and_body() {
    let server = MockServer::spawn(|_| (429, r#"{"detail":"slow down"}"#.to_owned())).await;
    let client = OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url);

    let err = client
        .workouts(&QueryWindow::default())
        .await
        .unwrap_err();

    match err {
        OuraError::Api { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("slow down"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
