// ABOUTME: Test suite for the tabular client wrappers
// ABOUTME: Verifies envelope extraction, date indexing, and the combined join

// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use chrono::NaiveDate;
use helpers::MockServer;
use oura_client::{OuraClient, OuraClientV2, OuraError, QueryWindow, TableClient, TableClientV2};
use serde_json::json;

fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn v1_table_client(server: &MockServer) -> TableClient {
    TableClient::new(OuraClient::from_personal_token("pat-token").with_api_base(&server.base_url))
}

fn v2_table_client(server: &MockServer) -> TableClientV2 {
    TableClientV2::new(
        OuraClientV2::from_personal_token("pat-token").with_api_base(&server.base_url),
    )
}

#[tokio::test]
async fn sleep_table_unwraps_the_envelope_and_indexes_by_summary_date() {
    let body = json!({
        "sleep": [
            {"summary_date": "2020-10-30", "score": 80, "total": 24000},
            {"summary_date": "2020-10-31", "score": 85, "total": 26000},
        ]
    });
    let server = MockServer::spawn(move |_| (200, body.to_string())).await;

    let table = v1_table_client(&server)
        .sleep_table(&QueryWindow::default(), true)
        .await
        .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.columns(), ["score", "total"]);
    let row = table.row(day("2020-10-31")).unwrap();
    assert_eq!(row.get("score"), Some(&json!(85)));
    // The date key is consumed by the index rather than kept as a column.
    assert_eq!(row.get("summary_date"), None);
}

#[tokio::test]
async fn missing_envelope_is_a_shape_error() {
    let server = MockServer::spawn(|_| (200, r#"{"status":"ok"}"#.to_owned())).await;

    let err = v1_table_client(&server)
        .readiness_table(&QueryWindow::default(), true)
        .await
        .unwrap_err();

    assert!(matches!(err, OuraError::Shape { .. }));
    assert!(err.to_string().contains("readiness"));
}

#[tokio::test]
async fn mistyped_envelope_is_a_shape_error() {
    let server = MockServer::spawn(|_| (200, r#"{"activity":"not a list"}"#.to_owned())).await;

    let err = v1_table_client(&server)
        .activity_table(&QueryWindow::default(), true)
        .await
        .unwrap_err();

    assert!(matches!(err, OuraError::Shape { .. }));
}

#[tokio::test]
async fn bedtime_table_uses_its_own_envelope_and_date_key() {
    let body = json!({
        "ideal_bedtimes": [
            {"date": "2020-10-31", "bedtime_window": {"start": -3600, "end": 0}},
        ]
    });
    let server = MockServer::spawn(move |_| (200, body.to_string())).await;

    let table = v1_table_client(&server)
        .bedtime_table(&QueryWindow::default(), true)
        .await
        .unwrap();

    let row = table.row(day("2020-10-31")).unwrap();
    assert_eq!(row.get("bedtime_window.start"), Some(&json!(-3600)));
}

#[tokio::test]
async fn user_info_table_is_a_single_unindexed_row() {
    let server = MockServer::spawn(|_| {
        (200, r#"{"age":31,"weight":74.5,"email":"a@b.c"}"#.to_owned())
    })
    .await;

    let table = v1_table_client(&server).user_info_table(true).await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].date(), None);
    assert_eq!(table.rows()[0].get("age"), Some(&json!(31)));
}

#[tokio::test]
async fn combined_table_joins_the_three_summaries_with_prefixes() {
    let server = MockServer::spawn(|request| {
        let body = match request.path.as_str() {
            "/sleep" => json!({"sleep": [
                {"summary_date": "2020-10-30", "score": 80},
                {"summary_date": "2020-10-31", "score": 85},
            ]}),
            "/readiness" => json!({"readiness": [
                {"summary_date": "2020-10-30", "score": 70},
                {"summary_date": "2020-10-31", "score": 75},
            ]}),
            "/activity" => json!({"activity": [
                {"summary_date": "2020-10-31", "score": 90},
            ]}),
            other => panic!("unexpected path {other}"),
        };
        (200, body.to_string())
    })
    .await;

    let table = v1_table_client(&server)
        .combined_table(&QueryWindow::default(), true)
        .await
        .unwrap();

    // Inner join: only the date present in all three summaries survives.
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.columns(),
        ["SLEEP:score", "READY:score", "ACTIVITY:score"]
    );
    let row = table.row(day("2020-10-31")).unwrap();
    assert_eq!(row.get("SLEEP:score"), Some(&json!(85)));
    assert_eq!(row.get("READY:score"), Some(&json!(75)));
    assert_eq!(row.get("ACTIVITY:score"), Some(&json!(90)));
}

#[tokio::test]
async fn v2_tables_unwrap_the_data_envelope() {
    let body = json!({
        "data": [
            {"day": "2023-03-01", "score": 82, "contributors": {"deep_sleep": 90}},
        ],
        "next_token": null
    });
    let server = MockServer::spawn(move |_| (200, body.to_string())).await;

    let table = v2_table_client(&server)
        .daily_sleep_table(&QueryWindow::default(), true)
        .await
        .unwrap();

    let row = table.row(day("2023-03-01")).unwrap();
    assert_eq!(row.get("score"), Some(&json!(82)));
    assert_eq!(row.get("contributors.deep_sleep"), Some(&json!(90)));
}

#[tokio::test]
async fn v2_timestamp_indexed_tables_truncate_to_the_date() {
    let body = json!({
        "data": [
            {"timestamp": "2023-03-01T07:12:00+00:00", "bpm": 58, "source": "sleep"},
        ],
        "next_token": null
    });
    let server = MockServer::spawn(move |_| (200, body.to_string())).await;

    let table = v2_table_client(&server)
        .heart_rate_table(&QueryWindow::default(), false)
        .await
        .unwrap();

    assert_eq!(table.rows()[0].date(), Some(day("2023-03-01")));
    assert_eq!(table.rows()[0].get("bpm"), Some(&json!(58)));
}

#[tokio::test]
async fn v2_personal_info_table_is_a_single_unindexed_row() {
    let server =
        MockServer::spawn(|_| (200, r#"{"id":"abc","age":31,"email":"a@b.c"}"#.to_owned())).await;

    let table = v2_table_client(&server)
        .personal_info_table(false)
        .await
        .unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].date(), None);
    assert_eq!(table.rows()[0].get("id"), Some(&json!("abc")));
}
