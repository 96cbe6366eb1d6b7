#![allow(clippy::unwrap_used, clippy::expect_used)]

use httpmock::prelude::*;
use serde_json::json;
use strata_sdk::objects::{self, ObjectInfoUpdate, ObjectType};
use strata_sdk::search::{MetadataSearch, SearchPattern};
use strata_sdk::{ApiRequest, Connection, SdkConfig, SdkError};

fn connect(server: &MockServer) -> Connection {
    let mut config = SdkConfig::new(format!("{}/StrataLibrary", server.base_url()))
        .with_auth_token("tok-abc")
        .with_project("PRJ1");
    config.allow_insecure_http = true;
    Connection::from_config(&config).unwrap()
}

#[tokio::test]
async fn sends_auth_and_project_headers() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/StrataLibrary/api/objects/A1")
            .query_param("type", "12")
            .header("x-auth-token", "tok-abc")
            .header("x-project-id", "PRJ1");
        then.status(200)
            .json_body(json!({"id": "A1", "name": "Region", "type": 12, "hidden": false}));
    });

    let conn = connect(&server);
    let info = objects::get_object_info(&conn, "A1", ObjectType::Attribute)
        .await
        .unwrap();

    m.assert();
    assert_eq!(info.name, "Region");
    assert_eq!(info.hidden, Some(false));
}

#[tokio::test]
async fn non_2xx_maps_to_api_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/StrataLibrary/api/objects/A1");
        then.status(403)
            .json_body(json!({"code": "ERR014", "message": "Insufficient privileges"}));
    });

    let conn = connect(&server);
    let err = objects::delete_object(&conn, "A1", ObjectType::Attribute)
        .await
        .unwrap_err();

    match err {
        SdkError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 403);
            assert_eq!(code.as_deref(), Some("ERR014"));
            assert_eq!(message, "Insufficient privileges");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn update_object_info_sends_pruned_body() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(PUT)
            .path("/StrataLibrary/api/objects/A1")
            .query_param("type", "12")
            .json_body(json!({"hidden": true, "comments": "reviewed"}));
        then.status(200).json_body(json!({"id": "A1", "name": "Region", "hidden": true}));
    });

    let conn = connect(&server);
    let update = ObjectInfoUpdate {
        hidden: Some(true),
        comments: Some("reviewed".to_owned()),
        ..ObjectInfoUpdate::default()
    };
    let info = objects::update_object_info(&conn, "A1", ObjectType::Attribute, &update)
        .await
        .unwrap();

    m.assert();
    assert_eq!(info.hidden, Some(true));
}

#[tokio::test]
async fn metadata_search_starts_then_reads_results() {
    let server = MockServer::start();
    let start = server.mock(|when, then| {
        when.method(POST)
            .path("/StrataLibrary/api/metadataSearches/results")
            .query_param("name", "Region")
            .query_param("pattern", "2")
            .query_param("type", "12");
        then.status(200).json_body(json!({"id": "SEARCH1"}));
    });
    let results = server.mock(|when, then| {
        when.method(GET)
            .path("/StrataLibrary/api/metadataSearches/results")
            .query_param("searchId", "SEARCH1")
            .query_param("offset", "0");
        then.status(200)
            .json_body(json!([{"id": "A1", "name": "Region"}, {"id": "A2", "name": "Region"}]));
    });

    let conn = connect(&server);
    let found = MetadataSearch::new(ObjectType::Attribute)
        .name("Region", SearchPattern::Exactly)
        .run(&conn, None)
        .await
        .unwrap();

    start.assert();
    results.assert();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn explicit_project_header_is_not_overridden() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/StrataLibrary/api/subscriptions")
            .header("x-project-id", "OTHER");
        then.status(200).json_body(json!({"subscriptions": []}));
    });

    let conn = connect(&server);
    let resp = conn
        .send(ApiRequest::get("/api/subscriptions").header("X-Project-ID", "OTHER"))
        .await
        .unwrap();

    m.assert();
    assert!(resp.ok());
}
