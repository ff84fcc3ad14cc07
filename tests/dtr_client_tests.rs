use httpmock::prelude::*;
use serde_json::{json, Value};
use tacos_cli::config::Endpoint;
use tacos_cli::dtr::DtrClient;
use tacos_cli::TacosError;

fn client_for(server: &MockServer) -> DtrClient {
    DtrClient::new(&Endpoint {
        url: server.base_url(),
        token: None,
    })
    .unwrap()
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn fetch_type_returns_body_verbatim() {
    let server = MockServer::start();
    let body = r#"{"id":"10.1234/abc",   "name":"Example"}"#;
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/types/10.1234/abc");
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    });

    let out = client_for(&server).fetch_type("10.1234/abc").await.unwrap();

    mock.assert();
    assert_eq!(out, body);
}

#[tokio::test]
async fn fetch_schema_returns_body_verbatim() {
    let server = MockServer::start();
    let body = "{\n  \"pid\": \"21.T11969/root\",\n  \"content\": {}\n}";
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/root");
        then.status(200).body(body);
    });

    let out = client_for(&server)
        .fetch_schema("21.T11969/root")
        .await
        .unwrap();
    assert_eq!(out, body);
}

#[tokio::test]
async fn missing_type_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/missing");
        then.status(404).body("no such type");
    });

    let err = client_for(&server)
        .fetch_type("21.T11969/missing")
        .await
        .unwrap_err();
    assert!(matches!(err, TacosError::NotFound { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_registry_is_network_error() {
    let client = DtrClient::new(&Endpoint {
        url: closed_port_url(),
        token: None,
    })
    .unwrap();

    let err = client.fetch_type("21.T11969/any").await.unwrap_err();
    assert!(matches!(err, TacosError::Network { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn fetch_json_schema_strips_unique_keywords() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/schema/21.T11969/root");
        then.status(200).json_body(json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "type": "object",
            "properties": {
                "keywords": {"type": "array", "unique": true, "items": {"type": "string"}}
            }
        }));
    });

    let schema = client_for(&server)
        .fetch_json_schema("21.T11969/root")
        .await
        .unwrap();

    assert_eq!(
        schema["properties"]["keywords"],
        json!({"type": "array", "items": {"type": "string"}})
    );
    assert!(!schema.to_string().contains("\"unique\""));
}

#[tokio::test]
async fn fetch_json_schema_rejects_non_json_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/schema/21.T11969/html");
        then.status(200).body("<html>maintenance</html>");
    });

    let err = client_for(&server)
        .fetch_json_schema("21.T11969/html")
        .await
        .unwrap_err();
    assert!(matches!(err, TacosError::Conversion(_)));
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn resolve_subtypes_inlines_members_and_array_elements() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/root");
        then.status(200).json_body(json!({
            "pid": "21.T11969/root",
            "name": "Publication",
            "content": {"Schema": {"Type": "Object", "Properties": [
                {"Name": "title", "Type": "21.T11969/title"},
                {"Name": "authors", "Type": "21.T11969/authors"}
            ]}}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/title");
        then.status(200).json_body(json!({
            "pid": "21.T11969/title", "name": "Title",
            "content": {"Schema": {"Type": "String"}}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/authors");
        then.status(200).json_body(json!({
            "pid": "21.T11969/authors", "name": "Authors",
            "content": {"Schema": {"Type": "Array", "subCond": "21.T11969/author"}}
        }));
    });
    let author = server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/author");
        then.status(200).json_body(json!({
            "pid": "21.T11969/author", "name": "Author",
            "content": {"Schema": {"Type": "String"}}
        }));
    });

    let resolved = client_for(&server)
        .fetch_resolved_schema("21.T11969/root")
        .await
        .unwrap();

    author.assert();
    let props = resolved["content"]["Schema"]["Properties"]
        .as_array()
        .unwrap();
    assert_eq!(props[0]["Type"]["name"], "Title");
    let array_schema = &props[1]["Type"]["content"]["Schema"];
    assert_eq!(array_schema["Identifier"], "21.T11969/author");
    assert_eq!(array_schema["subCond"]["name"], Value::from("Author"));
}

#[tokio::test]
async fn resolve_subtypes_fails_when_a_member_is_missing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/root");
        then.status(200).json_body(json!({
            "pid": "21.T11969/root",
            "content": {"Schema": {"Type": "Object", "Properties": [
                {"Name": "gone", "Type": "21.T11969/gone"}
            ]}}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/gone");
        then.status(404);
    });

    let err = client_for(&server)
        .fetch_resolved_schema("21.T11969/root")
        .await
        .unwrap_err();
    assert!(matches!(err, TacosError::NotFound { .. }));
}

#[tokio::test]
async fn self_referencing_array_stops_at_depth_limit() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/types/21.T11969/list");
        then.status(200).json_body(json!({
            "pid": "21.T11969/list", "name": "List",
            "content": {"Schema": {"Type": "Array", "subCond": "21.T11969/list"}}
        }));
    });

    let err = client_for(&server)
        .fetch_resolved_schema("21.T11969/list")
        .await
        .unwrap_err();
    match &err {
        TacosError::Conversion(msg) => assert!(msg.contains("deeper than 32")),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(err.exit_code(), 5);
}
