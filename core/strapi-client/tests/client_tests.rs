use std::error::Error;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use strapi_client::{
    ClientError, MediaAuth, RemoteFileFetcher, Reporter, StrapiClient, StrapiConfig,
};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Reporter that records every call.
#[derive(Default)]
struct RecordingReporter {
    infos: Mutex<Vec<String>>,
    panics: Mutex<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn panic(&self, message: &str, error: &(dyn Error + 'static)) {
        self.panics
            .lock()
            .unwrap()
            .push(format!("{message}: {error}"));
    }
}

fn client_for(server: &MockServer) -> StrapiClient {
    StrapiClient::new(StrapiConfig::new(server.uri())).unwrap()
}

fn client_with_token(server: &MockServer, token: &str) -> StrapiClient {
    StrapiClient::new(StrapiConfig {
        jwt_token: Some(token.to_string()),
        ..StrapiConfig::new(server.uri())
    })
    .unwrap()
}

// ── Construction ────────────────────────────────────────────────

#[test]
fn new_rejects_invalid_config() {
    let result = StrapiClient::new(StrapiConfig::new("not a url"));
    assert!(matches!(result, Err(ClientError::Config(_))));
}

#[test]
fn entity_url_shape() {
    let client = StrapiClient::new(StrapiConfig::new("https://cms.test")).unwrap();
    assert_eq!(
        client.entity_url("articles"),
        "https://cms.test/articles?_limit=100"
    );
    assert_eq!(
        client.entity_url("/articles"),
        "https://cms.test/articles?_limit=100"
    );
}

// ── fetch_data ──────────────────────────────────────────────────

#[tokio::test]
async fn fetch_data_cleans_array_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("_limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "__v": 0, "title": "Hi", "body": "rich" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = RecordingReporter::default();
    let entities = client_for(&server)
        .fetch_data("articles", &reporter)
        .await
        .unwrap();

    assert_eq!(
        entities,
        vec![json!({ "id": "1", "title": "Hi", "body": "rich" })]
    );
    assert_eq!(
        reporter.infos.lock().unwrap().as_slice(),
        &[format!(
            "Starting to fetch data from Strapi - {}/articles?_limit=100",
            server.uri()
        )]
    );
    assert!(reporter.panics.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fetch_data_wraps_single_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/homepage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "headline": "Hello" })),
        )
        .mount(&server)
        .await;

    let entities = client_for(&server)
        .fetch_data("homepage", &RecordingReporter::default())
        .await
        .unwrap();

    assert_eq!(entities, vec![json!({ "id": 7, "headline": "Hello" })]);
}

#[tokio::test]
async fn fetch_data_uses_configured_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("_limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = StrapiClient::new(StrapiConfig {
        query_limit: 5,
        ..StrapiConfig::new(server.uri())
    })
    .unwrap();

    let entities = client
        .fetch_data("articles", &RecordingReporter::default())
        .await
        .unwrap();
    assert!(entities.is_empty());
}

#[tokio::test]
async fn fetch_data_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client_with_token(&server, "secret")
        .fetch_data("articles", &RecordingReporter::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn fetch_data_without_token_sends_no_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client_for(&server)
        .fetch_data("articles", &RecordingReporter::default())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn fetch_data_failure_is_reported_and_returned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reporter = RecordingReporter::default();
    let result = client_for(&server).fetch_data("articles", &reporter).await;

    match result {
        Err(e @ ClientError::Status { .. }) => assert_eq!(e.status(), Some(500)),
        other => panic!("expected status error, got {other:?}"),
    }
    let panics = reporter.panics.lock().unwrap();
    assert_eq!(panics.len(), 1);
    assert!(panics[0].starts_with("Failed to fetch data from Strapi"));
}

#[tokio::test]
async fn fetch_data_malformed_json_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let reporter = RecordingReporter::default();
    let result = client_for(&server).fetch_data("articles", &reporter).await;

    assert!(matches!(result, Err(ClientError::Serialization(_))));
    assert_eq!(reporter.panics.lock().unwrap().len(), 1);
}

// ── fetch_metadata ──────────────────────────────────────────────

async fn mount_schema(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/content-type-builder/content-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "uid": "application::article.article",
                    "schema": {
                        "kind": "collectionType",
                        "attributes": {
                            "title": { "type": "string" },
                            "body": { "type": "richtext" },
                            "sections": { "type": "component", "repeatable": true, "component": "blocks.text" },
                            "author": { "target": "application::author.author" },
                            "owner": { "target": "plugins::users-permissions.user" }
                        }
                    }
                },
                {
                    "uid": "application::author.author",
                    "schema": {
                        "kind": "collectionType",
                        "attributes": { "bio": { "type": "richtext" } }
                    }
                },
                {
                    "uid": "plugins::users-permissions.user",
                    "schema": {
                        "kind": "collectionType",
                        "attributes": { "about": { "type": "richtext" } }
                    }
                }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/content-type-builder/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "uid": "blocks.text",
                    "schema": { "attributes": { "content": { "type": "richtext" } } }
                }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_metadata_discovers_paths() {
    let server = MockServer::start().await;
    mount_schema(&server).await;

    let reporter = RecordingReporter::default();
    let index = client_for(&server).fetch_metadata(&reporter).await.unwrap();

    let paths: Vec<&str> = index.rich_text_paths().collect();
    assert_eq!(
        paths,
        vec![
            "article.author.bio",
            "article.body",
            "article.sections.content",
            "author.bio",
        ]
    );
    assert_eq!(
        index.type_paths("application::article.article").unwrap(),
        &[
            "body".to_string(),
            "sections.content".to_string(),
            "author.bio".to_string()
        ]
    );
    assert_eq!(
        reporter.infos.lock().unwrap().as_slice(),
        &[format!(
            "Starting to fetch metadata from Strapi - {}/content-type-builder",
            server.uri()
        )]
    );
}

#[tokio::test]
async fn fetch_metadata_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .and(header("authorization", "Bearer tok"))
        .and(path("/content-type-builder/content-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer tok"))
        .and(path("/content-type-builder/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let index = client_with_token(&server, "tok")
        .fetch_metadata(&RecordingReporter::default())
        .await
        .unwrap();
    assert!(index.is_empty());
}

#[tokio::test]
async fn fetch_metadata_fails_when_components_fail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content-type-builder/content-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/content-type-builder/components"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let reporter = RecordingReporter::default();
    let result = client_for(&server).fetch_metadata(&reporter).await;

    assert_eq!(result.unwrap_err().status(), Some(403));
    let panics = reporter.panics.lock().unwrap();
    assert_eq!(panics.len(), 1);
    assert!(panics[0].starts_with("Failed to fetch metadata from Strapi"));
}

#[tokio::test]
async fn fetch_metadata_rejects_malformed_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content-type-builder/content-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/content-type-builder/components"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .fetch_metadata(&RecordingReporter::default())
        .await;
    assert!(matches!(result, Err(ClientError::Schema(_))));
}

// ── RemoteFileFetcher ───────────────────────────────────────────

#[tokio::test]
async fn remote_file_download() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/uploads/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;

    let fetcher = RemoteFileFetcher::new(Duration::from_secs(5)).unwrap();
    let bytes = fetcher
        .fetch(&format!("{}/uploads/cat.png", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(bytes, Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn remote_file_missing_yields_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = RemoteFileFetcher::from_config(&StrapiConfig::default()).unwrap();
    let bytes = fetcher
        .fetch(&format!("{}/uploads/gone.png", server.uri()), None)
        .await
        .unwrap();

    assert!(bytes.is_none());
}

#[tokio::test]
async fn remote_file_sends_basic_auth() {
    let server = MockServer::start().await;

    // "user:pass"
    Mock::given(method("GET"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = MediaAuth {
        htaccess_user: "user".into(),
        htaccess_pass: "pass".into(),
    };
    let fetcher = RemoteFileFetcher::new(Duration::from_secs(5)).unwrap();
    let bytes = fetcher
        .fetch(&format!("{}/private.pdf", server.uri()), Some(&auth))
        .await
        .unwrap();

    assert_eq!(bytes.as_deref(), Some(&b"ok"[..]));
}
