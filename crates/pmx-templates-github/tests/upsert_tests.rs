use std::sync::Arc;

use base64::Engine;
use pmx_templates::test_support::RecordingBuilder;
use pmx_templates::{
    ExportError, IntegrityToken, PmxSerializer, RemoteError, RemoteFileRef, SaveDestination,
    Template, TemplateExporter, TemplateImporter, TemplateRepository, TemplateSerializer,
};
use pmx_templates_github::GitHubContents;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOMEFILE: &str = "/repos/bob/repo/contents/somefile.pmx";
const DEFAULT_MESSAGE: &str = "Saved a Panamax template somefile.pmx";

fn exporter_for(server: &MockServer) -> TemplateExporter {
    TemplateExporter::new(Arc::new(GitHubContents::new(
        Some("token".into()),
        Some(server.uri()),
    )))
}

fn template() -> Template {
    Template::new("wordpress")
}

fn encoded_template() -> String {
    let text = PmxSerializer.serialize(&template()).unwrap();
    base64::engine::general_purpose::STANDARD.encode(text)
}

fn somefile() -> SaveDestination {
    SaveDestination::new(TemplateRepository::new("bob", "repo")).file_name("somefile")
}

fn error_body(message: &str) -> String {
    json!({ "message": message }).to_string()
}

#[tokio::test]
async fn creates_a_new_file() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .and(body_partial_json(json!({
            "message": DEFAULT_MESSAGE,
            "content": encoded_template(),
        })))
        .respond_with(ResponseTemplate::new(201).set_body_raw(
            include_str!("fixtures/create_response.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let saved = exporter_for(&server)
        .save(&template(), &somefile())
        .await
        .unwrap();

    assert_eq!(
        saved.html_url,
        "https://github.com/bob/repo/blob/master/somefile.pmx"
    );
    assert_eq!(saved.token, Some(IntegrityToken::new("def456")));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("sha").is_none(), "create must not send a sha");
    assert!(body.get("branch").is_none());
}

#[tokio::test]
async fn existing_file_is_updated_with_the_fetched_sha() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .and(body_partial_json(json!({ "sha": "abc123" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/update_response.json"),
            "application/json",
        ))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .respond_with(ResponseTemplate::new(422).set_body_raw(
            error_body("Invalid request.\n\n\"sha\" wasn't supplied."),
            "application/json",
        ))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SOMEFILE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/content_existing.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let saved = exporter_for(&server)
        .save(&template(), &somefile())
        .await
        .unwrap();

    assert_eq!(saved.token, Some(IntegrityToken::new("fed789")));

    let requests = server.received_requests().await.unwrap();
    let update: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
    assert_eq!(update["message"], DEFAULT_MESSAGE);
    assert_eq!(update["content"], encoded_template());
}

#[tokio::test]
async fn update_rejected_after_a_conflict_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .and(body_partial_json(json!({ "sha": "abc123" })))
        .respond_with(ResponseTemplate::new(409).set_body_raw(
            error_body("somefile.pmx does not match abc123"),
            "application/json",
        ))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .respond_with(ResponseTemplate::new(422).set_body_raw(
            error_body("Invalid request.\n\n\"sha\" wasn't supplied."),
            "application/json",
        ))
        .with_priority(5)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SOMEFILE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/content_existing.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = exporter_for(&server)
        .save(&template(), &somefile())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Remote(RemoteError::Conflict(_))));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn reserved_url_characters_in_the_name_stay_in_the_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/bob/repo/contents/C%23%20app.pmx"))
        .respond_with(ResponseTemplate::new(201).set_body_raw(
            include_str!("fixtures/create_response.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/repos/bob/repo/contents/what%3F.pmx"))
        .respond_with(ResponseTemplate::new(201).set_body_raw(
            include_str!("fixtures/create_response.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let exporter = exporter_for(&server);
    let destination = SaveDestination::new(TemplateRepository::new("bob", "repo"));
    exporter
        .save(&Template::new("C# app"), &destination)
        .await
        .unwrap();
    exporter
        .save(&Template::new("what?"), &destination)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.url.query().is_none()));
}

#[tokio::test]
async fn stale_known_file_falls_back_to_a_fresh_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .and(body_partial_json(json!({ "sha": "stale", "branch": "gh-pages" })))
        .respond_with(ResponseTemplate::new(409).set_body_raw(
            error_body("somefile.pmx does not match stale"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SOMEFILE))
        .and(wiremock::matchers::query_param("ref", "gh-pages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/content_existing.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .and(body_partial_json(json!({ "sha": "abc123", "branch": "gh-pages" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/update_response.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let destination = somefile().branch("gh-pages").known_file(RemoteFileRef {
        path: "somefile.pmx".into(),
        token: Some(IntegrityToken::new("stale")),
    });

    exporter_for(&server)
        .save(&template(), &destination)
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_repository_is_a_single_descriptive_failure() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(error_body("Not Found"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = exporter_for(&server)
        .save(&template(), &somefile())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::SaveFailed(RemoteError::NotFound(_))));
    assert_eq!(
        err.to_string(),
        "Saving the template file failed: Not Found: Not Found."
    );
}

#[tokio::test]
async fn bad_credentials_are_a_single_descriptive_failure() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_raw(error_body("Bad credentials"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = exporter_for(&server)
        .save(&template(), &somefile())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::SaveFailed(RemoteError::Unauthorized(_))));
    assert!(err.to_string().contains("Bad credentials"));
}

#[tokio::test]
async fn server_errors_on_create_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(SOMEFILE))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = exporter_for(&server)
        .save(&template(), &somefile())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Remote(RemoteError::Api { status: 502, .. })
    ));
}

#[tokio::test]
async fn import_builds_only_pmx_files_from_the_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/bob/repo/contents/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/contents_listing.json"),
            "application/json",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/bob/repo/contents/templates/wordpress.pmx"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            include_str!("fixtures/content_file.json"),
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let redis = base64::engine::general_purpose::STANDARD.encode("name: redis\n");
    Mock::given(method("GET"))
        .and(path("/repos/bob/repo/contents/templates/redis.pmx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "redis.pmx",
            "path": "templates/redis.pmx",
            "sha": "333",
            "type": "file",
            "content": redis,
            "encoding": "base64",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/bob/repo/contents/templates/README.md"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let repo = TemplateRepository::new("bob", "repo").with_directory("templates");
    let builder = Arc::new(RecordingBuilder::new());
    let importer = TemplateImporter::new(
        Arc::new(GitHubContents::new(None, Some(server.uri()))),
        builder.clone(),
        Arc::new(vec![repo.clone()]),
    );

    let report = importer.import_from_all_known_repositories().await;

    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 0);
    let inputs = builder.inputs();
    assert_eq!(inputs.len(), 2);
    assert!(inputs.contains(&"name: redis\n".to_owned()));
    assert!(inputs.iter().any(|i| i.starts_with("name: wordpress\n")));
}
