use std::sync::Arc;

use tracing::debug;

use crate::destination::SaveDestination;
use crate::remote::{ContentClient, CreateOutcome, RemoteError, SavedFile};
use crate::serializer::{PmxSerializer, SerializeError, TemplateSerializer};
use crate::template::Template;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The destination rejected the write outright (missing repository,
    /// bad credentials).
    #[error("Saving the template file failed: {0}.")]
    SaveFailed(#[source] RemoteError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Writes templates to a repository as `.pmx` files.
///
/// Creation is attempted first. When the path is already taken the current
/// file's integrity token is fetched and the file is updated in place, so
/// saving the same template twice is safe.
pub struct TemplateExporter {
    client: Arc<dyn ContentClient>,
    serializer: Box<dyn TemplateSerializer>,
}

impl TemplateExporter {
    pub fn new(client: Arc<dyn ContentClient>) -> Self {
        Self::with_serializer(client, Box::new(PmxSerializer))
    }

    pub fn with_serializer(
        client: Arc<dyn ContentClient>,
        serializer: Box<dyn TemplateSerializer>,
    ) -> Self {
        Self { client, serializer }
    }

    pub async fn save(
        &self,
        template: &Template,
        destination: &SaveDestination,
    ) -> Result<SavedFile, ExportError> {
        let resolved = destination.resolve(template);
        let repo = &destination.repository;
        let content = self.serializer.serialize(template)?;

        let outcome = self
            .client
            .create_content(
                repo,
                &resolved.path,
                &resolved.message,
                &content,
                &resolved.create_options,
            )
            .await?;

        match outcome {
            CreateOutcome::Created(saved) => {
                debug!(repository = %repo, path = %resolved.path, "created template file");
                Ok(saved)
            }
            CreateOutcome::Conflict => {
                debug!(repository = %repo, path = %resolved.path, "template file exists, updating");
                let current = self
                    .client
                    .get_content(repo, &resolved.path, destination.branch.as_deref())
                    .await?;

                let saved = self
                    .client
                    .update_content(
                        repo,
                        &resolved.path,
                        &resolved.message,
                        &current.token,
                        &content,
                        &resolved.update_options,
                    )
                    .await?;
                Ok(saved)
            }
            CreateOutcome::Fatal(cause) => Err(ExportError::SaveFailed(cause)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{IntegrityToken, RemoteFileRef, WriteOptions};
    use crate::repository::TemplateRepository;
    use crate::test_support::{Call, RecordingClient};

    fn bob() -> TemplateRepository {
        TemplateRepository::new("bob", "repo")
    }

    fn template() -> Template {
        Template::new("wordpress")
    }

    fn serialized() -> String {
        PmxSerializer.serialize(&template()).unwrap()
    }

    fn somefile() -> SaveDestination {
        SaveDestination::new(bob()).file_name("somefile")
    }

    #[tokio::test]
    async fn new_file_is_created_with_a_single_call() {
        let client = Arc::new(RecordingClient::new());
        let exporter = TemplateExporter::new(client.clone());

        let saved = exporter.save(&template(), &somefile()).await.unwrap();

        assert_eq!(saved.html_url, "https://github.com/bob/repo/blob/master/somefile.pmx");
        assert_eq!(
            client.calls(),
            vec![Call::CreateContent {
                repo: "bob/repo".into(),
                path: "somefile.pmx".into(),
                message: "Saved a Panamax template somefile.pmx".into(),
                content: serialized(),
                opts: WriteOptions::default(),
            }]
        );
    }

    #[tokio::test]
    async fn created_result_is_returned_unchanged() {
        let client = Arc::new(RecordingClient::new());
        let expected = SavedFile {
            path: "somefile.pmx".into(),
            html_url: "https://example.test/somefile.pmx".into(),
            token: None,
        };
        client.override_create(Ok(CreateOutcome::Created(expected.clone())));

        let saved = TemplateExporter::new(client.clone())
            .save(&template(), &somefile())
            .await
            .unwrap();
        assert_eq!(saved, expected);
    }

    #[tokio::test]
    async fn existing_file_is_fetched_then_updated_with_its_token() {
        let client = Arc::new(RecordingClient::new());
        client.add_file(&bob(), "somefile.pmx", "name: old\n", "abc123");
        let exporter = TemplateExporter::new(client.clone());

        let saved = exporter.save(&template(), &somefile()).await.unwrap();

        let message = "Saved a Panamax template somefile.pmx".to_owned();
        assert_eq!(
            client.calls(),
            vec![
                Call::CreateContent {
                    repo: "bob/repo".into(),
                    path: "somefile.pmx".into(),
                    message: message.clone(),
                    content: serialized(),
                    opts: WriteOptions::default(),
                },
                Call::GetContent {
                    repo: "bob/repo".into(),
                    path: "somefile.pmx".into(),
                    branch: None,
                },
                Call::UpdateContent {
                    repo: "bob/repo".into(),
                    path: "somefile.pmx".into(),
                    message,
                    token: IntegrityToken::new("abc123"),
                    content: serialized(),
                    opts: WriteOptions::default(),
                },
            ]
        );
        assert_eq!(saved.html_url, "https://github.com/bob/repo/blob/master/somefile.pmx");
        assert_eq!(
            client.content_of(&bob(), "somefile.pmx"),
            Some(serialized())
        );
    }

    #[tokio::test]
    async fn saving_twice_updates_the_same_file() {
        let client = Arc::new(RecordingClient::new());
        let exporter = TemplateExporter::new(client.clone());

        let first = exporter.save(&template(), &somefile()).await.unwrap();
        let second = exporter.save(&template(), &somefile()).await.unwrap();

        assert_eq!(first.path, second.path);
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn known_file_goes_to_create_but_token_is_always_refetched() {
        let client = Arc::new(RecordingClient::new());
        client.add_file(&bob(), "somefile.pmx", "name: old\n", "current");
        let known = RemoteFileRef {
            path: "somefile.pmx".into(),
            token: Some(IntegrityToken::new("stale")),
        };
        let destination = somefile().branch("main").known_file(known.clone());

        TemplateExporter::new(client.clone())
            .save(&template(), &destination)
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(
            &calls[0],
            Call::CreateContent { opts, .. } if opts.file == Some(known.clone())
                && opts.branch.as_deref() == Some("main")
        ));
        assert_eq!(
            calls[1],
            Call::GetContent {
                repo: "bob/repo".into(),
                path: "somefile.pmx".into(),
                branch: Some("main".into()),
            }
        );
        assert!(matches!(
            &calls[2],
            Call::UpdateContent { token, opts, .. }
                if token.as_str() == "current" && opts.file.is_none()
        ));
    }

    #[tokio::test]
    async fn path_uses_prefix_and_template_name_by_default() {
        let client = Arc::new(RecordingClient::new());
        let destination = SaveDestination::new(bob()).path_prefix("templates/");

        let saved = TemplateExporter::new(client.clone())
            .save(&template(), &destination)
            .await
            .unwrap();
        assert_eq!(saved.path, "templates/wordpress.pmx");
    }

    #[tokio::test]
    async fn not_found_fails_without_fetch_or_update() {
        let client = Arc::new(RecordingClient::new());
        client.override_create(Ok(CreateOutcome::Fatal(RemoteError::NotFound(
            "no such repository".into(),
        ))));

        let err = TemplateExporter::new(client.clone())
            .save(&template(), &somefile())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::SaveFailed(_)));
        assert_eq!(
            err.to_string(),
            "Saving the template file failed: Not Found: no such repository."
        );
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn unauthorized_message_embeds_the_cause() {
        let client = Arc::new(RecordingClient::new());
        client.override_create(Ok(CreateOutcome::Fatal(RemoteError::Unauthorized(
            "Bad credentials".into(),
        ))));

        let err = TemplateExporter::new(client.clone())
            .save(&template(), &somefile())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Bad credentials"));
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn other_create_failures_pass_through() {
        let client = Arc::new(RecordingClient::new());
        client.override_create(Err(RemoteError::Api {
            status: 500,
            message: "boom".into(),
        }));

        let err = TemplateExporter::new(client.clone())
            .save(&template(), &somefile())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExportError::Remote(RemoteError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn fetch_failure_in_conflict_branch_passes_through() {
        let client = Arc::new(RecordingClient::new());
        client.add_file(&bob(), "somefile.pmx", "name: old\n", "abc123");
        client.fail_get(RemoteError::Network("connection reset".into()));

        let err = TemplateExporter::new(client.clone())
            .save(&template(), &somefile())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Remote(RemoteError::Network(_))));
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn update_failure_in_conflict_branch_passes_through_without_retry() {
        let client = Arc::new(RecordingClient::new());
        client.add_file(&bob(), "somefile.pmx", "name: old\n", "abc123");
        client.fail_update(RemoteError::Conflict(
            "somefile.pmx does not match abc123".into(),
        ));

        let err = TemplateExporter::new(client.clone())
            .save(&template(), &somefile())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Remote(RemoteError::Conflict(_))));
        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(
            &calls[2],
            Call::UpdateContent { token, .. } if token.as_str() == "abc123"
        ));
        assert_eq!(
            client.content_of(&bob(), "somefile.pmx").as_deref(),
            Some("name: old\n")
        );
    }
}
