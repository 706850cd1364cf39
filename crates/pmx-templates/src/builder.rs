use crate::template::Template;

/// File extension of Panamax template files.
pub const PMX_EXTENSION: &str = ".pmx";

/// Errors that can occur while turning raw `.pmx` text into a template.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid template: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Builds (and usually persists) a template from raw file content.
#[async_trait::async_trait]
pub trait TemplateBuilder: Send + Sync {
    async fn build(&self, raw_content: &str) -> Result<Template, BuildError>;
}

/// Parses `.pmx` text into a validated [`Template`].
///
/// Files are YAML. JSON is a subset of YAML, so templates serialized as
/// JSON load through the same path.
pub fn parse_template(raw_content: &str) -> Result<Template, BuildError> {
    let template: Template =
        serde_yaml_ng::from_str(raw_content).map_err(|e| BuildError::Parse(e.to_string()))?;

    validate(&template)?;
    Ok(template)
}

fn validate(template: &Template) -> Result<(), BuildError> {
    if template.name.trim().is_empty() {
        return Err(BuildError::Invalid("name can't be blank".into()));
    }

    for image in &template.images {
        if image.name.trim().is_empty() {
            return Err(BuildError::Invalid(format!(
                "image in {} is missing a name",
                template.name
            )));
        }
        if image.source.trim().is_empty() {
            return Err(BuildError::Invalid(format!(
                "image {} is missing a source",
                image.name
            )));
        }
    }

    Ok(())
}

/// Builder that validates without persisting anything.
pub struct ParseOnlyBuilder;

#[async_trait::async_trait]
impl TemplateBuilder for ParseOnlyBuilder {
    async fn build(&self, raw_content: &str) -> Result<Template, BuildError> {
        parse_template(raw_content)
    }
}
