use crate::template::Template;

#[derive(Debug, thiserror::Error)]
#[error("failed to serialize template {name}: {message}")]
pub struct SerializeError {
    pub name: String,
    pub message: String,
}

/// Turns a template into the text written to its `.pmx` file.
///
/// Output must be deterministic and load back through
/// [`parse_template`](crate::parse_template) to an equal template.
pub trait TemplateSerializer: Send + Sync {
    fn serialize(&self, template: &Template) -> Result<String, SerializeError>;
}

/// Canonical YAML form of a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct PmxSerializer;

impl TemplateSerializer for PmxSerializer {
    fn serialize(&self, template: &Template) -> Result<String, SerializeError> {
        serde_yaml_ng::to_string(template).map_err(|e| SerializeError {
            name: template.name.clone(),
            message: e.to_string(),
        })
    }
}
