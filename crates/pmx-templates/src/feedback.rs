use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message produced while importing, tagged with the repository it
/// concerns. Callers decide whether to print, log, or drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub severity: Severity,
    pub repository: String,
    pub message: String,
}

impl Feedback {
    pub fn info(repository: impl fmt::Display, msg: impl Into<String>) -> Self {
        Self::with(Severity::Info, repository, msg)
    }

    pub fn warning(repository: impl fmt::Display, msg: impl Into<String>) -> Self {
        Self::with(Severity::Warning, repository, msg)
    }

    pub fn error(repository: impl fmt::Display, msg: impl Into<String>) -> Self {
        Self::with(Severity::Error, repository, msg)
    }

    fn with(severity: Severity, repository: impl fmt::Display, msg: impl Into<String>) -> Self {
        Self {
            severity,
            repository: repository.to_string(),
            message: msg.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "[{}] {}", self.repository, self.message),
            Severity::Warning => write!(f, "warning: [{}] {}", self.repository, self.message),
            Severity::Error => write!(f, "error: [{}] {}", self.repository, self.message),
        }
    }
}
