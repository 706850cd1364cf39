pub mod builder;
pub mod destination;
pub mod export;
pub mod feedback;
pub mod import;
pub mod remote;
pub mod repository;
pub mod serializer;
pub mod template;

pub use builder::{BuildError, PMX_EXTENSION, ParseOnlyBuilder, TemplateBuilder, parse_template};
pub use destination::{ResolvedDestination, SaveDestination, default_commit_message};
pub use export::{ExportError, TemplateExporter};
pub use feedback::{Feedback, Severity};
pub use import::{ImportError, ImportReport, TemplateImporter};
pub use remote::{
    ContentClient, CreateOutcome, EntryKind, IntegrityToken, RemoteContent, RemoteError,
    RemoteFileEntry, RemoteFileRef, SavedFile, WriteOptions,
};
pub use repository::{ParseRepositoryError, RepositoryRegistry, TemplateRepository};
pub use serializer::{PmxSerializer, SerializeError, TemplateSerializer};
pub use template::{
    EnvironmentVariable, Image, Link, PortMapping, Template, Volume, VolumesFrom,
};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
