mod schema;
mod store;

pub use store::{StoreError, TemplateStore, TemplateSummary};
