use anyhow::Result;
use pmx_templates_store::TemplateStore;

use super::format;

pub fn run(store: &TemplateStore) -> Result<()> {
    let summaries = store.list()?;
    format::print_template_table(&summaries);
    Ok(())
}
