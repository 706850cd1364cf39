use anyhow::{Result, bail};
use pmx_templates_store::TemplateStore;

pub fn run(store: &TemplateStore, name: &str) -> Result<()> {
    if !store.delete(name)? {
        bail!("Template not found: {name}");
    }

    println!("Removed {name}");
    Ok(())
}
