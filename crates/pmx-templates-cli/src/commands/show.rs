use anyhow::{Context, Result};
use pmx_templates::{PmxSerializer, Template, TemplateSerializer};
use pmx_templates_store::TemplateStore;

pub fn run(store: &TemplateStore, name: &str, raw: bool) -> Result<()> {
    let template = store
        .find_by_name(name)
        .with_context(|| format!("could not load template {name}"))?;

    if raw {
        print!("{}", PmxSerializer.serialize(&template)?);
    } else {
        print!("{}", describe(&template));
    }
    Ok(())
}

fn describe(template: &Template) -> String {
    let mut out = format!("Name:        {}\n", template.name);

    if let Some(desc) = &template.description {
        out.push_str(&format!("Description: {desc}\n"));
    }
    if let Some(kind) = &template.template_type {
        out.push_str(&format!("Type:        {kind}\n"));
    }
    if let Some(keywords) = &template.keywords {
        out.push_str(&format!("Keywords:    {keywords}\n"));
    }
    if !template.authors.is_empty() {
        out.push_str(&format!("Authors:     {}\n", template.authors.join(", ")));
    }

    for image in &template.images {
        out.push_str(&format!("Image:       {} ({})\n", image.name, image.source));
    }

    if let Some(docs) = &template.documentation {
        out.push('\n');
        out.push_str(docs);
        if !docs.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
