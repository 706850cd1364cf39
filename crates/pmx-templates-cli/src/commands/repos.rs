use pmx_templates::TemplateRepository;

pub fn run(repositories: &[TemplateRepository]) {
    if repositories.is_empty() {
        println!("No template repositories enabled.");
        return;
    }

    for repo in repositories {
        println!("{}", describe(repo));
    }
}

fn describe(repo: &TemplateRepository) -> String {
    match (&repo.branch, &repo.directory) {
        (Some(branch), Some(dir)) => format!("{repo} ({branch}, {dir}/)"),
        (Some(branch), None) => format!("{repo} ({branch})"),
        (None, Some(dir)) => format!("{repo} ({dir}/)"),
        (None, None) => repo.to_string(),
    }
}
