use pmx_templates::Feedback;
use pmx_templates_store::TemplateSummary;

const MAX_NAME_WIDTH: usize = 35;
const LINE_BUDGET: usize = 90;

/// Print feedback items to stderr.
pub fn print_feedback(feedback: &[Feedback]) {
    for item in feedback {
        eprintln!("{item}");
    }
}

pub fn print_template_table(summaries: &[TemplateSummary]) {
    if summaries.is_empty() {
        println!("No templates stored. Run `pmx-templates import` first.");
        return;
    }

    let name_width = summaries
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    let desc_budget = LINE_BUDGET.saturating_sub(name_width + 2 + 10);

    for summary in summaries {
        let name = truncate(&summary.name, name_width);
        let desc = truncate(summary.description.as_deref().unwrap_or(""), desc_budget);
        let images = match summary.image_count {
            1 => "1 image".to_owned(),
            n => format!("{n} images"),
        };

        println!("{name:<name_width$}  {images:<8}  {desc}");
    }

    println!("\n{} templates", summaries.len());
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    if max == 0 {
        return String::new();
    }

    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate("wordpress", 20), "wordpress");
    }

    #[test]
    fn long_strings_end_with_ellipsis() {
        let out = truncate("a very long template description", 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn zero_width_is_empty() {
        assert_eq!(truncate("anything", 0), "");
    }
}
