use std::fmt::Write;

use chrono::{DateTime, Utc};

use super::views::ResultView;
use crate::web::escape_html;

/// Markdown source of the full report. Free text from users and profiles is
/// HTML-escaped so it cannot inject markup into either output.
pub fn render_markdown(view: &ResultView, generated_at: DateTime<Utc>) -> String {
    let mut doc = String::new();
    let profile_description = view
        .profile
        .as_ref()
        .map(|profile| profile.description.trim())
        .filter(|description| !description.is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "No description available.".to_string());

    let _ = writeln!(doc, "# MBTI Personality Report\n");

    let _ = writeln!(doc, "## Basic information\n");
    let _ = writeln!(doc, "- **User:** {}", escape_html(&view.username));
    let _ = writeln!(
        doc,
        "- **Test time:** {}",
        view.computed_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(
        doc,
        "- **Type:** {} ({})",
        view.type_code,
        escape_html(view.profile_name())
    );
    let _ = writeln!(doc, "- **Questions answered:** {}\n", view.answered);

    let _ = writeln!(doc, "## Overview\n");
    let _ = writeln!(doc, "{profile_description}\n");

    let _ = writeln!(doc, "## Dimensions\n");
    let _ = writeln!(doc, "| Dimension | Score | Confidence | Tendency |");
    let _ = writeln!(doc, "|---|---:|---:|---|");
    for detail in &view.dimensions {
        let _ = writeln!(
            doc,
            "| {} | {:+.2} | {:.2} | {} |",
            detail.dimension.code(),
            detail.score,
            detail.confidence,
            detail.label
        );
    }
    let _ = writeln!(doc);

    if let Some(profile) = &view.profile {
        let sections = profile.analysis_sections();
        if !sections.is_empty() {
            let _ = writeln!(doc, "## In-depth analysis\n");
            for (title, text) in sections {
                let _ = writeln!(doc, "### {title}\n");
                let _ = writeln!(doc, "{}\n", escape_html(text.trim()));
            }
        }
    }

    let _ = writeln!(doc, "## Dimension details\n");
    for detail in &view.dimensions {
        let _ = writeln!(doc, "### {} ({})\n", detail.name, detail.dimension.code());
        let _ = writeln!(doc, "{}\n", detail.description);
        let _ = writeln!(
            doc,
            "**Score:** {:+.2} · **Confidence:** {:.2} · **Leaning:** {}\n",
            detail.score, detail.confidence, detail.letter
        );
        let _ = writeln!(doc, "> {}\n", detail.tendency);
    }

    let insights = &view.insights;
    let _ = writeln!(doc, "## Overall analysis\n");
    let _ = writeln!(
        doc,
        "Your personality type is **{}**. Overall trait strength is {:.2} and mean confidence is {:.2}. \
         Your preferences are {} across the dimensions, and the reliability of this result is {}.\n",
        view.type_code,
        insights.strength,
        insights.mean_confidence,
        insights.strength_descriptor,
        insights.reliability
    );

    let _ = writeln!(doc, "## Development suggestions\n");
    if insights.suggestions.is_empty() && view.growth().is_none() {
        let _ = writeln!(doc, "No specific suggestions; your preferences are clear on every axis.\n");
    }
    if !insights.suggestions.is_empty() {
        let _ = writeln!(doc, "Based on your answers:\n");
        for (index, suggestion) in insights.suggestions.iter().enumerate() {
            let _ = writeln!(doc, "{}. {}", index + 1, suggestion);
        }
        let _ = writeln!(doc);
    }
    if let Some(growth) = view.growth() {
        let _ = writeln!(doc, "General growth advice:\n");
        let _ = writeln!(doc, "{}\n", escape_html(growth.trim()));
    }

    let _ = writeln!(doc, "---\n");
    let _ = writeln!(
        doc,
        "*Generated by the MBTI survey on {}*",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    doc
}
