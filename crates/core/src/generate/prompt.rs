use super::split::README_MARKER;

/// System message sent alongside every generation prompt.
pub const SYSTEM_MESSAGE: &str =
    "You are a helpful coding assistant that outputs runnable web apps.";

/// Inputs to [`build_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub brief: &'a str,
    pub round: u32,
    pub previous_readme: Option<&'a str>,
    pub attachments_summary: &'a str,
    pub checks: &'a [String],
}

/// Format evaluation checks as a markdown list.
pub fn format_checks(checks: &[String]) -> String {
    if checks.is_empty() {
        return "(none)".to_string();
    }

    checks
        .iter()
        .map(|check| format!("- {check}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt for a generation call.
///
/// The revision block is only emitted for round 2 when a previous README is
/// available.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let mut parts = vec![
        "You are a professional web developer assistant.".to_string(),
        format!("### Round\n{}", input.round),
        format!("### Task\n{}", input.brief),
    ];

    if let (2, Some(readme)) = (input.round, input.previous_readme) {
        parts.push(format!(
            "### Previous README.md:\n{readme}\n\nRevise and enhance this project according to the new brief above."
        ));
    }

    let attachments = if input.attachments_summary.is_empty() {
        "(none)"
    } else {
        input.attachments_summary
    };
    parts.push(format!("### Attachments (if any)\n{attachments}"));
    parts.push(format!("### Evaluation checks\n{}", format_checks(input.checks)));
    parts.push(format!(
        "### Output format rules:
1. Produce a complete web app (HTML/JS/CSS inline if needed) satisfying the brief.
2. Output must contain **two parts only**:
   - index.html (main code)
   - README.md (starts after a line containing exactly: {README_MARKER})
3. README.md must include:
   - Overview
   - Setup
   - Usage
   - If Round 2, describe improvements made from previous version.
4. Do not include any commentary outside code or README."
    ));

    parts.join("\n\n")
}
