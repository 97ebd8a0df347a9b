use super::split::README_MARKER;

/// Fixed-template README used when the model does not provide one.
pub fn fallback_readme(brief: &str, checks: &[String], attachments_meta: &str, round: u32) -> String {
    let checks_text = checks.join("\n");

    format!(
        "# Auto-generated README (Round {round})

**Project brief:** {brief}

**Attachments:**
{attachments_meta}

**Checks to meet:**
{checks_text}

## Setup
1. Open `index.html` in a browser.
2. No build steps required.

## Notes
This README was generated as a fallback (the completion service did not return an explicit README).
"
    )
}

/// Minimal static page that echoes the brief.
pub fn fallback_html(brief: &str) -> String {
    format!(
        "<html>
  <head><title>Fallback App</title></head>
  <body>
    <h1>Hello (fallback)</h1>
    <p>This app was generated as a fallback because the completion service failed. Brief: {brief}</p>
  </body>
</html>"
    )
}

/// Complete substitute for a completion response, in the same shape the model
/// is asked to produce.
pub fn fallback_completion(brief: &str, checks: &[String], attachments_meta: &str, round: u32) -> String {
    format!(
        "{}\n\n{README_MARKER}\n{}",
        fallback_html(brief),
        fallback_readme(brief, checks, attachments_meta, round)
    )
}
