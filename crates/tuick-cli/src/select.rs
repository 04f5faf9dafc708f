//! The `--select` callback: resolve a configured editor-scheme template
//! against a location and launch it.

use std::process::Stdio;
use tracing::{info, warn};
use tuick_config::EditorsConfig;
use tuick_core::{LocationFields, Result, TuickError};

/// Substitute `{file}`, `{line}`, `{col}` in `template`, omitting the
/// placeholder text entirely (not a literal empty string) when the
/// corresponding field is absent, not a literal empty string, so a
/// missing column degrades the surrounding delimiter too.
pub fn render_template(template: &str, location: &LocationFields) -> String {
    let mut out = template.replace("{file}", &location.file);
    out = replace_optional(&out, "{line}", location.line);
    out = replace_optional(&out, "{col}", location.col);
    out = replace_optional(&out, "{end_line}", location.end_line);
    out = replace_optional(&out, "{end_col}", location.end_col);
    out.trim_end().to_string()
}

fn replace_optional(template: &str, placeholder: &str, value: Option<u32>) -> String {
    match value {
        Some(v) => template.replace(placeholder, &v.to_string()),
        None => {
            // Drop the placeholder and any immediately preceding
            // delimiter character so `{file}:{line}:{col}` degrades to
            // `{file}` rather than `{file}::`.
            let mut result = String::with_capacity(template.len());
            let mut rest = template;
            while let Some(idx) = rest.find(placeholder) {
                let mut head = &rest[..idx];
                if head.ends_with(':') || head.ends_with('+') {
                    head = &head[..head.len() - 1];
                }
                result.push_str(head);
                rest = &rest[idx + placeholder.len()..];
            }
            result.push_str(rest);
            result
        }
    }
}

/// Resolve `scheme_name` (or the configured default) to a template and
/// launch it for `location` as a detached shell command.
pub async fn launch(
    editors: &EditorsConfig,
    scheme_name: Option<&str>,
    location: &LocationFields,
) -> Result<()> {
    let scheme = scheme_name.unwrap_or(&editors.default);
    let template = editors
        .schemes
        .get(scheme)
        .ok_or_else(|| TuickError::Config(format!("unknown editor scheme: {scheme}")))?;

    let command = render_template(template, location);
    info!(scheme, %command, "launching editor");

    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(TuickError::Io)?;

    if !status.success() {
        warn!(%command, ?status, "editor launch command exited non-zero");
    }
    Ok(())
}
