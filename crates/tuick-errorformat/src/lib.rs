//! # tuick-errorformat
//!
//! Streams raw checker stdout into Block Records. Implements a native
//! Vim-errorformat subset (rather than shelling out to an external
//! `errorformat` helper, for portability and fewer moving parts) with
//! a small built-in tool registry and auto-detection from the checker
//! command line.

pub mod ansi;
pub mod parser;
pub mod pattern;
pub mod registry;

pub use ansi::strip_ansi_codes;
pub use parser::{BlockAssembler, LineParser};
pub use pattern::{AnchorMatch, CompiledPattern};
pub use registry::{built_in_recipes, detect_tool, lookup};

use tuick_core::{Recipe, Result, TuickError};

/// Resolve the recipe to use for a checker invocation: an explicit
/// `-e <pattern>` wins, then an explicit `-f <name>`, then auto-detection
/// from the command line, then `ToolNotDetected`.
pub fn resolve_recipe(
    command: &[String],
    explicit_tool: Option<&str>,
    explicit_pattern: Option<&str>,
) -> Result<Recipe> {
    if let Some(pattern) = explicit_pattern {
        return Ok(Recipe::new("custom", pattern));
    }
    if let Some(tool) = explicit_tool {
        return lookup(tool)
            .ok_or_else(|| TuickError::ToolNotDetected(tool.to_string()));
    }
    let detected = detect_tool(command).ok_or_else(|| {
        TuickError::ToolNotDetected(command.first().cloned().unwrap_or_default())
    })?;
    lookup(&detected).ok_or(TuickError::ToolNotDetected(detected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_recipe_prefers_explicit_pattern() {
        let r = resolve_recipe(&["ruff".into()], None, Some("%f %l %m")).unwrap();
        assert_eq!(r.tool, "custom");
        assert_eq!(r.pattern, "%f %l %m");
    }

    #[test]
    fn resolve_recipe_falls_back_to_autodetect() {
        let r = resolve_recipe(&["mypy".into(), "src/".into()], None, None).unwrap();
        assert_eq!(r.tool, "mypy");
    }

    #[test]
    fn resolve_recipe_fails_on_unknown_tool() {
        let err = resolve_recipe(&["unknown-tool".into()], None, None).unwrap_err();
        assert!(matches!(err, TuickError::ToolNotDetected(_)));
    }
}
