//! Built-in tool registry and auto-detection, per the Errorformat
//! Adapter's responsibility of "per-tool pattern selection from a small
//! built-in registry".

use tuick_core::Recipe;

/// The built-in recipes, in detection-priority order.
pub fn built_in_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("ruff", "%f:%l:%c: %m"),
        Recipe::new("mypy", "%f:%l:%c: %t: %m"),
        Recipe::new("flake8", "%f:%l:%c: %m"),
        Recipe::new("pylint", "%f:%l:%c: %m"),
        Recipe::new("pytest", "%f:%l: %m"),
    ]
}

pub fn lookup(tool: &str) -> Option<Recipe> {
    built_in_recipes().into_iter().find(|r| r.tool == tool)
}

/// Auto-detect the tool name from the checker command's first non-option
/// argument, including `python -m <tool>` invocation forms.
///
/// Returns `None` if no built-in recipe matches, in which case the caller
/// should fail with `ToolNotDetected` unless an explicit recipe (`-f` or
/// `-e`) was given.
pub fn detect_tool(command: &[String]) -> Option<String> {
    let known: Vec<&str> = built_in_recipes().iter().map(|r| r.tool.as_str()).collect();

    let mut args = command.iter();
    let program = args.next()?;
    let program_name = basename(program);

    if program_name == "python" || program_name == "python3" {
        // python -m <tool> [...]; skip any other leading flags (-u, -O, ...)
        let mut iter = args;
        while let Some(arg) = iter.next() {
            if arg == "-m" {
                let module = iter.next()?;
                let module_name = module.split('.').next().unwrap_or(module.as_str());
                if known.contains(&module_name) {
                    return Some(module_name.to_string());
                }
                return None;
            }
            if !arg.starts_with('-') {
                // first non-option argument before -m: unusual form, bail out
                break;
            }
        }
        return None;
    }

    if known.contains(&program_name) {
        return Some(program_name.to_string());
    }
    None
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_direct_invocation() {
        assert_eq!(detect_tool(&cmd(&["ruff", "check", "."])), Some("ruff".into()));
        assert_eq!(detect_tool(&cmd(&["mypy", "src/"])), Some("mypy".into()));
    }

    #[test]
    fn detects_python_dash_m_form() {
        assert_eq!(
            detect_tool(&cmd(&["python", "-m", "pytest", "-x"])),
            Some("pytest".into())
        );
        assert_eq!(
            detect_tool(&cmd(&["python3", "-m", "mypy.__main__"])),
            Some("mypy".into())
        );
    }

    #[test]
    fn unknown_tool_detects_nothing() {
        assert_eq!(detect_tool(&cmd(&["some-custom-linter", "."])), None);
    }

    #[test]
    fn strips_path_prefix_before_matching() {
        assert_eq!(
            detect_tool(&cmd(&["/usr/bin/ruff", "check"])),
            Some("ruff".into())
        );
    }
}
