//! The parsing recipe: a tool name plus the errorformat pattern used to
//! recognise its output. Shared between `tuick-config` (user overrides)
//! and `tuick-errorformat` (the built-in registry and the parser itself)
//! so neither crate needs to depend on the other.

use serde::{Deserialize, Serialize};

/// A parsing recipe: an errorformat-style pattern associated with a
/// checker tool name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub tool: String,
    pub pattern: String,
}

impl Recipe {
    pub fn new(tool: impl Into<String>, pattern: impl Into<String>) -> Self {
        Recipe {
            tool: tool.into(),
            pattern: pattern.into(),
        }
    }
}
