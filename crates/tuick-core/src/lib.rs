//! # tuick-core
//!
//! Core types and error vocabulary shared by every other crate in the
//! Tuick workspace: the Block Record wire format, generation identifiers,
//! parsing recipes, and the unified error type.

pub mod block;
pub mod error;
pub mod recipe;

pub use block::{Block, GenerationId, LocationFields, FIELD_SEP, RECORD_END};
pub use error::{Result, TuickError};
pub use recipe::Recipe;
