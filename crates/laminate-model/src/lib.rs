//! laminate-model - Checklist data model
//!
//! This crate provides the types a checklist is made of, and their JSON
//! decoding. Field presence is checked by the generator, not here, so that
//! a half-filled form still decodes and produces a precise error later.
//!
//! # Example
//!
//! ```
//! use laminate_model::Checklist;
//!
//! let checklist = Checklist::from_json(
//!     r#"{"title": "CHECKLIST", "phases": [{"name": "Preflight", "items": [{"read": "Check fuel", "do": "OK"}]}]}"#,
//! )?;
//! assert_eq!(checklist.phases[0].items[0].annotation(), Some("OK"));
//! # Ok::<(), laminate_model::ModelError>(())
//! ```

mod checklist;
mod error;

pub use checklist::{Checklist, Item, Phase, DEFAULT_SUBTITLE, DEFAULT_TITLE};
pub use error::{ModelError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
