//! laminate-tex - Checklist PDF generation via LaTeX
//!
//! This crate turns a checklist into a print-ready PDF using an external
//! LaTeX compiler (`xelatex` by default).
//!
//! # Architecture
//!
//! The pipeline consists of two stages:
//!
//! 1. **Generator** - Converts a `laminate_model::Checklist` to LaTeX markup.
//!    Pure, deterministic, and the single place user text is escaped.
//! 2. **Driver** - Writes the markup into a caller-owned scratch directory
//!    and runs the compiler twice, classifying every failure.
//!
//! # Example
//!
//! ```no_run
//! use laminate_model::{Checklist, Item, Phase};
//! use laminate_tex::{generate_checklist, Toolchain};
//!
//! let checklist = Checklist::new("CHECKLIST", "(demo)")
//!     .with_phase(Phase::new("Preflight").with_item(Item::with_action("Check fuel", "OK")));
//!
//! let markup = generate_checklist(&checklist)?;
//! let scratch = std::env::temp_dir().join("laminate-example");
//! std::fs::create_dir_all(&scratch)?;
//! let pdf_path = Toolchain::new().compile(&markup, &scratch)?;
//! # Ok::<(), laminate_tex::ChecklistError>(())
//! ```

mod driver;
mod error;
mod escape;
mod generator;
mod markup;

pub use driver::{
    Toolchain, ToolchainInfo, ARTIFACT_FILE, DEFAULT_PROGRAM, DEFAULT_TIMEOUT, SOURCE_FILE,
};
pub use error::{ChecklistError, CompileFailure, Diagnostics, Result};
pub use escape::{escape_text, RESERVED};
pub use generator::{generate, generate_checklist, Generator, GeneratorConfig};
pub use markup::{MarkupBuilder, MarkupDocument};

/// Convenience function to render a checklist to a PDF inside `work_dir`
///
/// # Arguments
/// * `checklist` - The checklist to render
/// * `toolchain` - The compiler to drive
/// * `work_dir` - An empty scratch directory owned by the caller
///
/// # Returns
/// The path of the PDF, inside `work_dir`
pub fn render_pdf(
    checklist: &laminate_model::Checklist,
    toolchain: &Toolchain,
    work_dir: &std::path::Path,
) -> Result<std::path::PathBuf> {
    let markup = generate_checklist(checklist)?;
    toolchain.compile(&markup, work_dir)
}

/// Render with a custom generator configuration
pub fn render_pdf_with_config(
    checklist: &laminate_model::Checklist,
    config: GeneratorConfig,
    toolchain: &Toolchain,
    work_dir: &std::path::Path,
) -> Result<std::path::PathBuf> {
    let markup = Generator::with_config(config).generate_checklist(checklist)?;
    toolchain.compile(&markup, work_dir)
}
