//! laminate CLI - Command-line interface library
//!
//! This library provides the CLI functionality for laminate, including:
//! - Render: Convert a checklist JSON file to PDF
//! - Tex: Emit the generated LaTeX source
//! - Probe: Check that the LaTeX compiler is installed
//!
//! # Library Usage
//!
//! ```ignore
//! use laminate_cli::{render_command, load_settings, Overrides};
//!
//! let settings = load_settings(None)?;
//! render_command(&input, None, &Overrides::default(), &settings)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a checklist to c172_before_takeoff.pdf
//! laminate render checklist.json --title "C172 Before Takeoff"
//!
//! # Inspect the LaTeX source
//! laminate tex checklist.json -o checklist.tex
//!
//! # Check the toolchain
//! laminate probe --program xelatex
//! ```

pub mod app;
pub mod filename;
pub mod settings;

// Re-export main entry point and types
pub use app::{load_checklist, load_settings, probe_command, render_command, run_cli, tex_command};
pub use app::Overrides;
pub use filename::download_filename;
pub use settings::Settings;
