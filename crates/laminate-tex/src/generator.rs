//! Checklist to LaTeX generator
//!
//! Converts a checklist into a complete LaTeX document. Generation is pure:
//! no I/O, and the same input always yields byte-identical output.
//!
//! # Example
//!
//! ```
//! use laminate_model::{Item, Phase};
//! use laminate_tex::generate;
//!
//! let phases = vec![Phase::new("Preflight").with_item(Item::with_action("Check fuel", "OK"))];
//! let markup = generate("CHECKLIST", "(demo)", &phases)?;
//! assert!(markup.as_str().contains("\\section*{Preflight}"));
//! assert!(markup.as_str().contains("\\item \\textbf{Check fuel}\\dotfill{OK}"));
//! # Ok::<(), laminate_tex::ChecklistError>(())
//! ```

use laminate_model::{Checklist, Phase};

use crate::error::{ChecklistError, Result};
use crate::markup::{MarkupBuilder, MarkupDocument};

const PREAMBLE: &str = r"\documentclass[12pt]{article}
\usepackage[a4paper, margin=1in]{geometry}
\usepackage{enumitem}
\usepackage{titlesec}
\usepackage{parskip}
\usepackage{fontspec}

% Sans-serif body text
";

const STYLES: &str = r"
% Section headings
\titleformat{\section}
  {\normalfont\bfseries\large}{\thesection}{1em}{}

% Numbered items, restarting at 1 in every phase
\setlist[enumerate]{leftmargin=2em, label=\arabic*.}

\begin{document}

";

/// Generator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// System font used for the whole document. When unset, the default
    /// sans-serif family is used so no particular font must be installed.
    pub main_font: Option<String>,
}

impl GeneratorConfig {
    /// Use the given system font
    pub fn with_main_font(mut self, font: impl Into<String>) -> Self {
        self.main_font = Some(font.into());
        self
    }
}

/// A phase whose required fields have been checked
struct CheckedPhase<'a> {
    name: &'a str,
    items: Vec<CheckedItem<'a>>,
}

struct CheckedItem<'a> {
    read: &'a str,
    annotation: Option<&'a str>,
}

/// LaTeX generator for checklists
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate the document for a checklist
    pub fn generate_checklist(&self, checklist: &Checklist) -> Result<MarkupDocument> {
        self.generate(&checklist.title, &checklist.subtitle, &checklist.phases)
    }

    /// Generate the document from its parts
    ///
    /// Fails with [`ChecklistError::MalformedChecklist`] before producing any
    /// output if a phase has no name or an item has no `read` text.
    pub fn generate(&self, title: &str, subtitle: &str, phases: &[Phase]) -> Result<MarkupDocument> {
        let phases = check_phases(phases)?;

        let mut out = MarkupBuilder::new();
        self.write_preamble(&mut out);
        write_title_block(&mut out, title, subtitle);
        for phase in &phases {
            write_phase(&mut out, phase);
        }
        out.raw("\\end{document}\n");

        let doc = out.finish();
        tracing::debug!(
            phases = phases.len(),
            bytes = doc.len(),
            "generated checklist markup"
        );
        Ok(doc)
    }

    fn write_preamble(&self, out: &mut MarkupBuilder) {
        out.raw(PREAMBLE);
        match self.config.main_font.as_deref() {
            Some(font) if !font.trim().is_empty() => {
                out.command("setmainfont", font.trim()).newline();
            }
            _ => {
                out.raw("\\renewcommand{\\familydefault}{\\sfdefault}\n");
            }
        }
        out.raw(STYLES);
    }
}

/// Generate a document with the default configuration
pub fn generate(title: &str, subtitle: &str, phases: &[Phase]) -> Result<MarkupDocument> {
    Generator::new().generate(title, subtitle, phases)
}

/// Generate a checklist's document with the default configuration
pub fn generate_checklist(checklist: &Checklist) -> Result<MarkupDocument> {
    Generator::new().generate_checklist(checklist)
}

fn check_phases<'a>(phases: &'a [Phase]) -> Result<Vec<CheckedPhase<'a>>> {
    phases
        .iter()
        .enumerate()
        .map(|(p, phase)| -> Result<CheckedPhase<'a>> {
            let name = phase
                .name
                .as_deref()
                .ok_or_else(|| ChecklistError::MalformedChecklist {
                    location: format!("phase {}", p + 1),
                    field: "name",
                })?;

            let items = phase
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| -> Result<CheckedItem<'a>> {
                    let read =
                        item.read
                            .as_deref()
                            .ok_or_else(|| ChecklistError::MalformedChecklist {
                                location: format!("phase {}, item {}", p + 1, i + 1),
                                field: "read",
                            })?;
                    Ok(CheckedItem {
                        read,
                        annotation: item.annotation(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(CheckedPhase { name, items })
        })
        .collect()
}

fn write_title_block(out: &mut MarkupBuilder, title: &str, subtitle: &str) {
    out.raw("\\begin{center}\n    {\\LARGE ")
        .command("textbf", title)
        .raw("}\\\\[1ex]\n    ")
        .command("textit", subtitle)
        .raw("\n\\end{center}\n\n\\vspace{1em}\n");
}

fn write_phase(out: &mut MarkupBuilder, phase: &CheckedPhase<'_>) {
    out.command("section*", phase.name).newline();

    // An empty enumerate is a LaTeX error, so a bare heading is all we emit
    if !phase.items.is_empty() {
        out.raw("\\begin{enumerate}\n");
        for item in &phase.items {
            out.raw("\\item ").command("textbf", item.read);
            if let Some(annotation) = item.annotation {
                out.command("dotfill", annotation);
            }
            out.newline();
        }
        out.raw("\\end{enumerate}\n");
    }
    out.newline();
}

#[cfg(test)]
mod tests {
    use super::*;
    use laminate_model::Item;

    fn demo_phases() -> Vec<Phase> {
        vec![Phase::new("Preflight")
            .with_item(Item::with_action("Check fuel", "OK"))
            .with_item(Item::new("Check lights"))]
    }

    #[test]
    fn test_generate_demo_exact() {
        let doc = generate("CHECKLIST", "(demo)", &demo_phases()).unwrap();
        let expected = r"\documentclass[12pt]{article}
\usepackage[a4paper, margin=1in]{geometry}
\usepackage{enumitem}
\usepackage{titlesec}
\usepackage{parskip}
\usepackage{fontspec}

% Sans-serif body text
\renewcommand{\familydefault}{\sfdefault}

% Section headings
\titleformat{\section}
  {\normalfont\bfseries\large}{\thesection}{1em}{}

% Numbered items, restarting at 1 in every phase
\setlist[enumerate]{leftmargin=2em, label=\arabic*.}

\begin{document}

\begin{center}
    {\LARGE \textbf{CHECKLIST}}\\[1ex]
    \textit{(demo)}
\end{center}

\vspace{1em}
\section*{Preflight}
\begin{enumerate}
\item \textbf{Check fuel}\dotfill{OK}
\item \textbf{Check lights}
\end{enumerate}

\end{document}
";
        assert_eq!(doc.as_str(), expected);
    }

    #[test]
    fn test_main_font_configured() {
        let generator = Generator::with_config(GeneratorConfig::default().with_main_font("PT Sans"));
        let doc = generator.generate("T", "S", &[]).unwrap();
        assert!(doc.as_str().contains("\\setmainfont{PT Sans}\n"));
        assert!(!doc.as_str().contains("\\familydefault"));
    }

    #[test]
    fn test_main_font_is_escaped() {
        let generator =
            Generator::with_config(GeneratorConfig::default().with_main_font("Evil}\\input{x"));
        let doc = generator.generate("T", "S", &[]).unwrap();
        assert!(doc
            .as_str()
            .contains("\\setmainfont{Evil\\}\\textbackslash{}input\\{x}"));
    }

    #[test]
    fn test_blank_main_font_falls_back() {
        let generator = Generator::with_config(GeneratorConfig::default().with_main_font("  "));
        let doc = generator.generate("T", "S", &[]).unwrap();
        assert!(doc.as_str().contains("\\renewcommand{\\familydefault}{\\sfdefault}"));
    }

    #[test]
    fn test_missing_phase_name() {
        let phases = vec![Phase::new("A"), Phase::default()];
        let err = generate("T", "S", &phases).unwrap_err();
        match err {
            ChecklistError::MalformedChecklist { location, field } => {
                assert_eq!(location, "phase 2");
                assert_eq!(field, "name");
            }
            other => panic!("Expected MalformedChecklist, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_item_read() {
        let phases = vec![Phase::new("A")
            .with_item(Item::new("ok"))
            .with_item(Item {
                read: None,
                action: Some("OK".to_string()),
            })];
        let err = generate("T", "S", &phases).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Malformed checklist: phase 1, item 2 is missing required field `read`"
        );
    }

    #[test]
    fn test_generate_checklist_uses_title_and_subtitle() {
        let checklist = Checklist::new("My & Title", "Sub_title");
        let doc = generate_checklist(&checklist).unwrap();
        assert!(doc.as_str().contains("\\textbf{My \\& Title}"));
        assert!(doc.as_str().contains("\\textit{Sub\\_title}"));
    }
}
