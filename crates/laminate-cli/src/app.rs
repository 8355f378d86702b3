//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use laminate_model::Checklist;
use laminate_tex::{ChecklistError, Generator};

use crate::filename::download_filename;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "laminate")]
#[command(author, version, about = "Print-ready checklists from JSON", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a checklist JSON file to PDF
    Render {
        /// Input checklist JSON file
        input: PathBuf,

        /// Output PDF file (defaults to a name derived from the title)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// LaTeX compiler to run
        #[arg(long)]
        program: Option<String>,

        /// Per-pass timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Write the generated LaTeX source without compiling it
    Tex {
        /// Input checklist JSON file
        input: PathBuf,

        /// Output .tex file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Check that the LaTeX compiler is installed and runnable
    Probe {
        /// LaTeX compiler to check
        #[arg(long)]
        program: Option<String>,
    },
}

/// Title and subtitle replacing those in the input file
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Overrides {
    /// Checklist title
    #[arg(long)]
    pub title: Option<String>,

    /// Checklist subtitle
    #[arg(long)]
    pub subtitle: Option<String>,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            input,
            output,
            overrides,
            program,
            timeout,
        } => {
            if let Some(program) = program {
                settings.toolchain.program = program;
            }
            if let Some(timeout) = timeout {
                settings.toolchain.timeout_secs = timeout;
            }
            render_command(&input, output.as_deref(), &overrides, &settings)?;
        }
        Commands::Tex {
            input,
            output,
            overrides,
        } => {
            tex_command(&input, output.as_deref(), &overrides, &settings)?;
        }
        Commands::Probe { program } => {
            if let Some(program) = program {
                settings.toolchain.program = program;
            }
            probe_command(&settings)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // A second init (e.g. from tests calling run_cli twice) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read a checklist file and apply title overrides and blank-title defaults
pub fn load_checklist(input: &Path, overrides: &Overrides, settings: &Settings) -> Result<Checklist> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let mut checklist = Checklist::from_json(&json)
        .with_context(|| format!("Failed to decode checklist: {}", input.display()))?;

    if let Some(title) = &overrides.title {
        checklist.title = title.clone();
    }
    if let Some(subtitle) = &overrides.subtitle {
        checklist.subtitle = subtitle.clone();
    }
    if checklist.title.trim().is_empty() {
        checklist.title = settings.defaults.title.clone();
    }
    if checklist.subtitle.trim().is_empty() {
        checklist.subtitle = settings.defaults.subtitle.clone();
    }

    tracing::debug!(
        phases = checklist.phases.len(),
        items = checklist.item_count(),
        "loaded checklist"
    );
    Ok(checklist)
}

/// Execute the render command
pub fn render_command(
    input: &Path,
    output: Option<&Path>,
    overrides: &Overrides,
    settings: &Settings,
) -> Result<()> {
    println!("laminate v{}", laminate_model::VERSION);
    println!("Rendering: {}", input.display());

    let checklist = load_checklist(input, overrides, settings)?;
    if checklist.is_empty() {
        anyhow::bail!("No checklist items provided: {} has no phases", input.display());
    }

    // Determine output path (default: derived from the title, next to the input)
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input
            .parent()
            .unwrap_or(Path::new("."))
            .join(download_filename(&checklist.title)),
    };

    // Step 1: Generate markup (fails on malformed input before touching disk)
    println!("  Generating LaTeX...");
    let markup = Generator::with_config(settings.generator_config())
        .generate_checklist(&checklist)
        .map_err(describe)?;

    // Step 2: Make sure the compiler is there
    let toolchain = settings.toolchain();
    let info = toolchain.probe().map_err(describe)?;
    println!("  Toolchain: {} ({})", info.path.display(), info.version);

    // Step 3: Compile in a scratch directory that is removed on every exit path
    let scratch = TempDir::new().context("Failed to create scratch directory")?;
    println!(
        "  Compiling ({} passes, {}s limit each)...",
        laminate_tex::Toolchain::PASSES,
        toolchain.timeout().as_secs()
    );
    let artifact = toolchain
        .compile(&markup, scratch.path())
        .map_err(describe)?;

    // Step 4: Copy the artifact out before the scratch directory goes away
    println!("  Writing: {}", output_path.display());
    let size = fs::copy(&artifact, &output_path)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    println!();
    println!("Render complete!");
    println!("  Output: {}", output_path.display());
    println!("  Size: {} bytes", size);
    println!(
        "  {} phases, {} items",
        checklist.phases.len(),
        checklist.item_count()
    );

    Ok(())
}

/// Execute the tex command
pub fn tex_command(
    input: &Path,
    output: Option<&Path>,
    overrides: &Overrides,
    settings: &Settings,
) -> Result<()> {
    let checklist = load_checklist(input, overrides, settings)?;
    let markup = Generator::with_config(settings.generator_config())
        .generate_checklist(&checklist)
        .map_err(describe)?;

    match output {
        Some(path) => {
            fs::write(path, markup.as_bytes())
                .with_context(|| format!("Failed to write LaTeX file: {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", markup),
    }

    Ok(())
}

/// Execute the probe command
pub fn probe_command(settings: &Settings) -> Result<()> {
    let toolchain = settings.toolchain();
    let info = toolchain.probe().map_err(describe)?;

    println!("Toolchain: {}", info.path.display());
    println!("Version: {}", info.version);
    println!("Passes: {}", laminate_tex::Toolchain::PASSES);
    println!("Timeout: {}s per pass", toolchain.timeout().as_secs());

    Ok(())
}

/// Attach a user-facing explanation to a pipeline error
fn describe(err: ChecklistError) -> anyhow::Error {
    let hint = match &err {
        ChecklistError::MalformedChecklist { .. } => {
            "The checklist file is incomplete; every phase needs a name and every item needs `read` text."
                .to_string()
        }
        ChecklistError::ToolchainUnavailable { program, .. } => format!(
            "`{}` is not installed or not working properly. Install a TeX distribution \
             with XeLaTeX, or point --program / [toolchain] program at one.",
            program
        ),
        ChecklistError::CompilationFailed { diagnostics, .. } => {
            let lines = diagnostics.error_lines();
            if lines.is_empty() {
                format!("Compiler output:\n{}", diagnostics.sanitized())
            } else {
                format!("Compiler errors:\n{}", lines.join("\n"))
            }
        }
        ChecklistError::Io(_) => "Could not use the scratch directory.".to_string(),
    };
    anyhow::Error::new(err).context(hint)
}

/// Load settings from a config file or use defaults
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Settings::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => {
            // Try to find laminate.toml in the working directory
            let candidates = ["laminate.toml", ".laminate.toml"];
            for candidate in candidates {
                if Path::new(candidate).exists() {
                    let content = fs::read_to_string(candidate)?;
                    match Settings::from_toml_str(&content) {
                        Ok(settings) => return Ok(settings),
                        Err(e) => tracing::warn!("Ignoring {}: {}", candidate, e),
                    }
                }
            }
            Ok(Settings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_parse_render() {
        let args = vec![
            "laminate",
            "render",
            "list.json",
            "--output",
            "out.pdf",
            "--title",
            "C172",
            "--program",
            "lualatex",
            "--timeout",
            "30",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Render {
                input,
                output,
                overrides,
                program,
                timeout,
            } => {
                assert_eq!(input, PathBuf::from("list.json"));
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
                assert_eq!(overrides.title.as_deref(), Some("C172"));
                assert_eq!(overrides.subtitle, None);
                assert_eq!(program.as_deref(), Some("lualatex"));
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parse_render_defaults() {
        let cli = Cli::try_parse_from(["laminate", "render", "list.json"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Render {
                output,
                program,
                timeout,
                ..
            } => {
                assert!(output.is_none());
                assert!(program.is_none());
                assert!(timeout.is_none());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parse_tex() {
        let cli = Cli::try_parse_from(["laminate", "tex", "list.json", "-o", "list.tex"]).unwrap();
        match cli.command {
            Commands::Tex { input, output, .. } => {
                assert_eq!(input, PathBuf::from("list.json"));
                assert_eq!(output, Some(PathBuf::from("list.tex")));
            }
            _ => panic!("Expected Tex command"),
        }
    }

    #[test]
    fn test_cli_parse_probe_with_globals() {
        let cli = Cli::try_parse_from([
            "laminate",
            "probe",
            "--program",
            "xelatex",
            "-vv",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Probe { program } => assert_eq!(program.as_deref(), Some("xelatex")),
            _ => panic!("Expected Probe command"),
        }
    }

    #[test]
    fn test_load_settings_default() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.toolchain().timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_settings_missing_file() {
        assert!(load_settings(Some(Path::new("/nonexistent/laminate.toml"))).is_err());
    }

    #[test]
    fn test_load_checklist_applies_overrides_and_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("list.json");
        fs::write(&input, r#"{"title": "  ", "subtitle": "", "phases": []}"#).unwrap();

        let checklist = load_checklist(&input, &Overrides::default(), &Settings::default()).unwrap();
        assert_eq!(checklist.title, "CHECKLIST");
        assert_eq!(checklist.subtitle, "(Print and laminate for use)");

        let overrides = Overrides {
            title: Some("Engine Fire".to_string()),
            subtitle: None,
        };
        let checklist = load_checklist(&input, &overrides, &Settings::default()).unwrap();
        assert_eq!(checklist.title, "Engine Fire");
    }

    #[test]
    fn test_describe_malformed() {
        let err = describe(ChecklistError::MalformedChecklist {
            location: "phase 1".to_string(),
            field: "name",
        });
        let text = format!("{:#}", err);
        assert!(text.contains("every phase needs a name"));
        assert!(text.contains("phase 1 is missing required field `name`"));
    }

    #[test]
    fn test_describe_compilation_scrubs_compiler_text() {
        let err = describe(ChecklistError::CompilationFailed {
            failure: laminate_tex::CompileFailure::ExitStatus {
                pass: 1,
                code: Some(1),
            },
            diagnostics: laminate_tex::Diagnostics::new(
                "! Undefined control sequence.\u{1b}]0;owned\u{7}\n",
                "",
            ),
        });
        let text = format!("{:#}", err);
        assert!(text.contains("! Undefined control sequence.]0;owned"));
        assert!(!text.contains('\u{1b}'));
        assert!(!text.contains('\u{7}'));
    }
}
