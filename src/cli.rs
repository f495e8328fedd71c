//! Command-line interface for codecontext.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, OutputFormat};
use crate::files::{collect_files, detect_project_name};
use crate::project::{Generation, Generator};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Default file written by `init`.
const DEFAULT_INIT_PATH: &str = ".codecontext.yaml";

/// Generate an AI context document for a codebase.
///
/// Scans TypeScript, JavaScript and Python sources, extracts functions,
/// classes, interfaces and imports, infers HTTP routes and database tables
/// from framework conventions, and writes the result as Markdown or JSON.
#[derive(Parser)]
#[command(name = "codecontext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the command asked for verbose logging.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Generate(args) => args.verbose,
            Commands::Init(_) => false,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory and write the context document
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),
    /// Write a default config file
    Init(InitArgs),
}

/// Arguments for the generate command.
#[derive(Parser)]
pub struct GenerateArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover in PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file (overrides output_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (overrides output_format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Leave interfaces and type aliases out of the output
    #[arg(long)]
    pub no_types: bool,

    /// Leave imports out of the output
    #[arg(long)]
    pub no_imports: bool,

    /// Print the document to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Log progress at info level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_INIT_PATH)]
    pub output: PathBuf,
}

/// Merge command-line flags over the file config.
pub fn resolve_config(args: &GenerateArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(&args.path, args.config.as_deref())?;

    if let Some(output) = &args.output {
        config.output_path = output.to_string_lossy().to_string();
    }
    if let Some(format) = args.format {
        config.output_format = format;
    }
    if args.no_types {
        config.include_types = false;
    }
    if args.no_imports {
        config.include_imports = false;
    }

    config.validate()?;
    Ok(config)
}

/// Run the generate command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<i32> {
    let root = args.path.as_path();
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }

    let config = resolve_config(args)?;
    let files = collect_files(root, &config)?;
    let name = detect_project_name(root, &config);
    tracing::info!(project = %name, files = files.len(), "scanning");

    let generation = scan_with_progress(root, &config, &name, &files)?;

    if args.stdout {
        let rendered = match config.output_format {
            OutputFormat::Json => report::render_json(&generation.model)?,
            OutputFormat::Markdown | OutputFormat::Both => {
                report::render_markdown(&generation.model)
            }
        };
        print!("{}", rendered);
        return Ok(EXIT_SUCCESS);
    }

    let mut written = Vec::new();
    for (format, path) in config.output_targets(root) {
        let content = match format {
            OutputFormat::Json => report::render_json(&generation.model)?,
            _ => report::render_markdown(&generation.model),
        };
        write_output(&path, &content)?;
        written.push(path);
    }

    report::write_pretty(&generation.model, &generation.failed, &written);
    Ok(EXIT_SUCCESS)
}

fn scan_with_progress(
    root: &Path,
    config: &Config,
    name: &str,
    files: &[PathBuf],
) -> anyhow::Result<Generation> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let generator = Generator::new(root, config.extract_options());
    let generation = generator.run_with(name, files, |path| {
        let shown = path.strip_prefix(root).unwrap_or(path);
        pb.set_message(shown.display().to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();

    Ok(generation)
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    let content = Config::default_yaml()?;
    write_output(&args.output, &content)?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: codecontext generate .");

    Ok(EXIT_SUCCESS)
}
