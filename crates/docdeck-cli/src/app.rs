//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use docdeck_core::error::codes;
use docdeck_core::{
    analyze_presentation, analyze_template, derive_output_path, preview, ConversionContext,
    ConversionPreview, ConversionResult, ConvertConfig, ConvertError, Converter,
    PresentationAnalysis, ProgressEvent, TemplateAnalysis,
};
use docdeck_model::{DeckStore, DocumentSource};
use docdeck_ooxml::DocxSource;
use docdeck_pptx::PptxPackage;

/// Extensions accepted for the source document
pub const SOURCE_EXTENSIONS: &[&str] = &["docx"];

/// Extensions accepted for the template presentation
pub const TEMPLATE_EXTENSIONS: &[&str] = &["pptx", "potx"];

#[derive(Parser)]
#[command(name = "docdeck")]
#[command(author, version, about = "Numbered Word documents to template-styled slide decks", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Word document into a deck styled by a template
    Convert {
        /// Source DOCX file
        source: PathBuf,

        /// Template PPTX/POTX file; its first slide is the design reference
        template: PathBuf,

        /// Output file (defaults to the template name plus the configured suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe a template: its first slide and the structure of the deck
    Analyze {
        /// Template PPTX/POTX file
        template: PathBuf,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the sections a conversion would turn into slides
    Preview {
        /// Source DOCX file
        source: PathBuf,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            source,
            template,
            output,
            config,
            json,
        } => {
            let result = convert_command(
                &source,
                &template,
                output.as_deref(),
                config.as_deref(),
                json,
            )?;
            if !result.success {
                std::process::exit(1);
            }
        }
        Commands::Analyze {
            template,
            config,
            json,
        } => {
            analyze_command(&template, config.as_deref(), json)?;
        }
        Commands::Preview {
            source,
            config,
            json,
        } => {
            preview_command(&source, config.as_deref(), json)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<ConvertConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            ConvertConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(ConvertConfig::default()),
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Check that both input files exist and have a supported extension
pub fn validate_inputs(source: &Path, template: &Path) -> docdeck_core::Result<()> {
    if !source.is_file() {
        return Err(ConvertError::input(
            codes::SOURCE_NOT_FOUND,
            format!("Source document not found: {}", source.display()),
        ));
    }
    if !template.is_file() {
        return Err(ConvertError::input(
            codes::TEMPLATE_NOT_FOUND,
            format!("Template presentation not found: {}", template.display()),
        ));
    }
    if !has_extension(source, SOURCE_EXTENSIONS) {
        return Err(ConvertError::input(
            codes::UNSUPPORTED_SOURCE_FORMAT,
            format!("Source must be a .docx document: {}", source.display()),
        ));
    }
    if !has_extension(template, TEMPLATE_EXTENSIONS) {
        return Err(ConvertError::input(
            codes::UNSUPPORTED_TEMPLATE_FORMAT,
            format!(
                "Template must be a .pptx or .potx presentation: {}",
                template.display()
            ),
        ));
    }
    Ok(())
}

/// Execute the convert command
///
/// Conversion failures are part of the returned record; only problems
/// outside the conversion itself (an unreadable config file, stdout) are
/// errors.
pub fn convert_command(
    source: &Path,
    template: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<ConversionResult> {
    let config = load_config(config_path)?;
    let output = match output {
        Some(p) => p.to_path_buf(),
        None => derive_output_path(template, &config.output_suffix),
    };

    if !json {
        println!("docdeck v{}", docdeck_core::VERSION);
        println!("Converting: {}", source.display());
        println!("  Template: {}", template.display());
    }

    let result = run_conversion(source, template, &output, config, !json);

    if json {
        let rendered = serde_json::to_string_pretty(&result)
            .context("Failed to serialize result to JSON")?;
        println!("{}", rendered);
    } else {
        print_result(&result);
    }
    Ok(result)
}

fn run_conversion(
    source: &Path,
    template: &Path,
    output: &Path,
    config: ConvertConfig,
    show_progress: bool,
) -> ConversionResult {
    if let Err(e) = validate_inputs(source, template) {
        return ConversionResult::failure(e.code(), e.to_string());
    }
    let store = match PptxPackage::open(template) {
        Ok(store) => store,
        Err(e) => {
            let e = ConvertError::template_load(e.to_string());
            return ConversionResult::failure(e.code(), e.to_string());
        }
    };

    let mut ctx = ConversionContext::new(config);
    if show_progress {
        ctx = ctx.with_progress(print_progress);
    }
    Converter::new().convert(&DocxSource::open(source), &store, output, &mut ctx)
}

fn print_progress(event: &ProgressEvent) {
    eprintln!("  [{:>3.0}%] {}", event.fraction() * 100.0, event.message);
}

fn print_result(result: &ConversionResult) {
    println!();
    if !result.success {
        println!(
            "Conversion failed [{}]: {}",
            result.error_code.as_deref().unwrap_or("UNKNOWN"),
            result.error.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    println!("Conversion complete!");
    if let Some(output) = &result.output_file {
        println!("  Output: {}", output.display());
    }
    println!(
        "  {} sections, {} slides in {:.2}s",
        result.total_sections, result.slides_created, result.processing_time
    );
    if let Some(analysis) = &result.template_analysis {
        println!("  Template: {} ({})", analysis.layout_name, analysis.summary);
    }
    if !result.skipped_sections.is_empty() {
        println!("  Skipped sections:");
        for skipped in &result.skipped_sections {
            println!("    {}. {}: {}", skipped.number, skipped.title, skipped.error);
        }
    }
    if !result.format_issues.is_empty() {
        println!("  Format issues:");
        for issue in &result.format_issues {
            println!("    - {}", issue);
        }
    }
}

/// Execute the analyze command
pub fn analyze_command(template: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !template.is_file() {
        anyhow::bail!(
            "{}: Template presentation not found: {}",
            codes::TEMPLATE_NOT_FOUND,
            template.display()
        );
    }
    if !has_extension(template, TEMPLATE_EXTENSIONS) {
        anyhow::bail!(
            "{}: Template must be a .pptx or .potx presentation: {}",
            codes::UNSUPPORTED_TEMPLATE_FORMAT,
            template.display()
        );
    }
    let config = load_config(config_path)?;

    let deck = PptxPackage::open(template)
        .and_then(|package| package.load())
        .with_context(|| format!("Failed to load template: {}", template.display()))?;
    let analysis = analyze_template(&deck, config.background_threshold);
    let structure = analyze_presentation(&deck);

    if json {
        let report = serde_json::json!({
            "template": analysis,
            "presentation": structure,
        });
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize analysis to JSON")?;
        println!("{}", rendered);
    } else {
        print_analysis(template, &analysis, &structure);
    }
    Ok(())
}

fn print_analysis(template: &Path, analysis: &TemplateAnalysis, structure: &PresentationAnalysis) {
    println!("docdeck v{}", docdeck_core::VERSION);
    println!("Analyzing: {}", template.display());
    println!();
    println!("=== Template slide ===");
    if let Some(error) = &analysis.error {
        println!("  Warning: {}", error);
    }
    println!("  Layout: {}", analysis.layout_name);
    if let Some(master) = &analysis.master_name {
        println!("  Master: {}", master);
    }
    println!("  Shapes: {}", analysis.total_shapes);
    println!("  Summary: {}", analysis.summary);
    for name in &analysis.background_shapes {
        println!("  Background image: {}", name);
    }

    println!();
    println!("=== Presentation ===");
    println!(
        "  {} slides, {}x{} EMU, {} words",
        structure.total_slides, structure.slide_width, structure.slide_height, structure.total_words
    );
    if !structure.layouts_used.is_empty() {
        println!("  Layouts: {}", structure.layouts_used.join(", "));
    }
    for slide in &structure.slides {
        println!(
            "  #{} [{}] text: {}, images: {}, tables: {}, other: {}{}",
            slide.number,
            slide.layout_name,
            slide.text_shapes,
            slide.image_shapes,
            slide.table_shapes,
            slide.other_shapes,
            slide
                .title
                .as_ref()
                .map(|t| format!(" - \"{}\"", t))
                .unwrap_or_default()
        );
    }
}

/// Execute the preview command
pub fn preview_command(
    source: &Path,
    config_path: Option<&Path>,
    json: bool,
) -> Result<ConversionPreview> {
    if !source.is_file() {
        anyhow::bail!(
            "{}: Source document not found: {}",
            codes::SOURCE_NOT_FOUND,
            source.display()
        );
    }
    if !has_extension(source, SOURCE_EXTENSIONS) {
        anyhow::bail!(
            "{}: Source must be a .docx document: {}",
            codes::UNSUPPORTED_SOURCE_FORMAT,
            source.display()
        );
    }
    let config = load_config(config_path)?;

    let paragraphs = DocxSource::open(source)
        .read_paragraphs()
        .with_context(|| format!("Failed to read source document: {}", source.display()))?;
    let result = preview(&paragraphs, &config);

    if json {
        let rendered =
            serde_json::to_string_pretty(&result).context("Failed to serialize preview to JSON")?;
        println!("{}", rendered);
    } else {
        println!("docdeck v{}", docdeck_core::VERSION);
        println!("Preview: {}", source.display());
        println!("  {} sections", result.total_sections);
        for section in &result.sections {
            println!(
                "  {:>3}. {} ({} chars{})",
                section.number,
                section.title,
                section.content_length,
                if section.has_formatting { ", formatted" } else { "" }
            );
        }
        if result.remaining > 0 {
            println!("  ... and {} more", result.remaining);
        }
    }
    Ok(result)
}
