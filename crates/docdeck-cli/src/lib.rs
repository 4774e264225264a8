//! docdeck CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docdeck:
//! - Convert: numbered DOCX sections to slides styled by a PPTX template
//! - Analyze: describe a template's design slide and structure
//! - Preview: list the sections a conversion would produce
//!
//! # Library Usage
//!
//! ```ignore
//! use docdeck_cli::convert_command;
//!
//! let result = convert_command(&source, &template, None, None, true)?;
//! assert!(result.success);
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert, writing brand_converted.pptx next to the template
//! docdeck convert report.docx brand.pptx
//!
//! # Machine-readable result record
//! docdeck convert report.docx brand.potx -o deck.pptx --json
//!
//! # Inspect a template and preview a document
//! docdeck analyze brand.pptx
//! docdeck preview report.docx --config docdeck.toml
//! ```

pub mod app;

// Re-export main entry point and commands
pub use app::{
    analyze_command, convert_command, init_logging, load_config, preview_command,
    validate_inputs,
};
pub use app::{run_cli, SOURCE_EXTENSIONS, TEMPLATE_EXTENSIONS};
