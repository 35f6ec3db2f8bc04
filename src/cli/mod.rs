//! Command line definition.
//!
//! The main entry point is the `Cli` struct; [`Cli::build_options`] turns it
//! into the options of one build.

use crate::build::BuildOptions;
use crate::logging::LogLevel;
use crate::styles::StylePackRef;
use clap::Parser;
use std::path::PathBuf;

/// Run pandoc with options defined in styles
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The source files to be converted
    pub files: Vec<String>,

    /// Convert all files in the folder together (defaults to the current dir)
    #[arg(short, long, num_args = 0..=1, default_missing_value = ".", value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Convert every file given as an individual document
    #[arg(short, long)]
    pub individual: bool,

    /// With --folder, only convert files with these extensions
    #[arg(long, num_args = 1.., default_values = ["md", "markdown"], value_name = "EXT")]
    pub extensions: Vec<String>,

    /// The formats that should be produced
    #[arg(short = 't', long = "to", num_args = 1.., value_name = "FMT")]
    pub to: Vec<String>,

    /// The format of the source files
    #[arg(long, value_name = "FMT")]
    pub from_format: Option<String>,

    /// The extension of the output file, for formats whose default does not fit
    #[arg(long, value_name = "EXT")]
    pub to_file_type: Option<String>,

    /// The target folder
    #[arg(short, long, value_name = "FOLDER")]
    pub destination: Option<String>,

    /// Output file name without extension (defaults to the first input's name)
    #[arg(short, long)]
    pub output_name: Option<String>,

    /// Styles to use, replacing the styles given in the document
    #[arg(short, long, num_args = 1.., value_name = "STYLE")]
    pub styles: Vec<String>,

    /// Styles to add to the styles given in the document
    #[arg(short, long, num_args = 1.., value_name = "STYLE")]
    pub add_styles: Vec<String>,

    /// Add a style-pack: `name` or `name=style1,style2` (repeatable)
    #[arg(long = "stylepack", value_name = "PACK")]
    pub stylepacks: Vec<String>,

    /// Style file to use instead of the one in the config directory
    #[arg(long)]
    pub style_file: Option<PathBuf>,

    /// Metadata file to use instead of the first input's header
    #[arg(short, long)]
    pub metadata: Option<String>,

    /// Print the output to stdout (first format only)
    #[arg(short, long)]
    pub print: bool,

    /// Folder the build runs in, for relative paths in styles
    #[arg(short, long, value_name = "FOLDER")]
    pub working_dir: Option<PathBuf>,

    /// Only log errors and silence the converter
    #[arg(short, long)]
    pub quiet: bool,

    /// Create the user configuration folder
    #[arg(long)]
    pub init: bool,

    /// The logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, ignore_case = true)]
    pub log: LogLevel,
}

impl Cli {
    /// Log level after `--quiet` and `--print`.
    pub fn log_level(&self) -> LogLevel {
        if self.quiet || self.print {
            LogLevel::Error
        } else {
            self.log
        }
    }

    pub fn stylepack_refs(&self) -> Vec<StylePackRef> {
        self.stylepacks
            .iter()
            .map(|arg| StylePackRef::from_cli(arg))
            .collect()
    }

    /// The documents to build: all files together, or one per file.
    pub fn documents(&self, files: Vec<String>) -> Vec<Vec<String>> {
        if self.individual {
            files.into_iter().map(|f| vec![f]).collect()
        } else if files.is_empty() {
            Vec::new()
        } else {
            vec![files]
        }
    }

    /// Options for building `files` as one document.
    pub fn build_options(&self, files: Vec<String>) -> BuildOptions {
        BuildOptions {
            files,
            formats: self.to.clone(),
            from_format: self.from_format.clone(),
            styles: self.styles.clone(),
            add_styles: self.add_styles.clone(),
            stylepacks: self.stylepack_refs(),
            style_file: self.style_file.clone(),
            metadata_file: self.metadata.clone(),
            destination: self.destination.clone(),
            output_name: self.output_name.clone(),
            to_file_type: self.to_file_type.clone(),
            quiet: self.quiet,
        }
    }
}
