//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "syllabo")]
#[command(
    author,
    version,
    about = "Turn course syllabi into teaching materials"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir)
    #[arg(long, global = true, env = "SYLLABO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a syllabus document
    Analyze(AnalyzeArgs),

    /// Generate one material from an analysis
    Generate(GenerateArgs),

    /// Generate several materials concurrently
    Bundle(BundleArgs),

    /// Encode a markdown file without calling the model
    Encode(EncodeArgs),

    /// List material types
    Types,

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Document reference, relative to the uploads directory
    pub document: String,

    /// Override the uploads directory
    #[arg(long)]
    pub uploads_dir: Option<PathBuf>,

    /// Write the analysis JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Analysis JSON file (output of `analyze`)
    #[arg(long)]
    pub analysis: PathBuf,

    /// Material type: presentation, workGuide, exampleTests, interactiveReview
    #[arg(short = 't', long = "type")]
    pub material_type: String,

    /// Unit title, to scope a presentation to one class
    #[arg(long, requires = "class")]
    pub unit: Option<String>,

    /// Class topic within --unit
    #[arg(long, requires = "unit")]
    pub class: Option<String>,

    /// Output format: pptx or pdf (default depends on the type)
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (default: derived from the title, in the current dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct BundleArgs {
    /// Analysis JSON file (output of `analyze`)
    #[arg(long)]
    pub analysis: PathBuf,

    /// Material types to generate (default: all)
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,

    /// Directory the artifacts are written to
    #[arg(long)]
    pub out_dir: PathBuf,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Markdown input file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format: pptx or pdf
    #[arg(long)]
    pub format: String,

    /// Document title (default: the markdown's H1, else the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Presentation theme (overrides config)
    #[arg(long)]
    pub theme: Option<String>,

    /// Output file (default: derived from the title, in the current dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
