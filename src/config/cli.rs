use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the quire binary.
#[derive(Debug, Parser)]
#[command(name = "quire", version, about = "Render stored pages through their layouts")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "QUIRE_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render one page and print the document to stdout.
    Render(RenderArgs),
    /// Run migrations and provision the bundled reference data.
    Seed(SeedArgs),
    /// Check every stored layout for balance and the title placeholder.
    #[command(name = "lint-layouts")]
    LintLayouts,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Id of the page to render.
    #[arg(value_name = "PAGE_ID")]
    pub page_id: String,

    /// Print the document and its last-modified time as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: RenderOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Prefix markdown bodies with the title and creation date.
    #[arg(
        long = "markdown-byline",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub markdown_byline: Option<bool>,

    /// Clean html and markdown output with the HTML sanitiser.
    #[arg(
        long = "sanitize-html",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub sanitize_html: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SeedArgs {
    /// Overwrite stored layouts with the bundled versions.
    #[arg(long = "refresh-layouts", action = clap::ArgAction::SetTrue)]
    pub refresh_layouts: bool,
}
