//! Command line surface.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::app::filter::{InclusionRule, TreeFilter};
use crate::app::load::{DocumentSource, load_document};
use crate::app::render::{OutputSink, RenderOptions, render_mapping, write_output};
use crate::domain::errors::TreeError;
use crate::infra::config::Config;
use crate::infra::logging::LogLevel;

#[derive(Debug, Parser)]
#[command(
    name = "treesift",
    author,
    version,
    about = "Pick UI component hashes out of a repository tree listing",
    long_about = None
)]
pub struct Cli {
    /// Tree listing to read, `-` for stdin [default: tree_client.json]
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the mapping to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include paths starting with PREFIX (replaces the configured rule)
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefixes: Vec<String>,

    /// Include this exact path (replaces the configured rule)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Include paths matching GLOB (replaces the configured rule)
    #[arg(long = "glob", value_name = "GLOB")]
    pub globs: Vec<String>,

    /// Indentation width of the rendered JSON
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Emit non-ASCII characters verbatim instead of `\uXXXX` escapes
    #[arg(long)]
    pub no_ascii_escape: bool,

    /// Additional configuration file applied after the workspace config
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Diagnostics written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    fn rule_overridden(&self) -> bool {
        !(self.prefixes.is_empty() && self.paths.is_empty() && self.globs.is_empty())
    }

    /// Fold command line flags into the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input.set_path(input.display().to_string());
        }
        if self.rule_overridden() {
            config.rule.replace(
                self.prefixes.clone(),
                self.paths.clone(),
                self.globs.clone(),
            );
        }
        if let Some(indent) = self.indent {
            config.output.set_indent(indent);
        }
        if self.no_ascii_escape {
            config.output.set_ensure_ascii(false);
        }
    }
}

/// Execute one invocation: load, filter, render, write.
pub fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "treesift", &mut io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let rule = InclusionRule::from_config(&config)?;
    tracing::debug!(
        prefixes = ?rule.prefixes(),
        paths = ?rule.paths(),
        globs = ?rule.globs(),
        "active inclusion rule"
    );
    let filter = TreeFilter::new(rule);
    let source = DocumentSource::from_arg(config.input.path());
    let document = load_document(&source)?;
    let mapping = filter.apply(&document);

    let rendered = render_mapping(&mapping, &RenderOptions::from_config(&config))?;
    let sink = cli.output.map(OutputSink::File).unwrap_or_default();
    write_output(&rendered, &sink)
}

/// Exit code for a failed run: input errors get their own codes, everything else is 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TreeError>())
        .map(TreeError::exit_code)
        .unwrap_or(1)
}
