//! CLI tool for browsing containers with arcfs.

mod commands;
mod exit_codes;
mod output;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use commands::OpenConfig;
use exit_codes::ExitCode;

/// Read-only access to directories, tarballs, zip archives and HTTP trees
#[derive(Parser)]
#[command(name = "arcfs")]
#[command(author, version, about = "Read-only container browser", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress informational output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// How to open the container.
#[derive(Args)]
struct OpenArgs {
    /// Container path or http(s) URL
    archive: String,

    /// File expected at the logical root (repeat for fallbacks, most preferred first)
    #[arg(long = "hint", short = 'H')]
    hint: Vec<String>,

    /// Container type, e.g. application/x-tar (detected when omitted)
    #[arg(long = "type", short = 'T')]
    mime: Option<String>,

    /// Character separating an inline hint from the path
    #[arg(long, env = "ARCFS_INLINE_HINT")]
    inline_hint: Option<char>,

    /// Maximum bytes to read from a single member
    #[arg(long)]
    limit: Option<u64>,
}

impl OpenArgs {
    fn config(&self) -> OpenConfig<'_> {
        OpenConfig {
            archive: &self.archive,
            hint: &self.hint,
            mime: self.mime.as_deref(),
            inline_hint: self.inline_hint,
            limit: self.limit,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List members (alias: l)
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        open: OpenArgs,
    },

    /// Write a member to stdout
    Cat {
        #[command(flatten)]
        open: OpenArgs,

        /// Member path relative to the logical root
        member: String,
    },

    /// Copy a member to a file (alias: x)
    #[command(alias = "x")]
    Get {
        #[command(flatten)]
        open: OpenArgs,

        /// Member path relative to the logical root
        member: String,

        /// Output file (defaults to the member's file name)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Find the first member with the given file name
    Find {
        #[command(flatten)]
        open: OpenArgs,

        /// File name to look for
        filename: String,
    },

    /// Show container information (alias: i)
    #[command(alias = "i")]
    Info {
        #[command(flatten)]
        open: OpenArgs,
    },

    /// Print the detected type of a path
    Type {
        /// Path to inspect
        path: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let exit_code = match &cli.command {
        Commands::List { open } => commands::list(&open.config(), cli.format),

        Commands::Cat { open, member } => commands::cat(&open.config(), member),

        Commands::Get {
            open,
            member,
            output,
        } => commands::get(&open.config(), member, output.as_deref(), cli.quiet),

        Commands::Find { open, filename } => {
            commands::find(&open.config(), filename, cli.format)
        }

        Commands::Info { open } => commands::info(&open.config(), cli.format),

        Commands::Type { path } => commands::detect_type(path, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
