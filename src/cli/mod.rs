//! Command-line surface. Parsing lives here, handlers in [`commands`].

pub mod commands;
pub mod progress;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ap_core::project::KeywordFormat;

#[derive(Parser)]
#[command(name = "autopress")]
#[command(about = "Generate and publish one article per keyword", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: <config dir>/autopress/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saved projects
    List,
    /// Show one project, secrets masked
    Show {
        /// Project id or name
        project: String,
    },
    /// Create a project from a JSON draft file
    Add {
        /// Draft file path
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a project
    Delete {
        /// Project id or name
        project: String,
    },
    /// Add keywords to a project from a text or CSV file
    ImportKeywords {
        /// Project id or name
        project: String,
        /// Keyword file path
        #[arg(short, long)]
        file: PathBuf,
        /// File layout (default: by extension)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Replace the keyword list instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Run the keyword batch of a project (Ctrl+C stops after the current keyword)
    Run {
        /// Project id or name
        project: String,
    },
    /// Check both service connections of a project and list its categories
    Test {
        /// Project id or name
        project: String,
    },
    /// Copy the project document to a timestamped backup
    Backup,
    /// Re-encrypt every project under a fresh key
    RotateKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Lines,
    Csv,
}

impl From<FormatArg> for KeywordFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Lines => KeywordFormat::Lines,
            FormatArg::Csv => KeywordFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import_keywords_with_flags() {
        let cli = Cli::try_parse_from([
            "autopress",
            "--config",
            "/tmp/c.toml",
            "import-keywords",
            "My Site",
            "--file",
            "kw.txt",
            "--format",
            "csv",
            "--replace",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.command {
            Commands::ImportKeywords {
                project,
                file,
                format,
                replace,
            } => {
                assert_eq!(project, "My Site");
                assert_eq!(file, PathBuf::from("kw.txt"));
                assert_eq!(format, Some(FormatArg::Csv));
                assert!(replace);
            }
            _ => panic!("expected import-keywords"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["autopress", "run", "p1", "-c", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Run { project } if project == "p1"));
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from([
            "autopress",
            "import-keywords",
            "p",
            "--file",
            "k",
            "--format",
            "xml"
        ])
        .is_err());
    }
}
