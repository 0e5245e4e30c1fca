use clap::{Args, Parser, Subcommand};

use crate::types::LogLevel;

#[derive(Parser)]
#[command(name = "insights")]
#[command(
    about = "Analyze Claude Code sessions, extract per-session facets and generate a coaching report",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Claude Code projects directory [default: $INSIGHTS_SESSIONS_DIR or ~/.claude/projects]
    #[arg(long, global = true)]
    pub sessions_dir: Option<String>,

    /// Facet cache and report directory [default: $INSIGHTS_OUTPUT_DIR or ~/.claude/custom-insights]
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover, extract facets for new or changed sessions, then write the report
    Run {
        #[command(flatten)]
        filter: FilterArgs,

        /// Max sessions to process (newest first)
        #[arg(long)]
        limit: Option<usize>,

        /// Regenerate every facet, ignoring the cache
        #[arg(long)]
        force: bool,

        /// Print the batch plan without calling the model
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        verbose: bool,

        /// Do not open the report when done
        #[arg(long)]
        no_open: bool,
    },

    /// Regenerate the report from cached facets only
    Report {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        verbose: bool,

        #[arg(long)]
        no_open: bool,
    },

    /// List projects with cached facets and their session counts
    Projects,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Substring filter for project name
    #[arg(long)]
    pub project: Option<String>,

    /// Only sessions newer than N days
    #[arg(long, value_name = "DAYS")]
    pub since: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "insights",
            "--output-dir",
            "/tmp/out",
            "run",
            "--project",
            "papers",
            "--since",
            "7",
            "--limit",
            "20",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.output_dir.as_deref(), Some("/tmp/out"));
        match cli.command {
            Some(Commands::Run {
                filter,
                limit,
                force,
                dry_run,
                ..
            }) => {
                assert_eq!(filter.project.as_deref(), Some("papers"));
                assert_eq!(filter.since, Some(7));
                assert_eq!(limit, Some(20));
                assert!(!force);
                assert!(dry_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_no_command_and_global_flags() {
        let cli = Cli::try_parse_from(["insights", "--log-level", "debug"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, LogLevel::Debug);

        let cli = Cli::try_parse_from(["insights", "projects", "--sessions-dir", "/c"]).unwrap();
        assert_eq!(cli.sessions_dir.as_deref(), Some("/c"));
        assert!(matches!(cli.command, Some(Commands::Projects)));
    }

    #[test]
    fn test_since_must_be_a_number() {
        assert!(Cli::try_parse_from(["insights", "report", "--since", "week"]).is_err());
    }
}
