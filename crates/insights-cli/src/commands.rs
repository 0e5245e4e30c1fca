use anyhow::Result;

use super::args::{Cli, Commands, FilterArgs};
use super::handlers;
use super::handlers::run::RunOptions;
use crate::context::ExecutionContext;
use crate::logging;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let ctx = ExecutionContext::new(cli.sessions_dir.as_deref(), cli.output_dir.as_deref())?;
    tracing::debug!(
        sessions_dir = %ctx.sessions_dir().display(),
        output_dir = %ctx.output_dir().display(),
        "directories resolved"
    );

    // No subcommand runs the full pipeline with default flags
    let command = cli.command.unwrap_or(Commands::Run {
        filter: FilterArgs::default(),
        limit: None,
        force: false,
        dry_run: false,
        verbose: false,
        no_open: false,
    });

    match command {
        Commands::Run {
            filter,
            limit,
            force,
            dry_run,
            verbose,
            no_open,
        } => handlers::run::handle(
            &ctx,
            RunOptions {
                filter,
                limit,
                force,
                dry_run,
                verbose,
                no_open,
            },
        ),

        Commands::Report {
            filter,
            verbose,
            no_open,
        } => handlers::report::handle(&ctx, filter, verbose, no_open),

        Commands::Projects => handlers::projects::handle(&ctx),
    }
}
