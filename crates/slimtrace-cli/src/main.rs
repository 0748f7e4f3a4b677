//! `slimtrace` CLI entry point: parse arguments, build the per-invocation
//! `ExecutionContext`, dispatch to one handler, and map any error reaching
//! `main` to its exit code (spec §6 exit codes).

mod args;
mod config;
mod context;
mod error;
mod handlers;
mod output;
mod session_resolve;

use clap::Parser;

use args::{Cli, Commands};
use context::ExecutionContext;
use error::exit_code_for;

fn main() {
    let cli = Cli::parse();
    let ctx = match ExecutionContext::resolve(cli.data_dir.as_deref()) {
        Ok(ctx) => ctx,
        Err(err) => {
            output::error(&err.to_string());
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&ctx, cli.command) {
        output::error(&err.to_string());
        std::process::exit(exit_code_for(&err));
    }
}

fn run(ctx: &ExecutionContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { project } => handlers::list::handle(ctx, project.as_deref()),
        Commands::Current { diagnose } => handlers::current::handle(ctx, diagnose),
        Commands::Diagnose { session } => handlers::diagnose::handle(ctx, &session),
        Commands::Treat {
            session,
            prescription,
            execute,
            thinking_mode,
        } => handlers::treat::handle(ctx, &session, prescription.as_str(), execute, thinking_mode),
        Commands::Strategy {
            name,
            session,
            verbose,
            execute,
            thinking_mode,
        } => handlers::strategy::handle(ctx, &name, &session, verbose, execute, thinking_mode),
        Commands::Reload { prescription } => handlers::reload::handle(ctx, prescription.as_str()),
        Commands::Checkpoint { show } => handlers::checkpoint::handle(ctx, show),
        Commands::Guard {
            session,
            threshold,
            soft_threshold,
            threshold_tokens,
            interval,
            prescription,
            no_reload,
            no_reactive,
            daemon,
        } => handlers::guard::handle(
            ctx,
            session.as_deref(),
            threshold,
            soft_threshold,
            threshold_tokens,
            interval,
            prescription.as_str(),
            no_reload,
            no_reactive,
            daemon,
        ),
        Commands::Doctor { fix } => handlers::doctor::handle(ctx, fix),
        Commands::Formulary => handlers::formulary::handle(ctx),
    }
}
