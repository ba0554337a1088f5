//! ftown - inspect fonts through tracked FreeType objects

mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Info(args) => commands::info::run(args, cli.backend),
        Commands::Names(args) => commands::names::run(args, cli.backend),
        Commands::Render(args) => commands::render::run(args, cli.backend),
    }
}
