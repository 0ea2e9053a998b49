use anyhow::Result;
use clap::Parser;

mod args;
mod commands;

use args::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pairs { target } => {
            let world = commands::load_world(&target.file)?;
            println!("{}", commands::pairs(&world, &target.tag_type)?);
        }
        Commands::Index { target, entity } => {
            let world = commands::load_world(&target.file)?;
            println!("{}", commands::index(&world, entity, &target.tag_type)?);
        }
        Commands::Has {
            target,
            entity,
            key,
        } => {
            let world = commands::load_world(&target.file)?;
            println!("{}", commands::has(&world, entity, &target.tag_type, &key)?);
        }
        Commands::Get {
            target,
            entity,
            key,
        } => {
            let world = commands::load_world(&target.file)?;
            println!("{}", commands::get(&world, entity, &target.tag_type, &key)?);
        }
        Commands::Set {
            target,
            entity,
            key,
            value,
            keep_existing,
            output,
        } => {
            let mut world = commands::load_world(&target.file)?;
            let changed = commands::set(
                &mut world,
                entity,
                &target.tag_type,
                &key,
                &value,
                !keep_existing,
            )?;
            if changed || output.is_some() {
                commands::save_world(&world, output.as_deref().unwrap_or(&target.file))?;
            }
            println!("{changed}");
        }
    }
    Ok(())
}
