use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use utags::entity::EntityId;

#[derive(Parser, Debug)]
#[command(name = "utags")]
#[command(about = "Inspect and edit key-value metadata stored in entity tags", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Tag world snapshot file plus the tag type to operate on.
#[derive(Args, Debug)]
pub struct Target {
    /// JSON tag world snapshot
    pub file: PathBuf,

    /// Tag type prefix, including its separator (e.g. "SemLog:")
    #[arg(short = 't', long = "type")]
    pub tag_type: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the key-value pairs of every entity that has any
    Pairs {
        #[command(flatten)]
        target: Target,
    },

    /// Print the index of the entity's first tag of the type
    Index {
        #[command(flatten)]
        target: Target,

        /// Entity id, as "<index>v<generation>" or "<index>"
        #[arg(short, long)]
        entity: EntityId,
    },

    /// Print whether the entity's tag of the type contains a key
    Has {
        #[command(flatten)]
        target: Target,

        /// Entity id, as "<index>v<generation>" or "<index>"
        #[arg(short, long)]
        entity: EntityId,

        /// Key to look for
        #[arg(short, long)]
        key: String,
    },

    /// Print the value of a key
    Get {
        #[command(flatten)]
        target: Target,

        /// Entity id, as "<index>v<generation>" or "<index>"
        #[arg(short, long)]
        entity: EntityId,

        /// Key to read
        #[arg(short, long)]
        key: String,
    },

    /// Add a key-value pair, or replace the value of an existing key
    Set {
        #[command(flatten)]
        target: Target,

        /// Entity id, as "<index>v<generation>" or "<index>"
        #[arg(short, long)]
        entity: EntityId,

        /// Key to write
        #[arg(short, long)]
        key: String,

        /// New value
        #[arg(short, long)]
        value: String,

        /// Leave an existing value untouched
        #[arg(long)]
        keep_existing: bool,

        /// Write the result here instead of back to FILE
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
