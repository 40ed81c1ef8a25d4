//! tablekv CLI
//!
//! Command-line interface for file-backed tables.

use std::process;

use clap::{Parser, Subcommand};
use tablekv::table::{filter, render};
use tablekv::{Catalog, Config, Scalar, Table};
use tracing_subscriber::{fmt, EnvFilter};

/// tablekv CLI
#[derive(Parser, Debug)]
#[command(name = "tablekv-cli")]
#[command(about = "CLI for tablekv file-backed tables")]
#[command(version)]
struct Args {
    /// Base directory holding the tables
    #[arg(short, long, default_value = "./tablekv_data")]
    base_dir: String,

    /// fsync every file write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table (the first column is the key)
    Create {
        table: String,
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Insert or replace a row
    Put {
        table: String,
        key: String,
        /// Field literals: null, true/false, integers, floats, else text
        #[arg(allow_hyphen_values = true)]
        fields: Vec<String>,
    },

    /// Print the fields stored under a key
    Get { table: String, key: String },

    /// Remove a row
    Remove { table: String, key: String },

    /// Print a table
    Show { table: String },

    /// Print the rows whose column equals a value
    Filter {
        table: String,
        column: String,
        value: String,
    },

    /// Remove every row of a table
    Clear { table: String },

    /// Delete a table
    Drop { table: String },

    /// Compare a table's ledger with its row files
    Audit { table: String },

    /// List tables
    Tables,
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tablekv=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .base_dir(&args.base_dir)
        .sync_writes(args.sync)
        .build();

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(config: Config, command: Commands) -> tablekv::Result<()> {
    let catalog = Catalog::open(config)?;

    match command {
        Commands::Create { table, columns } => {
            let t = catalog.create(&table, columns)?;
            println!("created {} ({} columns)", t.name(), t.degree());
        }
        Commands::Put { table, key, fields } => {
            let mut t = catalog.open_table(&table)?;
            let fields = fields.iter().map(|f| parse_literal(f)).collect();
            match t.put(&key, fields)? {
                Some(old) => println!("replaced {}: {}", key, join(&old)),
                None => println!("inserted {}", key),
            }
        }
        Commands::Get { table, key } => {
            let t = catalog.open_table(&table)?;
            match t.get(&key)? {
                Some(fields) => println!("{}", join(&fields)),
                None => println!("(absent)"),
            }
        }
        Commands::Remove { table, key } => {
            let mut t = catalog.open_table(&table)?;
            match t.remove(&key)? {
                Some(old) => println!("removed {}: {}", key, join(&old)),
                None => println!("(absent)"),
            }
        }
        Commands::Show { table } => {
            let t = catalog.open_table(&table)?;
            print!("{}", render(&t)?);
        }
        Commands::Filter {
            table,
            column,
            value,
        } => {
            let t = catalog.open_table(&table)?;
            let filtered = filter(&t, &column, &parse_literal(&value))?;
            print!("{}", filtered);
        }
        Commands::Clear { table } => {
            let mut t = catalog.open_table(&table)?;
            t.clear()?;
            println!("cleared {}", table);
        }
        Commands::Drop { table } => {
            if catalog.drop_table(&table)? {
                println!("dropped {}", table);
            } else {
                println!("no such table: {}", table);
            }
        }
        Commands::Audit { table } => {
            let t = catalog.open_table(&table)?;
            let audit = t.audit()?;
            println!(
                "size: recorded {} / actual {}",
                audit.recorded_size, audit.actual_size
            );
            println!(
                "fingerprint: recorded {} / actual {}",
                audit.recorded_fingerprint, audit.actual_fingerprint
            );
            for path in &audit.misplaced {
                println!("misplaced: {}", path.display());
            }
            println!("{}", if audit.is_consistent() { "consistent" } else { "DRIFT" });
        }
        Commands::Tables => {
            for name in catalog.list()? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn parse_literal(text: &str) -> Scalar {
    match text.parse() {
        Ok(scalar) => scalar,
        Err(never) => match never {},
    }
}

fn join(fields: &[Scalar]) -> String {
    fields
        .iter()
        .map(Scalar::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
