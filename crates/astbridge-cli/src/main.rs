//! astbridge CLI - AST binding generator
//!
//! Commands:
//! - `astbridge generate` - Generate native and managed AST bindings
//! - `astbridge check` - Validate a bootstrap configuration

use astbridge_logging::{LogLevel, init_logging};
use clap::{Parser, Subcommand};

mod check;
mod generate;

#[derive(Parser)]
#[command(name = "astbridge")]
#[command(author, version, about = "Generator for native and managed AST bindings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings from a declaration graph
    Generate {
        /// Path to the declaration graph (JSON)
        #[arg(short, long)]
        graph: String,

        /// Path to the bootstrap configuration (default: built-in clang settings)
        #[arg(short, long)]
        config: Option<String>,

        /// Output directory for generated code
        #[arg(short, long)]
        output: String,

        /// List the artifacts without writing them
        #[arg(long)]
        dry_run: bool,

        /// Log level (trace, debug, info, warn, error, off)
        #[arg(short, long, default_value = "info")]
        log_level: LogLevel,
    },

    /// Validate a bootstrap configuration
    Check {
        /// Path to the bootstrap configuration (default: built-in clang settings)
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            graph,
            config,
            output,
            dry_run,
            log_level,
        } => {
            init_logging(log_level);
            generate::run(&graph, config, &output, dry_run)?;
        }
        Commands::Check { config } => {
            check::check(config)?;
        }
    }

    Ok(())
}
