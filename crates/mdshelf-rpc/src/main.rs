//! mdshelf - migrate Markdown documents together with their images.
//!
//! One-shot subcommands print their result as JSON on stdout. `serve` keeps a
//! single session alive behind a JSON-RPC 2.0 endpoint so a UI process can undo
//! renames across calls.

mod handlers;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdshelf_core::{MdShelf, MigrationConfig, RenamePattern};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "mdshelf")]
#[command(about = "Move Markdown documents together with the images they reference")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy documents into TARGET, relocating their images under TARGET/images
    Migrate {
        /// A Markdown file or a directory searched recursively
        source: PathBuf,
        target: PathBuf,
        /// Store images under images/<document name>/
        #[arg(long)]
        subfolders: bool,
        /// Download http(s) images instead of leaving them remote
        #[arg(long)]
        download: bool,
        /// Merge all documents into one
        #[arg(long)]
        merge: bool,
        /// Report images under TARGET/images that nothing references
        #[arg(long)]
        cleanup: bool,
        /// Do not write the dated run log into TARGET
        #[arg(long)]
        no_run_log: bool,
    },

    /// Find images in asset folders that no document references
    Audit {
        path: PathBuf,
        /// Move redundant images into unused_backup/
        #[arg(long)]
        remove: bool,
        /// With --remove, delete instead of backing up
        #[arg(long, requires = "remove")]
        permanent: bool,
    },

    /// Rename the Markdown files in FOLDER using {original}, {num} and {date}
    Rename {
        folder: PathBuf,
        pattern: String,
        #[arg(long, default_value = "1")]
        start: String,
        /// Zero-padding width for {num}
        #[arg(long, default_value = "3")]
        padding: String,
        /// Apply the renames (default is preview only)
        #[arg(long)]
        apply: bool,
    },

    /// Pull referenced images into FOLDER/images and rename them after their document
    Inplace {
        folder: PathBuf,
        /// Report images under FOLDER/images that nothing references
        #[arg(long)]
        cleanup: bool,
    },

    /// Serve every operation over JSON-RPC
    Serve {
        /// Port to listen on (0 = auto-assign)
        #[arg(short, long, default_value = "0")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let shelf = MdShelf::new()?;

    match args.command {
        Command::Migrate {
            source,
            target,
            subfolders,
            download,
            merge,
            cleanup,
            no_run_log,
        } => {
            let config = MigrationConfig {
                use_subfolders: subfolders,
                download_remote: download,
                merge,
                cleanup_after: cleanup,
                write_run_log: !no_run_log,
            };
            print_json(&shelf.migrate(&source, &target, &config).await?)?;
        }

        Command::Audit {
            path,
            remove,
            permanent,
        } => {
            let report = shelf.audit(&path).await?;
            print_json(&report)?;
            if remove && !report.report.redundant.is_empty() {
                print_json(&shelf.cleanup(report.report.redundant, permanent).await?)?;
            }
        }

        Command::Rename {
            folder,
            pattern,
            start,
            padding,
            apply,
        } => {
            let pattern = RenamePattern::parse(&pattern, &start, &padding)?;
            if apply {
                print_json(&shelf.rename_apply(&folder, &pattern).await?)?;
            } else {
                print_json(&shelf.rename_preview(&folder, &pattern).await?)?;
            }
        }

        Command::Inplace { folder, cleanup } => {
            print_json(&shelf.inplace(&folder, cleanup).await?)?;
        }

        Command::Serve { port, host } => {
            info!("Starting mdshelf RPC server");
            let addr = server::start_server(shelf, &host, port).await?;

            // Print port for the calling process to read (intentional stdout)
            println!("RPC_PORT={}", addr.port());

            info!("RPC server running on {}", addr);

            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received, exiting");
        }
    }

    Ok(())
}
