//! CompactSleuth: filesystem indexer for per-directory compression planning.
//!
//! Thin binary entry point. All logic lives in `compactsleuth-core`; this
//! shell lists volumes or a directory, optionally analyzing recursively, and
//! prints the sized tree as text or JSON.

use clap::Parser;
use compactsleuth_core::model::size::{format_count, format_size};
use compactsleuth_core::model::{CompressionType, TreeSnapshot};
use compactsleuth_core::scanner::options::ScanOptions;
use compactsleuth_core::scanner::progress::ScanProgress;
use compactsleuth_core::ScanSession;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "compactsleuth", version, about)]
struct Cli {
    /// Directory to list. Omit to list mounted volumes.
    path: Option<PathBuf>,

    /// Analyze every subdirectory, not just the immediate entries.
    #[arg(short, long)]
    recursive: bool,

    /// Print JSON instead of an indented tree.
    #[arg(long)]
    json: bool,

    /// Levels of subdirectories to print below each listed directory.
    #[arg(long, default_value_t = 0)]
    depth: usize,

    /// Follow symbolic links.
    #[arg(long)]
    follow_links: bool,

    /// Leave dot-files and dot-directories out.
    #[arg(long)]
    skip_hidden: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the listing.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    let options = ScanOptions {
        follow_links: cli.follow_links,
        skip_hidden: cli.skip_hidden,
        ..ScanOptions::default()
    };
    let session = Arc::new(ScanSession::with_options(options));
    let progress_rx = session.subscribe_progress();

    let worker = {
        let session = session.clone();
        let path = cli.path.clone().unwrap_or_default();
        let recursive = cli.recursive;
        thread::Builder::new()
            .name("compactsleuth-scanner".into())
            .spawn(move || session.list_children(path, recursive))?
    };

    while !worker.is_finished() {
        match progress_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(ScanProgress::Update {
                files_found,
                total_size,
                current_path,
                ..
            }) => {
                eprint!(
                    "\r{} files, {}  {}\x1b[K",
                    format_count(files_found),
                    format_size(total_size),
                    current_path
                );
            }
            Ok(ScanProgress::Cancelled) => eprintln!("\rscan paused\x1b[K"),
            Ok(ScanProgress::Complete { .. }) | Err(_) => {}
        }
    }
    eprint!("\r\x1b[K");

    let listed = worker
        .join()
        .map_err(|_| anyhow::anyhow!("scanner thread panicked"))?;

    let snapshots: Vec<TreeSnapshot> = listed
        .iter()
        .filter_map(|dir| session.tree_snapshot(dir.key, Some(cli.depth)))
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &snapshots)?;
        writeln!(out)?;
    } else {
        for snapshot in &snapshots {
            print_tree(&mut out, &session, snapshot, 0)?;
        }
    }

    Ok(())
}

fn print_tree(
    out: &mut impl Write,
    session: &ScanSession,
    node: &TreeSnapshot,
    indent: usize,
) -> io::Result<()> {
    let status = if !node.analyzed {
        " (not analyzed)"
    } else if !session.unanalyzed_descendants(node.key).is_empty() {
        " (partial)"
    } else {
        ""
    };
    let compression = match (node.auto_compress, node.compression) {
        (true, _) => " [auto]".to_string(),
        (false, CompressionType::None) => String::new(),
        (false, scheme) => format!(" [{}]", scheme.label()),
    };
    writeln!(
        out,
        "{:>10}  {}{}{}{}",
        format_size(node.analyzed_size),
        "  ".repeat(indent),
        node.name,
        status,
        compression
    )?;
    for child in &node.children {
        print_tree(out, session, child, indent + 1)?;
    }
    Ok(())
}
