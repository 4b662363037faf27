//! pixsim console shell
//!
//! Runs the console namespace against a demo scene in the terminal:
//! one expression per line, results printed as they resolve.
//!
//! Usage:
//!   pixsim-shell --config console.toml
//!   pixsim-shell -e 'ops.scene.add_node("tree")' -e 'data.scene.nodes'

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use pixsim_console::{Console, ConsoleConfig};
use pixsim_shell::{build_console, format_entry};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "pixsim-shell")]
#[command(about = "Interactive pixsim debug console")]
struct Args {
    /// Path to console configuration file
    #[arg(short, long, default_value = "console.toml")]
    config: PathBuf,

    /// Evaluate an expression and exit (repeatable)
    #[arg(short, long = "eval")]
    eval: Vec<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    if std::env::var_os("RUST_LOG").is_some() {
        subscriber.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        subscriber.with_max_level(log_level).init();
    }

    let config = ConsoleConfig::load_from(&args.config);
    let root = config.root_name.clone();
    let (mut console, _scene) = build_console(config).context("failed to register console modules")?;

    if !args.eval.is_empty() {
        for line in &args.eval {
            submit(&mut console, line).await;
        }
        return Ok(());
    }

    println!("\n========================================");
    println!("  pixsim console");
    println!("========================================");
    println!("  Root:    {}", root);
    println!("  Stores:  {}", console.namespace().stores().keys().join(", "));
    println!("  Ops:     {}", console.namespace().operations().categories().join(", "));
    println!("\n  help() for usage, exit to quit");
    println!("========================================\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(format!("{root}> ").as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "exit" | "quit" => break,
            "clear" => {
                console.log_mut().clear();
                debug!("log cleared");
            }
            _ => submit(&mut console, &line).await,
        }
    }

    info!(entries = console.log().len(), "console closed");
    Ok(())
}

async fn submit(console: &mut Console, line: &str) {
    if let Some(entry) = console.submit(line).await {
        if let Some(text) = format_entry(&entry) {
            if entry.is_error() {
                eprintln!("{text}");
            } else {
                println!("{text}");
            }
        }
    }
}
