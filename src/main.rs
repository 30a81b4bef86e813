mod avc;
mod config;
mod news;
mod skill;
mod util;

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::{env, fs, process};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse a minimal CLI: optional --config <path>, --event <path>, --log-level <level>
    let mut args = env::args().skip(1);
    let mut config_override: Option<String> = None;
    let mut event_path: Option<String> = None;
    let mut log_level = String::from("info");
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(p) = args.next() { config_override = Some(p); }
            }
            "--event" => {
                if let Some(p) = args.next() { event_path = Some(p); }
            }
            "--log-level" => {
                if let Some(l) = args.next() { log_level = l; }
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
    }

    // Logs go to stderr; stdout carries only the outcome
    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cfg = config::load(config_override)?;
    let runtime = avc::build(&cfg)?;

    let raw = match event_path {
        Some(p) => fs::read_to_string(&p).with_context(|| format!("failed to read event: {}", p))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read event from stdin")?;
            buf
        }
    };
    let event: Value = serde_json::from_str(&raw).context("event is not valid JSON")?;

    let outcome = skill::handle_event(&runtime, event).await;
    println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    if let skill::HostOutcome::Fail(_) = outcome {
        process::exit(1);
    }
    Ok(())
}

fn print_help() {
    println!("avc-skill");
    println!("Usage: avc-skill [--config <path>] [--event <path>] [--log-level <level>]");
    println!("  --config <path>      Path to a config.toml overriding the built-in skill settings");
    println!("  --event <path>       Request envelope JSON to handle (default: read stdin)");
    println!("  --log-level <level>  Log filter, e.g. info, debug, avc_skill=trace (default: info)");
}
