//! `replay` subcommand

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use skillbench::config::TaskBundle;
use skillbench::input::ReplaySource;
use skillbench::TaskSession;

#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Task file (TOML)
    task: PathBuf,

    /// Hand recording as NAME=PATH (JSON). Repeat for more hands; hands are
    /// evaluated in the order given.
    #[arg(long = "hand", value_parser = parse_hand, required = true)]
    hands: Vec<(String, PathBuf)>,

    /// Ticks to run. Defaults to the longest recording.
    #[arg(long)]
    ticks: Option<u64>,

    /// Seconds per tick
    #[arg(long, default_value = "0.011111")]
    dt: f32,
}

fn parse_hand(raw: &str) -> std::result::Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok((name.to_string(), PathBuf::from(path))),
        _ => Err(format!("expected NAME=PATH, got '{raw}'")),
    }
}

pub fn run(args: ReplayArgs) -> Result<()> {
    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be a positive number of seconds");
    }

    let bundle = TaskBundle::from_path(&args.task)
        .with_context(|| format!("Failed to load {}", args.task.display()))?;
    let mut session = TaskSession::from_bundle(&bundle).context("Failed to set up task")?;

    let mut longest = 0;
    for (name, path) in &args.hands {
        let source = ReplaySource::from_path(path)
            .with_context(|| format!("Failed to load recording for hand '{name}'"))?;
        longest = longest.max(source.remaining() as u64);
        session.add_hand(name.clone(), Box::new(source));
    }
    let ticks = args.ticks.unwrap_or(longest);
    info!("Replaying '{}' for {} ticks", session.name(), ticks);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut rejections = 0usize;
    for _ in 0..ticks {
        let report = session.world_mut().tick(args.dt);
        rejections += report.rejections().count();
        for event in &report.events {
            writeln!(out, "{}", serde_json::json!({ "tick": report.tick, "event": event }))?;
        }
    }
    out.flush()?;

    let complete = session.is_complete();
    info!(
        "Finished after {} ticks: {} rejections, task {}",
        ticks,
        rejections,
        if complete { "complete" } else { "incomplete" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hand() {
        assert_eq!(
            parse_hand("right=rec/right.json").unwrap(),
            ("right".to_string(), PathBuf::from("rec/right.json"))
        );
        assert!(parse_hand("right").is_err());
        assert!(parse_hand("=x.json").is_err());
    }
}
