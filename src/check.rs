//! `check` subcommand

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use skillbench::config::TaskBundle;
use skillbench::TaskSession;

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Task file (TOML)
    task: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct AnchorSummary {
    name: String,
    accepts: String,
    min_capacity: u32,
    snap_radius: f32,
}

#[derive(Debug, Serialize)]
struct ObjectSummary {
    name: String,
    kind: String,
    category: Option<String>,
    capacity: u32,
    grabbable: bool,
    tool: bool,
}

#[derive(Debug, Serialize)]
struct TaskSummary {
    name: String,
    anchors: Vec<AnchorSummary>,
    objects: Vec<ObjectSummary>,
    prep_targets: Vec<String>,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let bundle = TaskBundle::from_path(&args.task)
        .with_context(|| format!("Failed to load {}", args.task.display()))?;
    let session = TaskSession::from_bundle(&bundle).context("Failed to set up task")?;
    let summary = summarize(&session);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Task: {}", summary.name);
    println!("Anchors ({}):", summary.anchors.len());
    for anchor in &summary.anchors {
        println!(
            "  {:<24} accepts {:<8} min capacity {:<4} snap {:.3}m",
            anchor.name, anchor.accepts, anchor.min_capacity, anchor.snap_radius
        );
    }
    println!("Objects ({}):", summary.objects.len());
    for object in &summary.objects {
        let mut notes = Vec::new();
        if !object.grabbable {
            notes.push("fixed");
        }
        if object.tool {
            notes.push("tool");
        }
        println!(
            "  {:<24} {:<16} {:<8} capacity {:<4} {}",
            object.name,
            object.kind,
            object.category.as_deref().unwrap_or("-"),
            object.capacity,
            notes.join(", ")
        );
    }
    if !summary.prep_targets.is_empty() {
        println!("Prep targets: {}", summary.prep_targets.join(", "));
    }
    Ok(())
}

fn summarize(session: &TaskSession) -> TaskSummary {
    let world = session.world();
    TaskSummary {
        name: session.name().to_string(),
        anchors: world
            .anchors()
            .iter()
            .map(|anchor| AnchorSummary {
                name: anchor.name().to_string(),
                accepts: anchor.accepts().to_string(),
                min_capacity: anchor.min_capacity(),
                snap_radius: anchor.snap_radius(),
            })
            .collect(),
        objects: world
            .objects()
            .map(|object| ObjectSummary {
                name: object.name().to_string(),
                kind: object.kind().to_string(),
                category: object.tag().category.map(|c| c.to_string()),
                capacity: object.tag().capacity,
                grabbable: object.is_grabbable(),
                tool: object.tool().is_some(),
            })
            .collect(),
        prep_targets: world
            .prep_targets()
            .map(|(_, target)| target.name().to_string())
            .collect(),
    }
}
