use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "playout", version)]
struct Cli {
    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run propagation and print the PieceInstances of every Part as JSON.
    Propagate(PropagateArgs),
    /// Compile the timeline for a previous/current/next selection and print it as JSON.
    Timeline(TimelineArgs),
}

#[derive(Parser, Debug)]
struct PropagateArgs {
    /// Input rundown JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Recompute from this Part on, seeding from a full run of the Parts before it.
    #[arg(long)]
    from: Option<String>,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input rundown JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Part on air.
    #[arg(long)]
    current: String,

    /// Wall-clock start of the current Part (epoch ms).
    #[arg(long)]
    started: i64,

    /// Part that was on air before the current one.
    #[arg(long, requires = "previous_started")]
    previous: Option<String>,

    /// Wall-clock start of the previous Part (epoch ms).
    #[arg(long)]
    previous_started: Option<i64>,

    /// Part queued as next.
    #[arg(long)]
    next: Option<String>,

    /// Do not emit the disabled lookahead group for a manually taken next Part.
    #[arg(long)]
    no_lookahead: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.cmd {
        Command::Propagate(args) => cmd_propagate(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_rundown_json(path: &Path) -> anyhow::Result<playout::Rundown> {
    let f = File::open(path).with_context(|| format!("open rundown '{}'", path.display()))?;
    let r = BufReader::new(f);
    let rundown: playout::Rundown =
        serde_json::from_reader(r).with_context(|| "parse rundown JSON")?;
    Ok(rundown)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).with_context(|| "write JSON")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_propagate(args: PropagateArgs) -> anyhow::Result<()> {
    let rundown = read_rundown_json(&args.in_path)?;
    let full = playout::propagate(&rundown, None, &playout::CommittedState::default())?;

    let result = match args.from {
        None => full,
        Some(from) => {
            let committed = full.into_committed();
            playout::propagate(&rundown, Some(&playout::PartId::new(from)), &committed)?
        }
    };

    let parts: Vec<serde_json::Value> = result
        .parts
        .iter()
        .map(|p| {
            serde_json::json!({
                "part_id": p.part_id,
                "piece_instances": p.instances,
            })
        })
        .collect();
    print_json(&serde_json::json!({
        "rundown_id": result.rundown_id,
        "recomputed_from": result.recomputed_from,
        "parts": parts,
    }))
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let rundown = read_rundown_json(&args.in_path)?;
    let committed =
        playout::propagate(&rundown, None, &playout::CommittedState::default())?.into_committed();
    let index = rundown.index()?;

    let instance = |id: &str, playthrough: u64| -> anyhow::Result<playout::PartInstance> {
        let part_id = playout::PartId::new(id);
        let part = index
            .part(&part_id)
            .with_context(|| format!("unknown part '{id}'"))?;
        Ok(playout::PartInstance::new(
            &rundown.id,
            part,
            playthrough,
            committed.instances_for(&part_id).to_vec(),
        ))
    };

    let previous = match (&args.previous, args.previous_started) {
        (Some(id), Some(started)) => Some(instance(id, 0)?.started_at(started)),
        _ => None,
    };
    let current = instance(&args.current, 1)?.started_at(args.started);
    let next = args.next.as_deref().map(|id| instance(id, 2)).transpose()?;

    let opts = playout::TimelineOpts {
        lookahead_next: !args.no_lookahead,
    };
    let objects = playout::compile(previous.as_ref(), &current, next.as_ref(), &opts);
    let fingerprint = playout::fingerprint_timeline(&objects);

    print_json(&serde_json::json!({
        "fingerprint": fingerprint.to_string(),
        "objects": objects,
    }))
}
