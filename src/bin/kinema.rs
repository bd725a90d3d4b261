use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kinema", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a page manifest and mount it once without running it.
    Validate(ValidateArgs),
    /// Run a scripted session headlessly and write the sampled trace.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Script JSON: tick cadence, end time, timestamped events.
    #[arg(long)]
    script: PathBuf,

    /// Output trace JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn read_manifest_json(path: &Path) -> anyhow::Result<kinema::Manifest> {
    let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
    let r = BufReader::new(f);
    let manifest: kinema::Manifest =
        serde_json::from_reader(r).with_context(|| "parse manifest JSON")?;
    Ok(manifest)
}

fn read_script_json(path: &Path) -> anyhow::Result<kinema::Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: kinema::Script =
        serde_json::from_reader(r).with_context(|| "parse script JSON")?;
    Ok(script)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let manifest = read_manifest_json(&args.in_path)?;
    manifest.validate()?;

    // Mounting catches what static checks cannot, e.g. a carousel with too
    // few items for its clone cushions.
    let session = kinema::Session::build(&manifest, 0.0)?;

    eprintln!(
        "ok: {} nodes, carousel {}, marquee {}, {} reveal groups",
        manifest.nodes.len(),
        if session.carousel().is_some() { "mounted" } else { "absent" },
        if manifest.marquee.is_some() { "mounted" } else { "absent" },
        manifest.reveals.len(),
    );
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let manifest = read_manifest_json(&args.manifest)?;
    let script = read_script_json(&args.script)?;

    let trace = kinema::run_script(&manifest, &script)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create trace '{}'", args.out.display()))?;
    let w = BufWriter::new(f);
    serde_json::to_writer_pretty(w, &trace)
        .with_context(|| format!("write trace '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} samples)", args.out.display(), trace.samples.len());
    Ok(())
}
