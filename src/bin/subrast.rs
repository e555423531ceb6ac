use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use subrast::{
    DecoderOpts, OverlayUnit, ReplayEngine, ReplayScript, SubtitleCodec, SubtitleDecoder, Tick,
    TrackFormat, UpdateRequest,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "subrast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render regions at the given times and write one PNG per region.
    Render(RenderArgs),
    /// Print the region rectangles at one time as JSON.
    Regions(RegionsArgs),
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Input replay script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Decoder options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Override the region count bound.
    #[arg(long)]
    max_regions: Option<usize>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Render times in milliseconds.
    #[arg(long = "at", required = true, num_args = 1..)]
    at_ms: Vec<i64>,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Frame each region with an opaque outline.
    #[arg(long, default_value_t = false)]
    outline: bool,
}

#[derive(Parser, Debug)]
struct RegionsArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Render time in milliseconds.
    #[arg(long = "at")]
    at_ms: i64,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Regions(args) => cmd_regions(args),
    }
}

struct Loaded {
    script: ReplayScript,
    units: Vec<OverlayUnit<ReplayEngine>>,
}

impl Loaded {
    /// The unit on screen at `at`: the last one that started at or before it.
    fn unit_at(&mut self, at: Tick) -> Option<&mut OverlayUnit<ReplayEngine>> {
        self.units.iter_mut().rev().find(|u| u.start() <= at)
    }
}

fn load(args: &ScriptArgs, outline: bool) -> anyhow::Result<Loaded> {
    let script = ReplayScript::from_path(&args.in_path)
        .with_context(|| format!("load script '{}'", args.in_path.display()))?;
    let mut opts = match &args.opts {
        Some(p) => DecoderOpts::from_path(p)?,
        None => DecoderOpts::default(),
    };
    if let Some(k) = args.max_regions {
        opts.max_regions = k;
    }
    opts.debug_outline |= outline;

    let format = TrackFormat {
        codec: SubtitleCodec::Ssa,
        extra: script.header.clone().into_bytes(),
    };
    let mut decoder = SubtitleDecoder::open(&format, opts, &[], |setup| {
        Ok(ReplayEngine::new(setup.clone()))
    })?;

    let mut units = Vec::new();
    for block in script.blocks()? {
        units.extend(decoder.decode(block));
    }
    Ok(Loaded { script, units })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut loaded = load(&args.script, args.outline)?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let geometry = loaded.script.geometry;
    for &ms in &args.at_ms {
        let at = Tick::from_millis(ms);
        let Some(unit) = loaded.unit_at(at) else {
            eprintln!("t={ms}ms: no subtitle");
            continue;
        };
        let outcome = unit.update(&UpdateRequest { pts: at, geometry });
        tracing::info!(ms, ?outcome, regions = unit.regions().len(), "rendered");

        for (i, region) in unit.regions().iter().enumerate() {
            let path = args.out.join(format!(
                "t{ms}_r{i}_{}x{}.png",
                region.rect.x0, region.rect.y0
            ));
            write_png(&path, region)?;
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn cmd_regions(args: RegionsArgs) -> anyhow::Result<()> {
    let mut loaded = load(&args.script, false)?;
    let geometry = loaded.script.geometry;
    let at = Tick::from_millis(args.at_ms);
    let rects: Vec<subrast::IntRect> = match loaded.unit_at(at) {
        Some(unit) => {
            unit.update(&UpdateRequest { pts: at, geometry });
            unit.regions().iter().map(|r| r.rect).collect()
        }
        None => Vec::new(),
    };
    println!("{}", serde_json::to_string_pretty(&rects)?);
    Ok(())
}

fn write_png(path: &Path, region: &subrast::Region) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        &region.data,
        region.width(),
        region.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
