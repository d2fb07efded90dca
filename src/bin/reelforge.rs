use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use reelforge::{
    DigestSink, FfmpegSink, FfmpegSinkOpts, GenerationConfig, ImageSequenceSource,
    PngSequenceSink, RunOpts, TracingObserver, VideoPipeline,
};

#[derive(Parser, Debug)]
#[command(name = "reelforge", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `info`, `reelforge=debug`).
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full clip as an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single output frame as a PNG.
    Frame(FrameArgs),
    /// Render every output frame as a numbered PNG sequence.
    Frames(FramesArgs),
    /// Render in memory and print the xxh3 digest of all frames.
    Digest(DigestArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Generation config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Caption cues JSON: `[{ "text": ..., "start_frame": ... }]`.
    #[arg(long)]
    captions: Option<PathBuf>,

    /// Directory of PNG/JPEG stills to use as the base clip instead of the procedural pattern.
    #[arg(long)]
    source_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExecArgs {
    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per parallel chunk.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    exec: ExecArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of overwriting an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// x264 constant rate factor.
    #[arg(long, default_value_t = 20)]
    crf: u8,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    exec: ExecArgs,

    /// Output directory for `frame_00000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct DigestArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    exec: ExecArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Digest(args) => cmd_digest(args),
    }
}

fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter '{default_filter}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn build_pipeline(input: &InputArgs) -> anyhow::Result<VideoPipeline> {
    let config = match &input.config {
        Some(path) => GenerationConfig::from_path(path)?,
        None => GenerationConfig::default(),
    };
    let canvas = config.canvas();

    let mut pipeline =
        VideoPipeline::new(config)?.with_observer(std::sync::Arc::new(TracingObserver));
    if let Some(dir) = &input.source_dir {
        let source = ImageSequenceSource::load(dir, canvas)?;
        pipeline = pipeline.with_source(Box::new(source));
    }
    if let Some(path) = &input.captions {
        let n = pipeline.overlay_mut().load_captions(path)?;
        tracing::info!(captions = n, path = %path.display(), "captions loaded");
    }
    Ok(pipeline)
}

fn run_opts(exec: &ExecArgs) -> RunOpts {
    RunOpts {
        parallel: exec.parallel,
        threads: exec.threads,
        chunk_size: exec.chunk_size,
        ..RunOpts::default()
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(&args.input)?;

    let overwrite = !args.no_overwrite;
    let existed = args.out.exists();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite,
        crf: args.crf,
    });

    let res = pipeline.run(&mut sink, &run_opts(&args.exec));
    // Reap ffmpeg before touching its output file.
    drop(sink);
    let stats = match res {
        Ok(stats) => stats,
        Err(e) => {
            if overwrite || !existed {
                remove_partial(&args.out);
            }
            return Err(e.into());
        }
    };

    eprintln!(
        "wrote {} ({} frames, {} minor / {} major breaks)",
        args.out.display(),
        stats.frames_emitted,
        stats.minor_breaks,
        stats.major_breaks
    );
    Ok(())
}

fn remove_partial(path: &Path) {
    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::info!(path = %path.display(), "removed partial output"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove partial output"),
        }
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&args.input)?;
    let frame = pipeline.render_frame(args.index)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    reelforge::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(&args.input)?;
    let mut sink = PngSequenceSink::new(&args.out_dir);
    let stats = pipeline.run(&mut sink, &run_opts(&args.exec))?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_emitted,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_digest(args: DigestArgs) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(&args.input)?;
    let mut sink = DigestSink::new();
    let stats = pipeline.run(&mut sink, &run_opts(&args.exec))?;
    let digest = sink.digest().context("digest sink produced no digest")?;

    println!("{digest:016x} {}", stats.frames_emitted);
    Ok(())
}
