//! clipforge: prompt-to-audio generation pipeline.
//!
//! Runs one request (optionally repeated to exercise the cache) and prints
//! the resulting artifact as JSON on stdout.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clipforge::audio::{samples_to_duration, FfmpegCodec};
use clipforge::cli::Cli;
use clipforge::config::PipelineConfig;
use clipforge::generation::Pipeline;
use clipforge::models::{ModelRegistry, PreviewSink};
use clipforge::types::AudioChunk;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("CLIPFORGE_LOG")
                .from_env_lossy(),
        )
        .try_init();
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = PipelineConfig::from_env();
    cli.apply_to(&mut config);

    let registry = Arc::new(ModelRegistry::builtin(config.sample_rate));
    let codec = Arc::new(FfmpegCodec::with_binary(config.effective_ffmpeg_path()));
    let mut pipeline = Pipeline::from_config(&config, registry, codec)
        .context("Failed to initialize pipeline")?;

    let preview_task = if cli.preview {
        let (tx, rx) = mpsc::channel(config.preview_buffer);
        pipeline = pipeline.with_preview(PreviewSink::new(tx));
        Some(tokio::spawn(report_preview(rx)))
    } else {
        None
    };

    info!("Output directory: {}", config.effective_output_dir().display());

    for attempt in 1..=cli.repeat {
        let start = Instant::now();
        let artifact = pipeline
            .generate(&cli.prompt, cli.model.as_deref())
            .await
            .context("Prompt rejected")?;

        info!(
            "Request {}/{} finished in {:.2}s (fallback: {})",
            attempt,
            cli.repeat,
            start.elapsed().as_secs_f32(),
            artifact.is_fallback()
        );
        println!("{}", serde_json::to_string_pretty(&artifact)?);
    }

    // Dropping the pipeline closes the preview channel
    drop(pipeline);
    if let Some(task) = preview_task {
        task.await.context("Preview task panicked")?;
    }

    Ok(())
}

async fn report_preview(mut rx: mpsc::Receiver<AudioChunk>) {
    let mut total = 0.0f32;
    while let Some(chunk) = rx.recv().await {
        let frames = chunk.samples.len() / chunk.channels.max(1) as usize;
        total += samples_to_duration(frames, chunk.sample_rate);
        eprintln!("preview chunk {} ({:.1}s streamed)", chunk.index, total);
    }
}
