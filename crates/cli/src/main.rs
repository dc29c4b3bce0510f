use std::path::PathBuf;
use std::process;

use clap::Parser;

use video_annotate_core::annotation::infrastructure::overlay_renderer::OverlayRenderer;
use video_annotate_core::annotation::infrastructure::rasterizer_factory::create_rasterizer;
use video_annotate_core::config::annotate_config::AnnotateConfig;
use video_annotate_core::pipeline::annotate_video_use_case::AnnotateVideoUseCase;
use video_annotate_core::pipeline::pipeline_logger::LogPipelineLogger;
use video_annotate_core::shared::constants::DEFAULT_CONFIG_FILE;
use video_annotate_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use video_annotate_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Draws fixed text overlays onto every frame of a video.
#[derive(Parser)]
#[command(name = "video-annotate")]
struct Cli {
    /// JSON job file describing the source, destination and overlays.
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AnnotateConfig::load(&cli.config)?;
    annotate(&config)
}

fn annotate(config: &AnnotateConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut rasterizer = create_rasterizer(config.font.as_deref())?;
    let renderer = OverlayRenderer::new(&config.overlays, rasterizer.as_mut());
    if renderer.is_empty() {
        log::info!(
            "No overlays to draw; re-encoding {}",
            config.video.source_path.display()
        );
    } else {
        log::info!(
            "Drawing {} overlay(s) onto {}",
            renderer.len(),
            config.video.source_path.display()
        );
    }

    let mut use_case = AnnotateVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        Box::new(renderer),
        Box::new(LogPipelineLogger::default()),
    );
    let report = use_case.execute(&config.video)?;

    log::info!(
        "Wrote {} frames ({}x{} @ {:.2} fps)",
        report.frames_written,
        report.width,
        report.height,
        report.fps
    );
    log::info!("Output written to {}", config.video.destination_path.display());
    Ok(())
}
