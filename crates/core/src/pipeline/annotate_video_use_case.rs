use std::time::Instant;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::config::video_config::VideoConfig;
use crate::video::domain::video_io_error::VideoIoError;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::{EncoderSettings, VideoWriter};

use super::pipeline_logger::PipelineLogger;

/// What a completed run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotateReport {
    pub frames_written: usize,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Orchestrates one annotate run: decode → resize → draw → encode, one frame
/// at a time, in source order.
///
/// The source is opened before the destination is created, so an unreadable
/// source leaves no output behind. The first error aborts the run; reader
/// and writer are closed on every exit path. Decoding fewer frames than the
/// container advertises is an error.
pub struct AnnotateVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    annotator: Box<dyn FrameAnnotator>,
    logger: Box<dyn PipelineLogger>,
}

impl AnnotateVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        annotator: Box<dyn FrameAnnotator>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            annotator,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        config: &VideoConfig,
    ) -> Result<AnnotateReport, Box<dyn std::error::Error>> {
        let metadata = match self.reader.open(&config.source_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.reader.close();
                return Err(e);
            }
        };

        let settings = config.encoder_settings(&metadata);
        if settings.width % 2 != 0 || settings.height % 2 != 0 {
            self.reader.close();
            return Err(VideoIoError::OddFrameSize {
                width: settings.width,
                height: settings.height,
            }
            .into());
        }
        if (settings.width, settings.height) != (metadata.width, metadata.height) {
            self.logger.info(&format!(
                "Resizing {}x{} source to {}x{}",
                metadata.width, metadata.height, settings.width, settings.height
            ));
        }

        if let Err(e) = self.writer.open(&config.destination_path, &settings) {
            self.reader.close();
            return Err(e);
        }

        let result = pump_frames(
            self.reader.as_mut(),
            self.writer.as_mut(),
            self.annotator.as_ref(),
            self.logger.as_mut(),
            &settings,
            metadata.total_frames,
        );

        self.reader.close();
        let closed = self.writer.close();

        let frames_written = match result {
            Ok(n) => n,
            Err(e) => {
                if let Err(close_err) = closed {
                    log::warn!("Closing output after failure also failed: {close_err}");
                }
                return Err(e);
            }
        };
        closed?;

        if frames_written < metadata.total_frames {
            return Err(VideoIoError::TruncatedStream {
                expected: metadata.total_frames,
                decoded: frames_written,
            }
            .into());
        }
        if metadata.total_frames > 0 && frames_written > metadata.total_frames {
            log::warn!(
                "Container advertised {} frames but {} were decoded",
                metadata.total_frames,
                frames_written
            );
        }
        self.logger.summary();

        Ok(AnnotateReport {
            frames_written,
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
        })
    }
}

fn pump_frames(
    reader: &mut dyn VideoReader,
    writer: &mut dyn VideoWriter,
    annotator: &dyn FrameAnnotator,
    logger: &mut dyn PipelineLogger,
    settings: &EncoderSettings,
    total_frames: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut written = 0;
    let mut frames = reader.frames();

    loop {
        let started = Instant::now();
        let Some(decoded) = frames.next() else {
            break;
        };
        let frame = decoded?;
        debug_assert_eq!(frame.index(), written, "frames must arrive in decode order");
        logger.timing("decode", elapsed_ms(started));

        let started = Instant::now();
        let mut frame = frame.resized(settings.width, settings.height);
        logger.timing("resize", elapsed_ms(started));

        let started = Instant::now();
        annotator.annotate(&mut frame);
        logger.timing("draw", elapsed_ms(started));

        let started = Instant::now();
        writer.write(&frame)?;
        logger.timing("encode", elapsed_ms(started));

        written += 1;
        logger.progress(written, total_frames);
    }

    Ok(written)
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
