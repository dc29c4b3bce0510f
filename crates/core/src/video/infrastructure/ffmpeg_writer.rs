use std::path::Path;

use ffmpeg_next::codec::encoder::video::Encoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::{Packet, Rational};

use crate::shared::constants::{DEFAULT_BITS_PER_PIXEL, FALLBACK_FPS};
use crate::shared::frame::Frame;
use crate::video::domain::video_io_error::VideoIoError;
use crate::video::domain::video_writer::{EncoderSettings, VideoWriter};

const VIDEO_STREAM_INDEX: usize = 0;

/// Largest numerator or denominator allowed in an encoder time base. MPEG-4
/// Part 2 stores the clock in 16 bits.
const MAX_TIME_BASE_TERM: i32 = 65535;

/// Encodes RGB frames via ffmpeg-next into a single-stream container.
///
/// The container format is chosen by ffmpeg from the output file extension;
/// the encoder is looked up by name.
pub struct FfmpegWriter {
    octx: Option<Output>,
    encoder: Option<Encoder>,
    scaler: Option<scaling::Context>,
    width: u32,
    height: u32,
    time_base: Rational,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            time_base: Rational(1, FALLBACK_FPS as i32),
            frame_count: 0,
        }
    }

    /// Number of frames accepted since the last `open`.
    #[cfg(test)]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        settings: &EncoderSettings,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        // Resolve the encoder before touching the filesystem so an
        // unsupported codec leaves no file behind.
        let codec = ffmpeg_next::encoder::find_by_name(&settings.codec)
            .filter(|c| c.medium() == ffmpeg_next::media::Type::Video)
            .ok_or_else(|| VideoIoError::EncoderNotFound(settings.codec.clone()))?;

        let fps = if settings.fps > 0.0 {
            settings.fps
        } else {
            FALLBACK_FPS
        };
        let frame_rate = encoder_frame_rate(fps);
        let time_base = frame_rate.invert();
        let bit_rate = settings
            .bit_rate
            .unwrap_or_else(|| default_bit_rate(settings.width, settings.height, fps));

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(settings.width);
        encoder_ctx.set_height(settings.height);
        encoder_ctx.set_format(Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(frame_rate));
        encoder_ctx.set_bit_rate(bit_rate);

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        ost.set_time_base(time_base);

        octx.write_header()?;

        let scaler = scaling::Context::get(
            Pixel::RGB24,
            settings.width,
            settings.height,
            Pixel::YUV420P,
            settings.width,
            settings.height,
            scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Opened {} for writing ({}x{} @ {frame_rate}, {}, {bit_rate} b/s)",
            path.display(),
            settings.width,
            settings.height,
            settings.codec
        );

        self.width = settings.width;
        self.height = settings.height;
        self.time_base = time_base;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err(VideoIoError::NotOpened("FfmpegWriter").into());
        };

        if frame.width() != self.width || frame.height() != self.height {
            return Err(VideoIoError::FrameSizeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            }
            .into());
        }

        let mut rgb_frame = Video::new(Pixel::RGB24, self.width, self.height);
        let stride = rgb_frame.stride(0);
        let row_bytes = self.width as usize * 3;
        let dst = rgb_frame.data_mut(0);
        for (row, src_row) in frame.data().chunks_exact(row_bytes).enumerate() {
            let dst_start = row * stride;
            dst[dst_start..dst_start + row_bytes].copy_from_slice(src_row);
        }

        let mut yuv_frame = Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        write_pending_packets(encoder, octx, self.time_base)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.scaler = None;
        let (Some(mut encoder), Some(mut octx)) = (self.encoder.take(), self.octx.take()) else {
            return Ok(());
        };

        encoder.send_eof()?;
        write_pending_packets(&mut encoder, &mut octx, self.time_base)?;
        octx.write_trailer()?;

        log::debug!("Finalized output after {} frames", self.frame_count);
        Ok(())
    }
}

/// Drains every packet the encoder has ready and muxes it, rescaling
/// timestamps from the encoder time base to the stream's.
fn write_pending_packets(
    encoder: &mut Encoder,
    octx: &mut Output,
    encoder_time_base: Rational,
) -> Result<(), ffmpeg_next::Error> {
    let ost_time_base = octx
        .stream(VIDEO_STREAM_INDEX)
        .map(|s| s.time_base())
        .unwrap_or(encoder_time_base);

    let mut encoded = Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(VIDEO_STREAM_INDEX);
        encoded.rescale_ts(encoder_time_base, ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

/// Nearest rational to `fps` whose terms fit in [`MAX_TIME_BASE_TERM`].
/// Averaged rates of variable-rate sources (e.g. 1079000/35989) would
/// otherwise yield a time base the encoder refuses.
fn encoder_frame_rate(fps: f64) -> Rational {
    // Safety: av_d2q only does arithmetic on its arguments.
    let rate = unsafe { ffmpeg_next::ffi::av_d2q(fps, MAX_TIME_BASE_TERM) };
    Rational::from(rate).reduce()
}

fn default_bit_rate(width: u32, height: u32, fps: f64) -> usize {
    (f64::from(width) * f64::from(height) * fps * DEFAULT_BITS_PER_PIXEL) as usize
}
