use std::collections::HashMap;
use std::time::Instant;

/// Observer for annotate-run events.
///
/// Keeps the use case independent of where progress and timing go
/// (the `log` crate, a test, nowhere).
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the container does not
    /// advertise a frame count.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running total of one stage's per-frame durations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTiming {
    pub count: usize,
    pub total_ms: f64,
}

impl StageTiming {
    pub fn average_ms(&self) -> f64 {
        self.total_ms / self.count.max(1) as f64
    }
}

/// Forwards events to the `log` crate and keeps per-stage totals for a
/// summary at the end of the run.
///
/// Progress is only logged every `throttle_frames` frames.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, StageTiming>,
    start_time: Instant,
    frames_seen: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Annotate summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let timing = self.timings[stage];
            let total_ms = timing.total_ms;
            let avg_ms = timing.average_ms();
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.2}ms  total {total_ms:7.0}ms"
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    #[cfg(test)]
    pub fn timing_for(&self, stage: &str) -> Option<StageTiming> {
        self.timings.get(stage).copied()
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = current;
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Annotated {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Annotated {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let timing = self.timings.entry(stage.to_string()).or_default();
        timing.count += 1;
        timing.total_ms += duration_ms;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("draw", 5.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_accumulates_per_stage() {
        let mut logger = LogPipelineLogger::new(10);
        logger.timing("decode", 2.0);
        logger.timing("decode", 4.0);
        logger.timing("encode", 7.5);

        let decode = logger.timing_for("decode").unwrap();
        assert_eq!(decode.count, 2);
        assert_relative_eq!(decode.total_ms, 6.0);
        assert_eq!(logger.timing_for("encode").unwrap().count, 1);
        assert!(logger.timing_for("draw").is_none());
    }

    #[test]
    fn test_long_runs_keep_one_entry_per_stage() {
        let mut logger = LogPipelineLogger::new(1000);
        for _ in 0..100_000 {
            for stage in ["decode", "resize", "draw", "encode"] {
                logger.timing(stage, 0.5);
            }
        }
        assert_eq!(logger.timings.len(), 4);
        let draw = logger.timing_for("draw").unwrap();
        assert_eq!(draw.count, 100_000);
        assert_relative_eq!(draw.average_ms(), 0.5);
    }

    #[test]
    fn test_summary_lists_stages_and_throughput() {
        let mut logger = LogPipelineLogger::new(10);
        logger.progress(10, 10);
        logger.timing("decode", 2.0);
        logger.timing("draw", 1.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Annotate summary (10 frames"));
        assert!(summary.contains("decode"));
        assert!(summary.contains("draw"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_summary_average() {
        let mut logger = LogPipelineLogger::new(10);
        logger.timing("draw", 1.0);
        logger.timing("draw", 3.0);
        assert_relative_eq!(logger.timing_for("draw").unwrap().average_ms(), 2.0);
        assert!(logger.summary_string().unwrap().contains("avg   2.00ms"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_frames_without_total() {
        let mut logger = LogPipelineLogger::new(10);
        for i in 1..=25 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames_seen, 25);
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        let logger = LogPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }
}
