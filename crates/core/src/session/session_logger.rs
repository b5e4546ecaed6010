use std::collections::HashMap;
use std::time::Instant;

/// Observer for loop events: stage timings, per-tick metrics and status
/// messages.
///
/// The GUI keeps the silent implementation; the CLI reports a summary when
/// the session ends.
pub trait SessionLogger: Send {
    /// Record how long a named stage took for one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time value (e.g. 1.0 when a face was found).
    fn metric(&mut self, name: &str, value: f64);

    /// Count one completed tick.
    fn tick(&mut self);

    fn info(&mut self, message: &str);

    fn summary(&self) {}
}

pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn tick(&mut self) {}
    fn info(&mut self, _message: &str) {}
}

/// Accumulates timings and metrics and writes them through `log`.
pub struct StdoutSessionLogger {
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    ticks: usize,
    start_time: Instant,
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutSessionLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            metrics: HashMap::new(),
            ticks: 0,
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} ticks, {elapsed_s:.1}s):",
            self.ticks
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            lines.push(format!(
                "  {stage:10}: avg {:6.1}ms  max {:6.1}ms",
                mean(durations),
                durations.iter().cloned().fold(0.0, f64::max)
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: avg {:.2}", mean(&self.metrics[name])));
        }

        if elapsed_s > 0.0 && self.ticks > 0 {
            lines.push(format!(
                "  Throughput: {:.1} ticks/s",
                self.ticks as f64 / elapsed_s
            ));
        }
        Some(lines.join("\n"))
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(s) = self.summary_string() {
            log::info!("{s}");
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_logger_has_no_summary() {
        assert!(StdoutSessionLogger::new().summary_string().is_none());
    }

    #[test]
    fn test_summary_reports_stage_average() {
        let mut logger = StdoutSessionLogger::new();
        logger.timing("detect", 10.0);
        logger.timing("detect", 20.0);
        logger.tick();
        logger.tick();
        let s = logger.summary_string().unwrap();
        assert!(s.contains("2 ticks"));
        assert!(s.contains("detect"));
        assert!(s.contains("avg   15.0ms"));
        assert!(s.contains("max   20.0ms"));
    }

    #[test]
    fn test_summary_reports_metric_average() {
        let mut logger = StdoutSessionLogger::new();
        logger.metric("face_found", 1.0);
        logger.metric("face_found", 0.0);
        logger.tick();
        let s = logger.summary_string().unwrap();
        assert!(s.contains("face_found: avg 0.50"));
    }

    #[test]
    fn test_timings_are_kept_per_stage() {
        let mut logger = StdoutSessionLogger::new();
        logger.timing("capture", 1.0);
        logger.timing("detect", 2.0);
        let s = logger.summary_string().unwrap();
        assert!(s.contains("capture   : avg    1.0ms"));
        assert!(s.contains("detect    : avg    2.0ms"));
        assert!(!s.contains("draw"));
    }

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullSessionLogger;
        logger.timing("detect", 1.0);
        logger.metric("m", 1.0);
        logger.tick();
        logger.info("hello");
        logger.summary();
    }
}
