//! Rate-limited download progress logging.
//!
//! The download callback fires once per received chunk, which can be many
//! times a second. `ProgressReporter` collapses those calls into at most one
//! log line per interval, counted from the moment the download started.
//! A download that spans at least one interval also gets a final line once it
//! completes, so the last percentage logged is the final one.

use std::time::{Duration, Instant};
use tracing::info;

use super::downloader::DownloadProgress;

/// Interval between two progress lines.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Emits `Download progress: NN%` at most once per interval.
#[derive(Debug)]
pub struct ProgressReporter {
    started_at: Instant,
    interval: Duration,
    last_shown_interval: u128,
    last_percent: Option<u64>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(REPORT_INTERVAL)
    }
}

impl ProgressReporter {
    /// Creates a reporter whose clock starts now.
    pub fn new(interval: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            interval,
            last_shown_interval: 0,
            last_percent: None,
        }
    }

    /// Decides whether a progress line is due.
    ///
    /// Returns the integer percentage to report, or `None` when the current
    /// interval was already reported or the total size is unknown. An
    /// interval is consumed even when nothing is reported for it.
    pub fn observe(
        &mut self,
        elapsed: Duration,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    ) -> Option<u64> {
        let current_interval = elapsed.as_nanos() / self.interval.as_nanos().max(1);
        if current_interval <= self.last_shown_interval {
            return None;
        }
        self.last_shown_interval = current_interval;

        let percent = total_bytes
            .filter(|total| *total > 0)
            .map(|total| percent_of(bytes_downloaded, total))?;
        self.last_percent = Some(percent);
        Some(percent)
    }

    /// Decides whether a completion line is due once the download finished.
    ///
    /// Downloads shorter than one interval stay silent. Otherwise the final
    /// percentage is reported unless it was the last one already logged.
    pub fn observe_completion(
        &mut self,
        elapsed: Duration,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    ) -> Option<u64> {
        if elapsed < self.interval {
            return None;
        }
        let percent = total_bytes
            .filter(|total| *total > 0)
            .map(|total| percent_of(bytes_downloaded, total))?;
        if self.last_percent == Some(percent) {
            return None;
        }
        let current_interval = elapsed.as_nanos() / self.interval.as_nanos().max(1);
        self.last_shown_interval = self.last_shown_interval.max(current_interval);
        self.last_percent = Some(percent);
        Some(percent)
    }

    /// Last percentage reported, if any.
    pub fn last_reported(&self) -> Option<u64> {
        self.last_percent
    }

    /// Feeds one callback invocation and logs when a line is due.
    pub fn report(&mut self, progress: &DownloadProgress) {
        let elapsed = self.started_at.elapsed();
        if let Some(percent) =
            self.observe(elapsed, progress.bytes_downloaded, progress.total_bytes)
        {
            info!("Download progress: {:>3}%", percent);
        }
    }

    /// Logs the completion line for the final state of a download.
    pub fn complete(&mut self, progress: &DownloadProgress) {
        let elapsed = self.started_at.elapsed();
        if let Some(percent) =
            self.observe_completion(elapsed, progress.bytes_downloaded, progress.total_bytes)
        {
            info!("Download progress: {:>3}%", percent);
        }
    }
}

/// `floor(100 * part / total)` without overflow. `total` must be non-zero.
fn percent_of(part: u64, total: u64) -> u64 {
    let percent = u128::from(part) * 100 / u128::from(total);
    u64::try_from(percent).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_nothing_reported_in_first_interval() {
        let mut reporter = ProgressReporter::default();
        for i in 0..50 {
            let elapsed = secs(i as f64 * 0.1);
            assert_eq!(reporter.observe(elapsed, i * 10, Some(1000)), None);
        }
    }

    #[test]
    fn test_first_boundary_triggers_report() {
        let mut reporter = ProgressReporter::default();
        assert_eq!(reporter.observe(secs(4.9), 10, Some(100)), None);
        assert_eq!(reporter.observe(secs(5.0), 25, Some(100)), Some(25));
    }

    #[test]
    fn test_at_most_one_line_per_window() {
        let mut reporter = ProgressReporter::default();
        let mut lines = Vec::new();
        // Callback fired every 10ms for 23 seconds
        for tick in 0..2300u64 {
            let elapsed = Duration::from_millis(tick * 10);
            if let Some(p) = reporter.observe(elapsed, tick, Some(2300)) {
                lines.push((elapsed.as_secs() / 5, p));
            }
        }
        let windows: Vec<u64> = lines.iter().map(|(w, _)| *w).collect();
        assert_eq!(windows, vec![1, 2, 3, 4]);
        assert_eq!(lines[0].1, 21);
    }

    #[test]
    fn test_percent_is_floored() {
        let mut reporter = ProgressReporter::default();
        assert_eq!(reporter.observe(secs(5.0), 1, Some(3)), Some(33));
        assert_eq!(reporter.observe(secs(10.0), 2, Some(3)), Some(66));
        assert_eq!(reporter.observe(secs(15.0), 3, Some(3)), Some(100));
    }

    #[test]
    fn test_unknown_total_never_reports() {
        let mut reporter = ProgressReporter::default();
        for s in 0..100 {
            assert_eq!(reporter.observe(secs(s as f64), 500, None), None);
            assert_eq!(reporter.observe(secs(s as f64), 500, Some(0)), None);
        }
    }

    #[test]
    fn test_skipped_windows_collapse_into_one_line() {
        let mut reporter = ProgressReporter::default();
        // Stalled for 20 seconds, then one callback
        assert_eq!(reporter.observe(secs(21.0), 50, Some(100)), Some(50));
        assert_eq!(reporter.observe(secs(22.0), 60, Some(100)), None);
        assert_eq!(reporter.observe(secs(25.0), 70, Some(100)), Some(70));
    }

    #[test]
    fn test_completion_reports_final_percentage() {
        const TOTAL: u64 = 100 * 1024 * 1024;
        let mut reporter = ProgressReporter::default();
        let mut lines = Vec::new();
        // 100MB over 7 seconds, one callback every 10ms
        for tick in 1..=700u64 {
            let bytes = TOTAL * tick / 700;
            if let Some(p) = reporter.observe(Duration::from_millis(tick * 10), bytes, Some(TOTAL)) {
                lines.push(p);
            }
        }
        if let Some(p) = reporter.observe_completion(secs(7.0), TOTAL, Some(TOTAL)) {
            lines.push(p);
        }
        assert_eq!(lines, vec![71, 100]);
        assert_eq!(reporter.last_reported(), Some(100));
    }

    #[test]
    fn test_completion_not_repeated() {
        let mut reporter = ProgressReporter::default();
        assert_eq!(reporter.observe(secs(10.0), 100, Some(100)), Some(100));
        assert_eq!(reporter.observe_completion(secs(10.5), 100, Some(100)), None);
    }

    #[test]
    fn test_completion_silent_for_short_or_unknown_downloads() {
        let mut reporter = ProgressReporter::default();
        assert_eq!(reporter.observe_completion(secs(4.9), 100, Some(100)), None);
        assert_eq!(reporter.observe_completion(secs(9.0), 100, None), None);
        assert_eq!(reporter.observe_completion(secs(9.0), 100, Some(0)), None);
        assert_eq!(reporter.last_reported(), None);
    }

    #[test]
    fn test_large_sizes_do_not_overflow() {
        assert_eq!(percent_of(u64::MAX, u64::MAX), 100);
        assert_eq!(percent_of(u64::MAX / 2, u64::MAX), 49);
    }
}
