//! Progress tracking for transfers

use std::time::{Duration, Instant};

/// Progress information for one transfer.
///
/// Throughput and ETA are computed over the bytes moved in this session
/// only, so a resumed download does not inherit phantom speed from the
/// bytes that were already on disk.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    /// Total size of the file in bytes (0 when unknown)
    pub total_size: u64,
    /// Cumulative bytes on disk, including any resumed prefix
    pub transferred: u64,
    /// Offset the session started from
    pub resumed_from: u64,
    /// Progress as a percentage (0.0 to 100.0)
    pub percent: f64,
    /// Current throughput in bytes per second
    pub speed: Option<f64>,
    /// Estimated time remaining
    pub eta: Option<Duration>,
    /// Time when this session started
    pub start_time: Instant,
}

impl TransferProgress {
    /// Create a new progress tracker
    pub fn new(total_size: u64, resumed_from: u64) -> Self {
        Self {
            total_size,
            transferred: resumed_from,
            resumed_from,
            percent: 0.0,
            speed: None,
            eta: None,
            start_time: Instant::now(),
        }
    }

    /// Update with the new cumulative byte count
    pub fn update(&mut self, transferred: u64) {
        self.transferred = transferred;
        self.percent = if self.total_size > 0 {
            (transferred as f64 / self.total_size as f64) * 100.0
        } else {
            0.0
        };

        let elapsed = self.start_time.elapsed();
        if elapsed.as_millis() > 0 {
            let session_bytes = transferred.saturating_sub(self.resumed_from);
            let speed = session_bytes as f64 / elapsed.as_secs_f64();
            self.speed = Some(speed);

            if speed > 0.0 && self.total_size > transferred {
                let remaining = self.total_size - transferred;
                self.eta = Some(Duration::from_secs((remaining as f64 / speed) as u64));
            }
        }
    }

    /// Check if the transfer is complete
    pub fn is_complete(&self) -> bool {
        self.total_size > 0 && self.transferred >= self.total_size
    }

    /// Get human-readable speed string
    pub fn speed_string(&self) -> String {
        if let Some(speed) = self.speed {
            format_bytes_per_second(speed)
        } else {
            "Unknown".to_string()
        }
    }

    /// Get human-readable ETA string
    pub fn eta_string(&self) -> String {
        if let Some(eta) = self.eta {
            format_duration(eta)
        } else {
            "Unknown".to_string()
        }
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f64 = bytes as f64;
    let exp = (bytes_f64.ln() / THRESHOLD.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f64 / THRESHOLD.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.1} {}", value, UNITS[exp])
    }
}

/// Format bytes per second as human-readable string
pub fn format_bytes_per_second(bytes_per_second: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_second as u64))
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_progress_creation() {
        let progress = TransferProgress::new(1000, 0);
        assert_eq!(progress.total_size, 1000);
        assert_eq!(progress.transferred, 0);
        assert_eq!(progress.percent, 0.0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_progress_update() {
        let mut progress = TransferProgress::new(1000, 0);

        progress.update(500);
        assert_eq!(progress.transferred, 500);
        assert_eq!(progress.percent, 50.0);
        assert!(!progress.is_complete());

        progress.update(1000);
        assert_eq!(progress.transferred, 1000);
        assert_eq!(progress.percent, 100.0);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_resumed_offset_counts_toward_percent() {
        let mut progress = TransferProgress::new(1000, 400);
        assert_eq!(progress.transferred, 400);

        progress.update(700);
        assert_eq!(progress.percent, 70.0);
    }

    #[test]
    fn test_progress_speed_excludes_resumed_prefix() {
        let mut progress = TransferProgress::new(10_000, 5000);

        thread::sleep(Duration::from_millis(100));
        progress.update(5100);

        // Only the 100 session bytes count, not the 5000 resumed ones.
        let speed = progress.speed.unwrap();
        assert!(speed > 0.0);
        assert!(speed < 5000.0 / 0.1);
    }

    #[test]
    fn test_progress_unknown_total() {
        let mut progress = TransferProgress::new(0, 0);
        progress.update(1234);
        assert_eq!(progress.percent, 0.0);
        assert!(progress.eta.is_none());
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(1073741824), "1.0 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(format_duration(Duration::from_secs(3660)), "1h 1m");
    }
}
