//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Bucket names for each object kind.
#[derive(Debug, Clone)]
pub struct BucketConfig {
    pub videos: String,
    pub segments: String,
    pub frames: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            videos: "videos".to_string(),
            segments: "segments".to_string(),
            frames: "frames".to_string(),
        }
    }
}

impl BucketConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            videos: std::env::var("BUCKET_VIDEOS").unwrap_or(defaults.videos),
            segments: std::env::var("BUCKET_SEGMENTS").unwrap_or(defaults.segments),
            frames: std::env::var("BUCKET_FRAMES").unwrap_or(defaults.frames),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of pipeline runs executing at once
    pub pool_size: usize,
    /// Target segment length; the last segment may be shorter
    pub segment_length_secs: u64,
    /// Spacing between extracted frames
    pub frame_interval_secs: u64,
    /// Grace period given to running pipelines on shutdown
    pub shutdown_timeout: Duration,
    /// Root for per-run scratch directories
    pub work_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub buckets: BucketConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            segment_length_secs: 300,
            frame_interval_secs: 10,
            shutdown_timeout: Duration::from_secs(60),
            work_dir: std::env::temp_dir().join("vup"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            buckets: BucketConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pool_size: std::env::var("WORKER_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pool_size),
            segment_length_secs: std::env::var("SEGMENT_LENGTH_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.segment_length_secs),
            frame_interval_secs: std::env::var("FRAME_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_interval_secs),
            shutdown_timeout: std::env::var("WORKER_SHUTDOWN_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_timeout),
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: std::env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            buckets: BucketConfig::from_env(),
        }
    }

    pub fn validate(&self) -> WorkerResult<()> {
        if self.pool_size == 0 {
            return Err(WorkerError::config_error("WORKER_POOL_SIZE must be at least 1"));
        }
        if self.segment_length_secs == 0 {
            return Err(WorkerError::config_error("SEGMENT_LENGTH_SECS must be at least 1"));
        }
        if self.frame_interval_secs == 0 {
            return Err(WorkerError::config_error("FRAME_INTERVAL_SECS must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.segment_length_secs, 300);
        assert_eq!(config.frame_interval_secs, 10);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = WorkerConfig {
            frame_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("WORKER_POOL_SIZE", "2");
        std::env::set_var("SEGMENT_LENGTH_SECS", "not-a-number");
        std::env::set_var("BUCKET_FRAMES", "thumbs");

        let config = WorkerConfig::from_env();
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.segment_length_secs, 300);
        assert_eq!(config.buckets.frames, "thumbs");
        assert_eq!(config.buckets.videos, "videos");

        std::env::remove_var("WORKER_POOL_SIZE");
        std::env::remove_var("SEGMENT_LENGTH_SECS");
        std::env::remove_var("BUCKET_FRAMES");
    }
}
