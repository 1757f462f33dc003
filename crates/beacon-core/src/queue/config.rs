//! Timing configuration for the scheduler.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::SupportKind;
use crate::error::ConfigError;

/// Raw, all-optional configuration (milliseconds).
///
/// Unset fields fall back to the defaults in [`QueueTiming::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueOptions {
    pub settle_delay_ms: Option<u64>,
    pub normal_duration_ms: Option<u64>,
    pub video_duration_ms: Option<u64>,
    pub ads_duration_ms: Option<u64>,
    pub notification_space_delay_ms: Option<u64>,
}

impl QueueOptions {
    pub const ENV_SETTLE_DELAY: &'static str = "BEACON_SETTLE_DELAY_MS";
    pub const ENV_NORMAL_DURATION: &'static str = "BEACON_NORMAL_DURATION_MS";
    pub const ENV_VIDEO_DURATION: &'static str = "BEACON_VIDEO_DURATION_MS";
    pub const ENV_ADS_DURATION: &'static str = "BEACON_ADS_DURATION_MS";
    pub const ENV_NOTIFICATION_SPACE_DELAY: &'static str = "BEACON_NOTIFICATION_SPACE_DELAY_MS";

    /// Read options from `BEACON_*_MS` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| -> Result<Option<u64>, ConfigError> {
            let Some(raw) = lookup(var) else {
                return Ok(None);
            };
            raw.trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    var: var.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })
        };

        Ok(Self {
            settle_delay_ms: read(Self::ENV_SETTLE_DELAY)?,
            normal_duration_ms: read(Self::ENV_NORMAL_DURATION)?,
            video_duration_ms: read(Self::ENV_VIDEO_DURATION)?,
            ads_duration_ms: read(Self::ENV_ADS_DURATION)?,
            notification_space_delay_ms: read(Self::ENV_NOTIFICATION_SPACE_DELAY)?,
        })
    }
}

/// Resolved timing used by every processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTiming {
    /// One-off grace period before a new processor's first delivery, so the
    /// request that triggered the enqueue can respond first.
    pub settle_delay: Duration,
    pub normal_duration: Duration,
    pub video_duration: Duration,
    pub ads_duration: Duration,
    /// Pause after a notification's display time, before the next one.
    pub notification_space_delay: Duration,
}

impl Default for QueueTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            normal_duration: Duration::from_secs(10),
            video_duration: Duration::from_secs(10),
            ads_duration: Duration::from_secs(30),
            notification_space_delay: Duration::from_secs(10),
        }
    }
}

impl QueueTiming {
    pub fn from_options(options: &QueueOptions) -> Self {
        let defaults = Self::default();
        let ms_or = |v: Option<u64>, d: Duration| v.map_or(d, Duration::from_millis);
        Self {
            settle_delay: ms_or(options.settle_delay_ms, defaults.settle_delay),
            normal_duration: ms_or(options.normal_duration_ms, defaults.normal_duration),
            video_duration: ms_or(options.video_duration_ms, defaults.video_duration),
            ads_duration: ms_or(options.ads_duration_ms, defaults.ads_duration),
            notification_space_delay: ms_or(
                options.notification_space_delay_ms,
                defaults.notification_space_delay,
            ),
        }
    }

    /// How long a notification of `kind` stays on screen.
    ///
    /// `Unknown` is shown for the normal duration.
    pub fn display_duration(&self, kind: SupportKind) -> Duration {
        match kind {
            SupportKind::Normal | SupportKind::Unknown => self.normal_duration,
            SupportKind::Video => self.video_duration,
            SupportKind::Ads => self.ads_duration,
        }
    }

    /// Minimum distance between the delivery of a `kind` notification and
    /// the next delivery to the same recipient.
    pub fn slot(&self, kind: SupportKind) -> Duration {
        self.display_duration(kind) + self.notification_space_delay
    }
}

impl From<QueueOptions> for QueueTiming {
    fn from(options: QueueOptions) -> Self {
        Self::from_options(&options)
    }
}
