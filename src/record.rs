use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filename sentinel for album-level tracking of a multi-track audio item.
/// Records carrying it hold a 0-100 percentage in `current_time`/`duration`
/// instead of seconds; the true in-track position lives in the `track_*`
/// fields.
pub const ALBUM_FILENAME: &str = "__album__";

const COMPLETION_THRESHOLD: f64 = 0.95;
const RESUME_THRESHOLD_SECS: f64 = 10.0;

const VIDEO_MEDIA_TYPES: [&str; 2] = ["movies", "video"];
const AUDIO_MEDIA_TYPES: [&str; 2] = ["audio", "etree"];

/// Playback position for one (item, file) pair. Identity for equality and
/// dedup purposes is that pair alone; every other field is payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub item_identifier: String,
    pub filename: String,
    pub current_time: f64,
    pub duration: f64,
    pub last_watched: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_current_time: Option<f64>,
}

impl ProgressRecord {
    pub fn new(
        item_identifier: impl Into<String>,
        filename: impl Into<String>,
        current_time: f64,
        duration: f64,
    ) -> Self {
        Self {
            item_identifier: item_identifier.into(),
            filename: filename.into(),
            current_time,
            duration,
            last_watched: Utc::now(),
            title: None,
            media_type: None,
            image_url: None,
            track_index: None,
            track_filename: None,
            track_current_time: None,
        }
    }

    fn key(&self) -> (&str, &str) {
        (&self.item_identifier, &self.filename)
    }

    pub fn is_album_level(&self) -> bool {
        self.filename == ALBUM_FILENAME
    }

    /// Fraction watched, clamped to 0..=1. Zero when the duration is
    /// unknown or nonsensical.
    pub fn progress_fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.current_time / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress_fraction() >= COMPLETION_THRESHOLD
    }

    pub fn time_remaining(&self) -> f64 {
        (self.duration - self.current_time).max(0.0)
    }

    /// Whether there is enough progress to offer a resume prompt.
    ///
    /// Album-level records prefer the in-track position. Records written
    /// before track positions were stored fall back to comparing the raw
    /// album percentage against the same 10-second threshold; kept
    /// as-observed rather than reinterpreted.
    pub fn has_resumable_progress(&self) -> bool {
        if self.is_album_level() {
            return match self.track_current_time {
                Some(track_time) => track_time >= RESUME_THRESHOLD_SECS,
                None => self.current_time >= RESUME_THRESHOLD_SECS,
            };
        }
        self.current_time >= RESUME_THRESHOLD_SECS
    }

    pub fn is_valid(&self) -> bool {
        !self.item_identifier.is_empty()
            && !self.filename.is_empty()
            && self.current_time >= 0.0
            && self.duration >= 0.0
    }

    pub fn is_video(&self) -> bool {
        self.media_type_matches(&VIDEO_MEDIA_TYPES)
    }

    pub fn is_audio(&self) -> bool {
        self.media_type_matches(&AUDIO_MEDIA_TYPES)
    }

    fn media_type_matches(&self, kinds: &[&str]) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|media_type| kinds.iter().any(|kind| media_type.eq_ignore_ascii_case(kind)))
    }
}

impl PartialEq for ProgressRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ProgressRecord {}

impl Hash for ProgressRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
