//! Deterministic replay of recorded hand frames

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{HandFrame, TrackingSource};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid recording: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk recording format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub name: Option<String>,
    /// Restart from the first frame once exhausted
    #[serde(default)]
    pub looped: bool,
    pub frames: Vec<HandFrame>,
}

/// Plays back a fixed frame sequence, one frame per poll.
///
/// Once exhausted (and not looping) it yields `None`, so the grabber holds its last
/// frame indefinitely.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: VecDeque<HandFrame>,
    looped: bool,
    played: Vec<HandFrame>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = HandFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            looped: false,
            played: Vec::new(),
        }
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn from_recording(recording: Recording) -> Self {
        Self::new(recording.frames).looped(recording.looped)
    }

    /// Accepts either a [`Recording`] object or a bare array of frames
    pub fn from_json_str(raw: &str) -> Result<Self, ReplayError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Recording(Recording),
            Frames(Vec<HandFrame>),
        }

        let source = match serde_json::from_str::<Raw>(raw)? {
            Raw::Recording(recording) => Self::from_recording(recording),
            Raw::Frames(frames) => Self::new(frames),
        };
        tracing::debug!("Loaded replay with {} frames", source.remaining());
        Ok(source)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty() && !(self.looped && !self.played.is_empty())
    }
}

impl TrackingSource for ReplaySource {
    fn poll(&mut self) -> Option<HandFrame> {
        if self.frames.is_empty() && self.looped && !self.played.is_empty() {
            self.frames = std::mem::take(&mut self.played).into();
        }
        let frame = self.frames.pop_front()?;
        if self.looped {
            self.played.push(frame.clone());
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbench_spatial::Point3D;
    use std::io::Write;

    #[test]
    fn test_replay_plays_in_order_then_stops() {
        let mut source = ReplaySource::new([
            HandFrame::default().with_pinch(0.1),
            HandFrame::default().with_pinch(0.9),
        ]);
        assert_eq!(source.poll().map(|f| f.pinch), Some(0.1));
        assert_eq!(source.poll().map(|f| f.pinch), Some(0.9));
        assert!(source.poll().is_none());
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_looped_replay_restarts() {
        let mut source = ReplaySource::new([
            HandFrame::default().with_grip(0.2),
            HandFrame::default().with_grip(1.0),
        ])
        .looped(true);
        let grips: Vec<f32> = (0..5).filter_map(|_| source.poll()).map(|f| f.grip).collect();
        assert_eq!(grips, vec![0.2, 1.0, 0.2, 1.0, 0.2]);
    }

    #[test]
    fn test_parse_bare_array_and_recording() {
        let bare = r#"[{"pose": {"position": [0.0, 1.0, 0.0]}, "pinch": 1.0}]"#;
        let mut source = ReplaySource::from_json_str(bare).unwrap();
        let frame = source.poll().unwrap();
        assert_eq!(frame.pose.position, Point3D::new(0.0, 1.0, 0.0));

        let wrapped = r#"{"name": "left", "frames": [{"grip": 1.0}, {"grip": 0.0}]}"#;
        let source = ReplaySource::from_json_str(wrapped).unwrap();
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"button": true}}]"#).unwrap();
        let mut source = ReplaySource::from_path(file.path()).unwrap();
        assert!(source.poll().unwrap().button);

        let missing = ReplaySource::from_path("/definitely/not/here.json");
        assert!(matches!(missing, Err(ReplayError::Io { .. })));
    }
}
