use serde_derive::Serialize;
use std::collections::BTreeMap;

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;

/// How the renderer should draw an object this frame.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisualTag {
    /// Class locked on this very frame
    New,
    /// Class locked on an earlier frame, not counted yet
    Locked,
    /// Already counted
    Confirmed,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ObjectState {
    pub track_id: u32,
    pub tag: VisualTag,
    pub class_name: String,
    pub bbox: BBox<Ltrb>,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<[f32; 2]>>,
}

/// Marks the frame at which a track's counted latch was set.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CountEvent {
    pub track_id: u32,
    pub class_name: String,
    pub total: u64,
    pub frame: u64,
    pub timestamp: f32,
}

#[derive(Serialize, Debug, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub timestamp: f32,
    pub objects: Vec<ObjectState>,
    pub events: Vec<CountEvent>,
    pub counts: BTreeMap<String, u64>,

    // records skipped this frame, one `Error::InvalidRecord` each
    #[serde(skip)]
    pub rejected: Vec<Error>,
}

impl FrameReport {
    pub fn new(frame: u64, timestamp: f32) -> Self {
        Self {
            frame,
            timestamp,
            ..Default::default()
        }
    }

    #[inline]
    pub fn object(&self, track_id: u32) -> Option<&ObjectState> {
        self.objects.iter().find(|o| o.track_id == track_id)
    }

    #[inline]
    pub fn count(&self, class_name: &str) -> u64 {
        self.counts.get(class_name).copied().unwrap_or(0)
    }
}
