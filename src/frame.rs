use serde_derive::{Deserialize, Serialize};

use crate::detection::Detection;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Frame {
    // (width, height) in px
    pub dims: (u32, u32),
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub timestamp: f32, // in seconds
}

impl Frame {
    pub fn new(dims: (u32, u32), timestamp: f32, detections: Vec<Detection>) -> Self {
        Self {
            dims,
            detections,
            timestamp,
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dims.1
    }

    /// Drops detections below `min_confidence`.
    pub fn retain_confident(&mut self, min_confidence: f32) {
        self.detections.retain(|d| d.confidence >= min_confidence);
    }
}
