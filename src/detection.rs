use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb, Xywh};
use crate::error::{Error, InvalidReason};

/// One tracked object in one frame, as reported by the upstream tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    #[serde(rename = "id")]
    pub track_id: u32,
    pub bbox: BBox<Ltrb>,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: i32,

    // segmentation models also report the object outline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<[f32; 2]>>,
}

impl Detection {
    pub fn new(track_id: u32, bbox: BBox<Ltrb>, class: i32, confidence: f32) -> Self {
        Self {
            track_id,
            bbox,
            confidence,
            class,
            polygon: None,
        }
    }

    pub fn from_xywh(track_id: u32, bbox: BBox<Xywh>, class: i32, confidence: f32) -> Self {
        Self::new(track_id, bbox.as_ltrb(), class, confidence)
    }

    pub fn with_polygon(mut self, polygon: Vec<[f32; 2]>) -> Self {
        self.polygon = Some(polygon);
        self
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }

    pub fn polygon_points(&self) -> impl Iterator<Item = na::Point2<f32>> + '_ {
        self.polygon
            .iter()
            .flatten()
            .map(|&[x, y]| na::Point2::new(x, y))
    }

    /// Checks the record against a class table of `num_classes` names.
    pub fn validate(&self, num_classes: usize) -> Result<(), Error> {
        let reason = if self.class < 0 || self.class as usize >= num_classes {
            Some(InvalidReason::UnknownClass(self.class, num_classes))
        } else if self.bbox.is_degenerate() {
            Some(InvalidReason::DegenerateBox(self.bbox.into()))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidRecord {
                track_id: self.track_id,
                reason,
            }),
            None => Ok(()),
        }
    }
}
