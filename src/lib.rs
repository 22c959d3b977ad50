pub mod bbox;
pub mod class_lock;
pub mod config;
pub mod counter;
pub mod detection;
pub mod error;
pub mod frame;
pub mod report;
pub mod scene;
pub mod shared;
pub mod track;
pub mod zone;

pub use config::{CountingConfig, Trigger};
pub use detection::Detection;
pub use error::Error;
pub use frame::Frame;
pub use report::{CountEvent, FrameReport, ObjectState, VisualTag};
pub use shared::SharedCounter;
pub use zone::Zone;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

pub trait Counting {
    fn update(&mut self, frame: &Frame) -> Result<FrameReport, Error>;
    fn counts(&self) -> BTreeMap<String, u64>;
    fn reset(&mut self);
}

/// Per-class production counter over a tracked detection stream.
///
/// The zone is derived from the first frame's height and kept for the whole
/// session, resets included.
pub struct LineCounter {
    config: CountingConfig,
    class_names: Arc<[String]>,
    scene: Option<scene::Scene>,
    frame_index: u64,
    started_at: Option<f32>,
    last_timestamp: f32,
}

impl LineCounter {
    pub fn new<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(class_names, CountingConfig::default())
    }

    pub fn with_config<I, S>(class_names: I, config: CountingConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config,
            class_names: class_names.into_iter().map(Into::into).collect(),
            scene: None,
            frame_index: 0,
            started_at: None,
            last_timestamp: 0.0,
        }
    }

    #[inline]
    pub fn config(&self) -> &CountingConfig {
        &self.config
    }

    #[inline]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn zone(&self) -> Result<&Zone, Error> {
        self.scene
            .as_ref()
            .map(|s| &s.zone)
            .ok_or(Error::ConfigurationMissing)
    }

    #[inline]
    pub fn scene(&self) -> Option<&scene::Scene> {
        self.scene.as_ref()
    }

    /// Frames processed since the session started.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    /// Seconds covered by the frames seen since the last reset.
    pub fn elapsed(&self) -> f32 {
        match self.started_at {
            Some(start) => (self.last_timestamp - start).max(0.0),
            None => 0.0,
        }
    }
}

impl crate::Counting for LineCounter {
    fn update(&mut self, frame: &Frame) -> Result<FrameReport, Error> {
        if self.scene.is_none() {
            let height = frame.height();
            if height == 0 {
                return Err(Error::ConfigurationMissing);
            }

            let zone = Zone::from_height(height, &self.config.zone);
            info!(
                height,
                entry_y = zone.entry_y,
                count_y = zone.count_y,
                offset = zone.offset,
                "zone configured"
            );

            self.scene = Some(scene::Scene::new(zone, self.config.trigger));
        }

        let scene = self.scene.as_mut().ok_or(Error::ConfigurationMissing)?;

        let ts = frame.timestamp;
        if self.started_at.is_none() {
            self.started_at = Some(ts);
        }
        self.last_timestamp = ts;

        let mut report = FrameReport::new(self.frame_index, ts);
        scene.update(&frame.detections, &self.class_names, &mut report);

        if let Some(max_idle) = self.config.max_idle_frames {
            scene.evict_idle(self.frame_index, max_idle);
        }

        report.counts = scene.counts();
        self.frame_index += 1;

        Ok(report)
    }

    fn counts(&self) -> BTreeMap<String, u64> {
        self.scene.as_ref().map(|s| s.counts()).unwrap_or_default()
    }

    fn reset(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.reset();
        }

        self.started_at = None;
        info!("counts reset");
    }
}
