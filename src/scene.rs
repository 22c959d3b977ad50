use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::class_lock::ClassLocks;
use crate::config::Trigger;
use crate::counter::ClassCounters;
use crate::error::{Error, InvalidReason};
use crate::report::{CountEvent, FrameReport, ObjectState, VisualTag};
use crate::track::{TrackState, TrackStore};
use crate::zone::Zone;
use crate::Detection;

/// Zone geometry plus the three per-session stores. Processes one batch of
/// detections at a time.
#[derive(Debug, Clone)]
pub struct Scene {
    pub zone: Zone,
    trigger: Trigger,
    locks: ClassLocks,
    tracks: TrackStore,
    counters: ClassCounters,
}

impl Scene {
    pub fn new(zone: Zone, trigger: Trigger) -> Self {
        Self {
            zone,
            trigger,
            locks: ClassLocks::new(),
            tracks: TrackStore::new(),
            counters: ClassCounters::new(),
        }
    }

    /// Runs every detection of one frame through lock, track and count.
    /// Invalid records land in `report.rejected`; the rest of the batch is
    /// still processed.
    pub fn update(
        &mut self,
        detections: &[Detection],
        class_names: &[String],
        report: &mut FrameReport,
    ) {
        for det in detections {
            match self.observe(report.frame, report.timestamp, det, class_names) {
                Ok((object, event)) => {
                    report.objects.push(object);
                    report.events.extend(event);
                }
                Err(err) => {
                    warn!(track_id = det.track_id, "record skipped: {}", err);
                    report.rejected.push(err);
                }
            }
        }
    }

    fn observe(
        &mut self,
        frame: u64,
        timestamp: f32,
        det: &Detection,
        class_names: &[String],
    ) -> Result<(ObjectState, Option<CountEvent>), Error> {
        det.validate(class_names.len())?;

        let track_id = det.track_id;
        let center = det.center();

        let lock = self.locks.resolve(track_id, det.class);
        let class_name = class_names
            .get(lock.class() as usize)
            .ok_or_else(|| Error::InvalidRecord {
                track_id,
                reason: InvalidReason::UnknownClass(lock.class(), class_names.len()),
            })?;

        if !self.tracks.contains(track_id) {
            debug!(track_id, class = %class_name, y = center.y, "new track");
        }

        let zone = self.zone;
        let state = self.tracks.get_or_create(track_id, center.y, frame);
        state.advance(&zone, center.y, frame);

        let triggered = match self.trigger {
            Trigger::Band => zone.in_count_band(center.y),
            Trigger::Crossing => state.crossed(zone.count_y),
        };

        let mut event = None;
        if triggered && state.valid_entry && !state.counted {
            state.counted = true;

            let total = self.counters.increment(class_name);
            info!(track_id, class = %class_name, total, "object counted");

            event = Some(CountEvent {
                track_id,
                class_name: class_name.clone(),
                total,
                frame,
                timestamp,
            });
        }

        let tag = if state.counted {
            VisualTag::Confirmed
        } else if lock.is_new() {
            VisualTag::New
        } else {
            VisualTag::Locked
        };

        let object = ObjectState {
            track_id,
            tag,
            class_name: class_name.clone(),
            bbox: det.bbox,
            confidence: det.confidence,
            polygon: det.polygon.clone(),
        };

        Ok((object, event))
    }

    /// Forgets tracks idle for more than `max_idle` frames, along with their
    /// class locks. Totals are kept.
    pub fn evict_idle(&mut self, frame: u64, max_idle: u64) -> usize {
        let evicted = self.tracks.evict_idle(frame, max_idle);
        for &track_id in &evicted {
            self.locks.remove(track_id);
            debug!(track_id, "track evicted");
        }

        evicted.len()
    }

    pub fn reset(&mut self) {
        self.locks.clear();
        self.tracks.clear();
        self.counters.clear();
    }

    #[inline]
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counters.snapshot()
    }

    #[inline]
    pub fn counters(&self) -> &ClassCounters {
        &self.counters
    }

    #[inline]
    pub fn track(&self, track_id: u32) -> Option<&TrackState> {
        self.tracks.get(track_id)
    }

    #[inline]
    pub fn locked_class(&self, track_id: u32) -> Option<i32> {
        self.locks.get(track_id)
    }

    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::zone::ZoneConfig;

    fn names() -> Vec<String> {
        vec!["bolt".to_string(), "nut".to_string()]
    }

    fn det(track_id: u32, cy: f32, class: i32) -> Detection {
        Detection::new(track_id, BBox::ltrb(10.0, cy - 10.0, 30.0, cy + 10.0), class, 0.9)
    }

    fn step(scene: &mut Scene, frame: u64, dets: &[Detection]) -> FrameReport {
        let mut report = FrameReport::new(frame, frame as f32 * 0.04);
        scene.update(dets, &names(), &mut report);
        report
    }

    fn scene() -> Scene {
        Scene::new(Zone::from_height(480, &ZoneConfig::default()), Trigger::Band)
    }

    #[test]
    fn test_tags_progress() {
        let mut scene = scene();

        let r = step(&mut scene, 0, &[det(1, 310.0, 0)]);
        assert_eq!(r.objects[0].tag, VisualTag::New);

        let r = step(&mut scene, 1, &[det(1, 200.0, 0)]);
        assert_eq!(r.objects[0].tag, VisualTag::Locked);

        let r = step(&mut scene, 2, &[det(1, 80.0, 0)]);
        assert_eq!(r.objects[0].tag, VisualTag::Confirmed);
        assert_eq!(r.events.len(), 1);
        assert_eq!(r.events[0].frame, 2);

        let r = step(&mut scene, 3, &[det(1, 40.0, 0)]);
        assert_eq!(r.objects[0].tag, VisualTag::Confirmed);
        assert!(r.events.is_empty());
    }

    #[test]
    fn test_spawned_in_count_band_not_counted() {
        let mut scene = scene();

        for frame in 0..5 {
            let r = step(&mut scene, frame, &[det(1, 72.0, 0)]);
            assert!(r.events.is_empty());
        }

        assert_eq!(scene.track(1).map(|t| t.valid_entry), Some(false));
        assert_eq!(scene.counters().total(), 0);
    }

    #[test]
    fn test_counted_on_first_sighting_when_bands_overlap() {
        let config = ZoneConfig {
            entry_ratio: 0.5,
            count_ratio: 0.45,
            offset: 25.0,
        };
        let mut scene = Scene::new(Zone::from_height(480, &config), Trigger::Band);

        // entry_y = 240, count_y = 216: a first sighting at 220 sits in both bands
        let r = step(&mut scene, 0, &[det(1, 220.0, 1)]);

        assert_eq!(r.events.len(), 1);
        assert_eq!(r.events[0].class_name, "nut");
        assert_eq!(r.objects[0].tag, VisualTag::Confirmed);
    }

    #[test]
    fn test_rejected_record_leaves_no_state() {
        let mut scene = scene();

        let r = step(&mut scene, 0, &[det(1, 310.0, 5)]);
        assert_eq!(r.rejected.len(), 1);
        assert!(r.objects.is_empty());
        assert!(scene.track(1).is_none());
        assert_eq!(scene.locked_class(1), None);
    }

    #[test]
    fn test_evict_idle_drops_locks() {
        let mut scene = scene();
        step(&mut scene, 0, &[det(1, 310.0, 0), det(2, 310.0, 1)]);
        step(&mut scene, 4, &[det(2, 300.0, 1)]);

        assert_eq!(scene.evict_idle(4, 2), 1);
        assert!(scene.track(1).is_none());
        assert_eq!(scene.locked_class(1), None);
        assert_eq!(scene.locked_class(2), Some(1));
    }
}
