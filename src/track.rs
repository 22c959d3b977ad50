use std::collections::HashMap;

use crate::zone::Zone;

/// Crossing/counting state of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    /// Latched once the track is seen starting from, or passing, the entry zone
    pub valid_entry: bool,
    /// Latched once the track has been counted
    pub counted: bool,
    pub frame_count: u32,
    pub start_center_y: f32,
    pub center_y: f32,
    pub prev_center_y: Option<f32>,
    pub last_seen: u64,
}

impl TrackState {
    pub fn new(center_y: f32, frame: u64) -> Self {
        Self {
            valid_entry: false,
            counted: false,
            frame_count: 0,
            start_center_y: center_y,
            center_y,
            prev_center_y: None,
            last_seen: frame,
        }
    }

    pub fn advance(&mut self, zone: &Zone, center_y: f32, frame: u64) {
        if self.frame_count > 0 {
            self.prev_center_y = Some(self.center_y);
        }

        self.frame_count += 1;
        self.center_y = center_y;
        self.last_seen = frame;

        if !self.valid_entry
            && (zone.started_near_entry(self.start_center_y) || zone.in_entry_band(center_y))
        {
            self.valid_entry = true;
        }
    }

    /// Whether the center changed sides of `line_y` since the previous observation.
    #[inline]
    pub fn crossed(&self, line_y: f32) -> bool {
        match self.prev_center_y {
            Some(prev) => (prev > line_y) != (self.center_y > line_y),
            None => false,
        }
    }

    #[inline]
    pub fn idle_for(&self, frame: u64) -> u64 {
        frame.saturating_sub(self.last_seen)
    }
}

#[derive(Debug, Default, Clone)]
pub struct TrackStore {
    tracks: HashMap<u32, TrackState>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, track_id: u32, center_y: f32, frame: u64) -> &mut TrackState {
        self.tracks
            .entry(track_id)
            .or_insert_with(|| TrackState::new(center_y, frame))
    }

    #[inline]
    pub fn get(&self, track_id: u32) -> Option<&TrackState> {
        self.tracks.get(&track_id)
    }

    #[inline]
    pub fn contains(&self, track_id: u32) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Drops tracks not seen for more than `max_idle` frames, returning their ids.
    pub fn evict_idle(&mut self, frame: u64, max_idle: u64) -> Vec<u32> {
        let mut evicted = Vec::new();

        self.tracks.retain(|&id, t| {
            if t.idle_for(frame) > max_idle {
                evicted.push(id);
                return false;
            }

            true
        });

        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.tracks.clear()
    }
}
