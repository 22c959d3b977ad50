use serde_derive::{Deserialize, Serialize};

/// Where the two gates sit, as fractions of the frame height, and how wide
/// their proximity bands are.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ZoneConfig {
    pub entry_ratio: f64,
    pub count_ratio: f64,
    /// Half-width of the band around each line, in px
    pub offset: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            entry_ratio: 0.65,
            count_ratio: 0.15,
            offset: 25.0,
        }
    }
}

/// Entry row and count row in frame pixel space. Fixed for the session once
/// the first frame height is known.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub entry_y: f32,
    pub count_y: f32,
    pub offset: f32,
}

impl Zone {
    pub fn from_height(height: u32, config: &ZoneConfig) -> Self {
        let h = height as f64;

        Self {
            entry_y: (h * config.entry_ratio).round_ties_even() as f32,
            count_y: (h * config.count_ratio).round_ties_even() as f32,
            offset: config.offset,
        }
    }

    #[inline]
    pub fn in_entry_band(&self, y: f32) -> bool {
        (y - self.entry_y).abs() < self.offset
    }

    #[inline]
    pub fn in_count_band(&self, y: f32) -> bool {
        (y - self.count_y).abs() < self.offset
    }

    /// Lowest start row that still counts as having started at the entry zone.
    #[inline]
    pub fn entry_gate(&self) -> f32 {
        self.entry_y - 2.0 * self.offset
    }

    #[inline]
    pub fn started_near_entry(&self, start_y: f32) -> bool {
        start_y >= self.entry_gate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_from_480() {
        let zone = Zone::from_height(480, &ZoneConfig::default());

        assert_eq!(zone.entry_y, 312.0);
        assert_eq!(zone.count_y, 72.0);
        assert_eq!(zone.offset, 25.0);
        assert_eq!(zone.entry_gate(), 262.0);
    }

    #[test]
    fn test_zone_from_720() {
        let zone = Zone::from_height(720, &ZoneConfig::default());

        assert_eq!(zone.entry_y, 468.0);
        assert_eq!(zone.count_y, 108.0);
    }

    #[test]
    fn test_half_rows_round_to_even() {
        let zone = Zone::from_height(450, &ZoneConfig::default());
        assert_eq!(zone.entry_y, 292.0);
        assert_eq!(zone.count_y, 68.0);

        let zone = Zone::from_height(270, &ZoneConfig::default());
        assert_eq!(zone.entry_y, 176.0);
        assert_eq!(zone.count_y, 40.0);
    }

    #[test]
    fn test_bands_are_open_intervals() {
        let zone = Zone::from_height(480, &ZoneConfig::default());

        assert!(zone.in_count_band(72.0));
        assert!(zone.in_count_band(96.9));
        assert!(!zone.in_count_band(97.0));
        assert!(!zone.in_count_band(47.0));

        assert!(zone.in_entry_band(310.0));
        assert!(!zone.in_entry_band(287.0));
    }

    #[test]
    fn test_started_near_entry() {
        let zone = Zone::from_height(480, &ZoneConfig::default());

        assert!(zone.started_near_entry(262.0));
        assert!(zone.started_near_entry(470.0));
        assert!(!zone.started_near_entry(200.0));
    }
}
