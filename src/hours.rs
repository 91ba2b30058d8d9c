//! Daily operational window for the portal form.

use anyhow::{ensure, Result};

/// Hours of day (local time) during which logins are accepted.
///
/// A static comparison on the wall-clock hour: `start` inclusive, `end`
/// exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationalHours {
    start: u8,
    end: u8,
}

impl Default for OperationalHours {
    fn default() -> Self {
        Self { start: 7, end: 18 }
    }
}

impl OperationalHours {
    /// # Errors
    /// Returns an error unless `start < end <= 24`.
    pub fn new(start: u8, end: u8) -> Result<Self> {
        ensure!(end <= 24, "End hour must be at most 24, got {end}");
        ensure!(
            start < end,
            "Start hour must be before end hour, got {start}..{end}"
        );
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn allows(self, hour: u8) -> bool {
        hour >= self.start && hour < self.end
    }

    #[must_use]
    pub fn denial_message(self) -> String {
        format!(
            "System available {:02}:00 - {:02}:00",
            self.start, self.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_seven_to_eighteen() {
        let hours = OperationalHours::default();
        assert!(!hours.allows(6));
        assert!(hours.allows(7));
        assert!(hours.allows(17));
        assert!(!hours.allows(18));
        assert!(!hours.allows(23));
    }

    #[test]
    fn denial_message_is_zero_padded() {
        let hours = OperationalHours::new(7, 18).unwrap();
        assert_eq!(hours.denial_message(), "System available 07:00 - 18:00");
    }

    #[test]
    fn rejects_inverted_or_out_of_range_windows() {
        assert!(OperationalHours::new(18, 7).is_err());
        assert!(OperationalHours::new(7, 25).is_err());
        assert!(OperationalHours::new(7, 7).is_err());
    }

    #[test]
    fn full_day_window_allows_everything() {
        let hours = OperationalHours::new(0, 24).unwrap();
        for hour in 0..24 {
            assert!(hours.allows(hour));
        }
    }
}
