use crate::errors::PresensiError;
use crate::runtime::Clock;
use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Hours of the day the program may be opened: `start_hour` inclusive,
/// `end_hour` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for AccessWindow {
    fn default() -> Self {
        Self {
            start_hour: 7,
            end_hour: 12,
        }
    }
}

impl AccessWindow {
    pub fn permits(&self, hour: u32) -> bool {
        (self.start_hour..self.end_hour).contains(&hour)
    }

    pub fn check(&self, clock: &dyn Clock) -> Result<(), PresensiError> {
        let hour = clock.now().hour();
        if self.permits(hour) {
            return Ok(());
        }
        Err(PresensiError::AccessRestricted(self.refusal_message()))
    }

    pub fn refusal_message(&self) -> String {
        format!(
            "Attendance is only available between {:02}:00 and {:02}:00.",
            self.start_hour, self.end_hour
        )
    }
}
