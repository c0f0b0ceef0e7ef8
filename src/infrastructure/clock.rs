use chrono::{DateTime, Utc};

use crate::domain::traits::Clock;

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
