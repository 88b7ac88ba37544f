use std::time::Duration;

pub const SECOND: u64 = 1000;

pub const TIMEOUT: Duration = Duration::from_millis(3 * SECOND);
pub const DEBOUNCE_TIME: Duration = Duration::from_millis(500);
