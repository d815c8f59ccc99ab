use rand::Rng;
use std::time::Duration;

/// Sleeps for `base` plus up to `jitter` of random extra time.
pub fn pause(base: Duration, jitter: Duration) {
    let extra = match jitter.as_millis() as u64 {
        0 => 0,
        max => rand::rng().random_range(0..=max),
    };
    let total = base + Duration::from_millis(extra);
    if !total.is_zero() {
        std::thread::sleep(total);
    }
}
