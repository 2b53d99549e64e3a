use std::time::Duration;

/// Time source used by every polling loop and settle delay in the crate.
///
/// The production implementation really sleeps; tests inject a recording
/// fake so waits are deterministic and instantaneous.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Polls `probe` until it returns true or `timeout` elapses.
///
/// Elapsed time is accumulated from the retry interval rather than read from
/// a wall clock, so a fake [`Clock`] steps the loop deterministically. Waits
/// are always bounded; there is no cancellation beyond the timeout.
pub fn poll_until(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut probe: impl FnMut() -> bool,
) -> bool {
    if interval.is_zero() {
        // A zero interval would spin forever; degrade to a single probe.
        return probe();
    }
    let mut elapsed = Duration::ZERO;
    loop {
        if probe() {
            return true;
        }
        if elapsed >= timeout {
            return false;
        }
        clock.sleep(interval);
        elapsed += interval;
    }
}
