//! Thread-blocking implementation of [`Delay`].

use std::time::Duration;

use rand::Rng;

use crate::traits::Delay;

/// Sleeps the calling thread for a random duration inside the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn sleep_range(&mut self, min: Duration, max: Duration) {
        std::thread::sleep(pick_duration(min, max));
    }
}

fn pick_duration(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let min_us = u64::try_from(min.as_micros()).unwrap_or(u64::MAX);
    let max_us = u64::try_from(max.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(rand::thread_rng().gen_range(min_us..=max_us))
}
