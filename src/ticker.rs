use std::time::Duration;

use bevy::time::{Timer, TimerMode};

use crate::prelude::MIN_TIMER_INTERVAL_MS;

/// The one repeating timer that drives continuous ticking. Arming always
/// replaces the previous timer, so two timers can never run at once.
#[derive(Debug, Default)]
pub struct Ticker {
    timer: Option<Timer>,
}

impl Ticker {
    /// Arms a fresh timer firing every `interval_ms`, dropping any earlier one.
    pub fn arm(&mut self, interval_ms: u64) {
        let period = Duration::from_millis(interval_ms.max(MIN_TIMER_INTERVAL_MS));
        self.timer = Some(Timer::new(period, TimerMode::Repeating));
    }

    pub fn disarm(&mut self) {
        self.timer = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.timer.as_ref().map(Timer::duration)
    }

    /// Advances the timer by `delta`. Returns true when a tick is due; however
    /// much time passed, at most one tick is reported per call.
    pub fn poll(&mut self, delta: Duration) -> bool {
        match self.timer.as_mut() {
            Some(timer) => timer.tick(delta).just_finished(),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn disarmed_ticker_never_fires() {
        let mut ticker = Ticker::default();
        assert!(!ticker.poll(Duration::from_secs(10)));
    }

    #[test]
    fn fires_once_per_period() {
        let mut ticker = Ticker::default();
        ticker.arm(100);
        assert!(!ticker.poll(Duration::from_millis(60)));
        assert!(ticker.poll(Duration::from_millis(60)));
        assert!(!ticker.poll(Duration::from_millis(60)));
        assert!(ticker.poll(Duration::from_millis(60)));
    }

    #[test]
    fn long_frame_reports_a_single_tick() {
        let mut ticker = Ticker::default();
        ticker.arm(10);
        assert!(ticker.poll(Duration::from_millis(95)));
    }

    #[test]
    fn rearming_replaces_the_timer() {
        let mut ticker = Ticker::default();
        ticker.arm(100);
        assert!(!ticker.poll(Duration::from_millis(90)));
        ticker.arm(100);
        // the old timer would have fired here
        assert!(!ticker.poll(Duration::from_millis(20)));
        assert_eq!(ticker.period(), Some(Duration::from_millis(100)));

        ticker.arm(0);
        assert_eq!(ticker.period(), Some(Duration::from_millis(MIN_TIMER_INTERVAL_MS)));
        ticker.disarm();
        assert!(!ticker.is_armed());
    }
}
