//! Forecast date playback timer.
//!
//! Playback remembers the date shown when it started so that stopping it,
//! manually or by running out of dates, always restores that date.

use chrono::NaiveDate;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing { before: NaiveDate, next_tick: Instant },
    Paused { before: NaiveDate },
}

#[derive(Debug, Clone)]
pub struct Playback {
    state: PlaybackState,
    interval: Duration,
}

impl Playback {
    pub fn new(interval: Duration) -> Self {
        Playback {
            state: PlaybackState::Idle,
            interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    /// Playing or paused. Manual date stepping is disabled while active.
    pub fn is_active(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    /// Start playing from `current`, or resume a paused playback.
    pub fn start(&mut self, current: NaiveDate, now: Instant) {
        let before = match self.state {
            PlaybackState::Paused { before } | PlaybackState::Playing { before, .. } => before,
            PlaybackState::Idle => current,
        };
        self.state = PlaybackState::Playing {
            before,
            next_tick: now + self.interval,
        };
    }

    pub fn pause(&mut self) {
        if let PlaybackState::Playing { before, .. } = self.state {
            self.state = PlaybackState::Paused { before };
        }
    }

    /// Stop and hand back the date to restore, if playback was active.
    pub fn stop(&mut self) -> Option<NaiveDate> {
        let before = match self.state {
            PlaybackState::Playing { before, .. } | PlaybackState::Paused { before } => Some(before),
            PlaybackState::Idle => None,
        };
        self.state = PlaybackState::Idle;
        before
    }

    pub fn next_tick(&self) -> Option<Instant> {
        match self.state {
            PlaybackState::Playing { next_tick, .. } => Some(next_tick),
            _ => None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_tick().is_some_and(|tick| now >= tick)
    }

    /// Schedule the next step one interval after `now`.
    pub fn advance(&mut self, now: Instant) {
        if let PlaybackState::Playing { next_tick, .. } = &mut self.state {
            *next_tick = now + self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_returns_start_date() {
        let start = Instant::now();
        let date = NaiveDate::from_ymd_opt(2023, 5, 20).unwrap();
        let mut playback = Playback::new(Duration::from_secs(1));
        assert_eq!(playback.stop(), None);

        playback.start(date, start);
        assert!(!playback.is_due(start));
        assert!(playback.is_due(start + Duration::from_secs(1)));
        playback.advance(start + Duration::from_secs(1));
        assert_eq!(playback.next_tick(), Some(start + Duration::from_secs(2)));

        playback.pause();
        assert!(playback.is_active());
        assert!(!playback.is_playing());
        // resuming keeps the original start date
        playback.start(NaiveDate::from_ymd_opt(2023, 5, 6).unwrap(), start);
        assert_eq!(playback.stop(), Some(date));
        assert!(!playback.is_active());
    }
}
