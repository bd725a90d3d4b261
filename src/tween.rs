use crate::ease::Ease;

/// A single eased scalar transition, sampled by host timestamps
/// (milliseconds). Pure: sampling never mutates, so owners decide when a
/// finished tween stops mattering.
#[derive(Clone, Copy, Debug)]
pub struct Tween {
    from: f64,
    to: f64,
    start: f64,
    duration: f64,
    ease: Ease,
}

impl Tween {
    /// Build a tween starting at `start` ms. Non-positive durations collapse
    /// to an instant jump (finished immediately, value pinned to `to`).
    pub fn new(from: f64, to: f64, start: f64, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            start,
            duration: duration.max(0.0),
            ease,
        }
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    /// Timestamp at which the tween lands exactly on `to`.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_finished_at(&self, now: f64) -> bool {
        now >= self.end()
    }

    /// Eased value at `now`. Exact at both endpoints: `from` for any time at
    /// or before `start`, `to` for any time at or after `end` (an instant
    /// jump reports `to` from its start onwards).
    pub fn value_at(&self, now: f64) -> f64 {
        if now < self.start {
            return self.from;
        }
        if self.duration <= 0.0 || now >= self.end() {
            return self.to;
        }
        let t = (now - self.start) / self.duration;
        self.from + (self.to - self.from) * self.ease.apply(t)
    }
}
