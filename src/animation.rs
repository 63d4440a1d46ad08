//! Frame-indexed animation playback shared by every animated entity.

/// Accumulation rate for locomotion cycles (frames per tick).
pub const LOCOMOTION_SPEED: f32 = 0.13;
/// Accumulation rate for attack swings.
pub const ATTACK_SPEED: f32 = 0.28;
/// Accumulation rate for looping pickups.
pub const PICKUP_SPEED: f32 = 0.1;

/// Frame index plus a fractional accumulator. Frame sets are supplied per
/// call so the same animator can switch between sets of different lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Animator {
    pub index: usize,
    pub accumulator: f32,
}

impl Animator {
    pub fn new() -> Animator {
        Animator::default()
    }

    /// Restart at frame 0.
    pub fn reset(&mut self) {
        self.index = 0;
        self.accumulator = 0.0;
    }

    /// Advance by one tick at `speed`. Returns `true` when the index wrapped
    /// back to frame 0 this tick, i.e. a full cycle just completed.
    pub fn advance(&mut self, speed: f32, frame_count: usize) -> bool {
        self.accumulator += speed;
        if self.accumulator < 1.0 {
            return false;
        }
        self.accumulator = self.accumulator.fract();
        let len = frame_count.max(1);
        self.index = (self.index + 1) % len;
        self.index == 0
    }

    /// Current frame clamped into a set of `frame_count` frames.
    pub fn frame(&self, frame_count: usize) -> usize {
        self.index % frame_count.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_once_accumulator_crosses_one() {
        let mut a = Animator::new();
        for _ in 0..7 {
            a.advance(LOCOMOTION_SPEED, 4);
        }
        assert_eq!(a.index, 0); // 7 * 0.13 = 0.91
        a.advance(LOCOMOTION_SPEED, 4);
        assert_eq!(a.index, 1);
    }

    #[test]
    fn wraps_and_reports_cycle_end() {
        let mut a = Animator::new();
        let mut wraps = 0;
        for _ in 0..4 {
            if a.advance(1.0, 4) {
                wraps += 1;
            }
        }
        assert_eq!(wraps, 1);
        assert_eq!(a.index, 0);
    }

    #[test]
    fn single_frame_set_never_leaves_zero() {
        let mut a = Animator::new();
        for _ in 0..20 {
            a.advance(ATTACK_SPEED, 1);
        }
        assert_eq!(a.frame(1), 0);
    }

    #[test]
    fn attack_speed_outpaces_locomotion() {
        let mut slow = Animator::new();
        let mut fast = Animator::new();
        for _ in 0..8 {
            slow.advance(LOCOMOTION_SPEED, 4);
            fast.advance(ATTACK_SPEED, 4);
        }
        assert!(fast.index > slow.index);
    }
}
