//! Shift-register debounce filter.
//!
//! A cheaper alternative to [`Debouncer`](crate::Debouncer) for callers that
//! only need a clean press edge: every sample is shifted into a 16-bit
//! history and a press is reported on the single tick where twelve pressed
//! samples follow a released one.

use hal::ButtonStatus;

/// Only the low 13 bits carry history.
const MASK: u16 = 0xe000;
/// One released sample followed by twelve pressed ones.
const PRESS_EDGE: u16 = 0xf000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftDebouncer {
    history: u16,
}

impl ShiftDebouncer {
    pub const fn new() -> Self {
        Self { history: 0 }
    }

    /// Shift in one raw sample. Returns `Pressed` only on the debounced press edge.
    pub fn sample(&mut self, raw: ButtonStatus) -> ButtonStatus {
        let released = u16::from(!raw.is_pressed());
        self.history = (self.history << 1) | MASK | released;
        ButtonStatus::from(self.history == PRESS_EDGE)
    }

    /// Consecutive pressed samples the edge needs.
    pub const fn samples_required() -> u32 {
        PRESS_EDGE.trailing_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESSED: ButtonStatus = ButtonStatus::Pressed;
    const RELEASED: ButtonStatus = ButtonStatus::Released;

    fn feed(filter: &mut ShiftDebouncer, status: ButtonStatus, n: usize) -> Vec<ButtonStatus> {
        (0..n).map(|_| filter.sample(status)).collect()
    }

    #[test]
    fn press_edge_after_twelve_samples() {
        assert_eq!(ShiftDebouncer::samples_required(), 12);

        let mut filter = ShiftDebouncer::new();
        feed(&mut filter, RELEASED, 4);

        let out = feed(&mut filter, PRESSED, 20);
        let edges: Vec<_> = out
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_pressed())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(edges, vec![11]);
    }

    #[test]
    fn bounce_restarts_the_count() {
        let mut filter = ShiftDebouncer::new();
        filter.sample(RELEASED);

        assert!(feed(&mut filter, PRESSED, 8).iter().all(|s| !s.is_pressed()));
        filter.sample(RELEASED);
        let out = feed(&mut filter, PRESSED, 12);
        assert_eq!(out.iter().filter(|s| s.is_pressed()).count(), 1);
        assert!(out[11].is_pressed());
    }

    #[test]
    fn held_from_power_up_never_reports() {
        // No released sample precedes the press, so no edge exists.
        let mut filter = ShiftDebouncer::new();
        assert!(feed(&mut filter, PRESSED, 64).iter().all(|s| !s.is_pressed()));
    }
}
