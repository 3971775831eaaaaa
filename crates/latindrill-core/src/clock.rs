//! Manually advanced clock.

use crate::round::RoundId;
use crate::traits::Clock;

/// A [`Clock`] that only moves when told to.
///
/// The CLI advances it from a `tokio` interval; tests advance it directly.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    armed: Option<RoundId>,
    ticks: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks delivered since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for ManualClock {
    fn arm(&mut self, round: RoundId) {
        self.armed = Some(round);
    }

    fn disarm(&mut self) {
        self.armed = None;
    }

    fn armed(&self) -> Option<RoundId> {
        self.armed
    }

    fn advance(&mut self) -> Option<RoundId> {
        let round = self.armed?;
        self.ticks += 1;
        Some(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_while_armed() {
        let mut clock = ManualClock::new();
        assert_eq!(clock.advance(), None);

        clock.arm(3);
        assert_eq!(clock.advance(), Some(3));
        clock.arm(4);
        assert_eq!(clock.advance(), Some(4));

        clock.disarm();
        assert_eq!(clock.advance(), None);
        assert_eq!(clock.ticks(), 2);
    }
}
