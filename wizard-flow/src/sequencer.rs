//! Linear step sequencer.
//!
//! Position 0 is the landing step; the flow proper runs from 1 to the last
//! index. The rules are:
//!
//! * `start`    0 → 1
//! * `advance`  i → i+1 for 1 ≤ i < last
//! * `retreat`  i → i-1 for i > 1 (never back onto the landing step)
//! * `complete` last → 0
//!
//! Anything else is a no-op and returns `None`.

use serde::{Deserialize, Serialize};

/// Position change produced by a successful navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
}

/// Deserializing goes through the same checks as [`Sequencer::new`], plus
/// `current < step_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSequencer")]
pub struct Sequencer {
    current: usize,
    step_count: usize,
}

#[derive(Deserialize)]
struct RawSequencer {
    current: usize,
    step_count: usize,
}

impl TryFrom<RawSequencer> for Sequencer {
    type Error = String;

    fn try_from(raw: RawSequencer) -> Result<Self, Self::Error> {
        let mut seq = Sequencer::new(raw.step_count)
            .ok_or_else(|| format!("a wizard needs at least 2 steps, got {}", raw.step_count))?;
        if raw.current >= raw.step_count {
            return Err(format!(
                "step {} is out of range for {} steps",
                raw.current, raw.step_count
            ));
        }
        seq.current = raw.current;
        Ok(seq)
    }
}

impl Sequencer {
    /// A sequencer needs the landing step plus at least one flow step.
    pub fn new(step_count: usize) -> Option<Self> {
        (step_count >= 2).then_some(Self {
            current: 0,
            step_count,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn last(&self) -> usize {
        self.step_count - 1
    }

    pub fn is_at_landing(&self) -> bool {
        self.current == 0
    }

    pub fn is_at_last(&self) -> bool {
        self.current == self.last()
    }

    pub fn start(&mut self) -> Option<Transition> {
        (self.current == 0).then(|| self.move_to(1))
    }

    pub fn advance(&mut self) -> Option<Transition> {
        (self.current >= 1 && self.current < self.last()).then(|| self.move_to(self.current + 1))
    }

    pub fn retreat(&mut self) -> Option<Transition> {
        (self.current > 1).then(|| self.move_to(self.current - 1))
    }

    pub fn complete(&mut self) -> Option<Transition> {
        self.is_at_last().then(|| self.move_to(0))
    }

    fn move_to(&mut self, to: usize) -> Transition {
        let from = self.current;
        self.current = to;
        Transition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: usize = 6;

    fn at(index: usize) -> Sequencer {
        let mut seq = Sequencer::new(STEPS).unwrap();
        if index > 0 {
            seq.start();
        }
        while seq.current() < index {
            seq.advance();
        }
        assert_eq!(seq.current(), index);
        seq
    }

    #[test]
    fn deserializing_rejects_positions_outside_the_flow() {
        let seq: Sequencer =
            serde_json::from_value(serde_json::json!({"current": 3, "step_count": 6})).unwrap();
        assert_eq!(seq, at(3));

        let out_of_range =
            serde_json::from_value::<Sequencer>(serde_json::json!({"current": 6, "step_count": 6}));
        assert!(out_of_range.is_err());

        let too_short =
            serde_json::from_value::<Sequencer>(serde_json::json!({"current": 0, "step_count": 1}));
        assert!(too_short.is_err());
    }

    #[test]
    fn needs_at_least_two_steps() {
        assert!(Sequencer::new(0).is_none());
        assert!(Sequencer::new(1).is_none());
        assert_eq!(Sequencer::new(2).unwrap().last(), 1);
    }

    #[test]
    fn start_only_from_landing() {
        let mut seq = Sequencer::new(STEPS).unwrap();
        assert_eq!(seq.start(), Some(Transition { from: 0, to: 1 }));
        assert_eq!(seq.start(), None);
        assert_eq!(seq.current(), 1);
    }

    #[test]
    fn advance_moves_forward_inside_the_flow() {
        for i in 1..STEPS - 1 {
            let mut seq = at(i);
            assert_eq!(seq.advance(), Some(Transition { from: i, to: i + 1 }));
        }
    }

    #[test]
    fn advance_is_a_noop_on_landing_and_last() {
        let mut seq = at(0);
        assert_eq!(seq.advance(), None);
        assert_eq!(seq.current(), 0);

        let mut seq = at(STEPS - 1);
        assert_eq!(seq.advance(), None);
        assert_eq!(seq.current(), STEPS - 1);
    }

    #[test]
    fn retreat_moves_back_but_not_onto_landing() {
        for i in 2..STEPS {
            let mut seq = at(i);
            assert_eq!(seq.retreat(), Some(Transition { from: i, to: i - 1 }));
        }
        for i in 0..=1 {
            let mut seq = at(i);
            assert_eq!(seq.retreat(), None);
            assert_eq!(seq.current(), i);
        }
    }

    #[test]
    fn complete_only_from_last() {
        for i in 0..STEPS - 1 {
            let mut seq = at(i);
            assert_eq!(seq.complete(), None);
            assert_eq!(seq.current(), i);
        }
        let mut seq = at(STEPS - 1);
        assert_eq!(
            seq.complete(),
            Some(Transition {
                from: STEPS - 1,
                to: 0
            })
        );
        assert!(seq.is_at_landing());
    }

    #[test]
    fn position_stays_in_bounds_under_any_sequence() {
        let mut seq = Sequencer::new(STEPS).unwrap();
        let ops: [fn(&mut Sequencer) -> Option<Transition>; 4] = [
            Sequencer::start,
            Sequencer::advance,
            Sequencer::retreat,
            Sequencer::complete,
        ];
        for round in 0..200usize {
            let op = ops[(round * 7 + round / 3) % ops.len()];
            op(&mut seq);
            assert!(seq.current() < seq.step_count());
        }
    }
}
