//! Decides the next batch purely from the current row counts.
//!
//! Row counts are the only cursor: each checkpoint count maps to exactly one
//! `[start, end)` range, and a count that sits on no checkpoint maps to
//! nothing.

use std::fmt;

use serde::Serialize;

pub const STATE_BATCHES: &[(usize, usize)] = &[(0, 22), (22, 40), (40, 51)];
pub const CITY_BATCHES: &[(usize, usize)] = &[(0, 25), (25, 50), (50, 75), (75, 100)];

pub const STATE_TOTAL: usize = 51;
pub const CITY_TOTAL: usize = 100;

/// A contiguous range of rank positions, plus where it sits among its table's batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub start: usize,
    pub end: usize,
    /// 1-based ordinal of this batch.
    pub step: usize,
    pub of: usize,
}

impl Batch {
    pub fn is_last(&self) -> bool {
        self.step == self.of
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ScrapeStates(Batch),
    /// Applies to Safe_Cities and Dangerous_Cities together.
    ScrapeCities(Batch),
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowCounts {
    pub states: usize,
    pub safe: usize,
    pub dangerous: usize,
}

fn batch_at(table: &[(usize, usize)], count: usize) -> Option<Batch> {
    table
        .iter()
        .position(|&(start, _)| start == count)
        .map(|i| Batch {
            start: table[i].0,
            end: table[i].1,
            step: i + 1,
            of: table.len(),
        })
}

pub fn next_action(states: usize, safe: usize, dangerous: usize) -> Action {
    if states != STATE_TOTAL {
        return batch_at(STATE_BATCHES, states).map_or(Action::NoOp, Action::ScrapeStates);
    }
    if safe != dangerous {
        return Action::NoOp;
    }
    batch_at(CITY_BATCHES, safe).map_or(Action::NoOp, Action::ScrapeCities)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StallReason {
    StatesOffCheckpoint { states: usize },
    CitiesDiverged { safe: usize, dangerous: usize },
    CitiesOffCheckpoint { cities: usize },
}

impl fmt::Display for StallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StallReason::StatesOffCheckpoint { states } => write!(
                f,
                "States has {} rows, expected one of {:?}",
                states,
                checkpoints(STATE_BATCHES, STATE_TOTAL)
            ),
            StallReason::CitiesDiverged { safe, dangerous } => write!(
                f,
                "Safe_Cities has {} rows but Dangerous_Cities has {}",
                safe, dangerous
            ),
            StallReason::CitiesOffCheckpoint { cities } => write!(
                f,
                "city tables have {} rows, expected one of {:?}",
                cities,
                checkpoints(CITY_BATCHES, CITY_TOTAL)
            ),
        }
    }
}

fn checkpoints(table: &[(usize, usize)], total: usize) -> Vec<usize> {
    table.iter().map(|&(start, _)| start).chain([total]).collect()
}

/// `next_action` with its `NoOp` split into "done" and "stuck".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "progress", rename_all = "snake_case")]
pub enum Progress {
    Pending { next: Action },
    Complete,
    Stalled { why: StallReason },
}

impl Progress {
    pub fn classify(counts: RowCounts) -> Progress {
        let RowCounts {
            states,
            safe,
            dangerous,
        } = counts;
        match next_action(states, safe, dangerous) {
            Action::NoOp if states != STATE_TOTAL => Progress::Stalled {
                why: StallReason::StatesOffCheckpoint { states },
            },
            Action::NoOp if safe != dangerous => Progress::Stalled {
                why: StallReason::CitiesDiverged { safe, dangerous },
            },
            Action::NoOp if safe == CITY_TOTAL => Progress::Complete,
            Action::NoOp => Progress::Stalled {
                why: StallReason::CitiesOffCheckpoint { cities: safe },
            },
            next => Progress::Pending { next },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_states(start: usize, end: usize) {
        match next_action(start, 0, 0) {
            Action::ScrapeStates(b) => assert_eq!((b.start, b.end), (start, end)),
            other => panic!("expected ScrapeStates at {}, got {:?}", start, other),
        }
    }

    #[test]
    fn state_checkpoints() {
        expect_states(0, 22);
        expect_states(22, 40);
        expect_states(40, 51);
    }

    #[test]
    fn state_batches_ignore_city_counts() {
        assert!(matches!(
            next_action(22, 75, 3),
            Action::ScrapeStates(Batch { start: 22, end: 40, .. })
        ));
    }

    #[test]
    fn city_checkpoints() {
        let expected = [(0, 25), (25, 50), (50, 75), (75, 100)];
        for (i, &(start, end)) in expected.iter().enumerate() {
            let action = next_action(STATE_TOTAL, start, start);
            assert_eq!(
                action,
                Action::ScrapeCities(Batch {
                    start,
                    end,
                    step: i + 1,
                    of: 4
                })
            );
        }
    }

    #[test]
    fn complete_is_noop() {
        assert_eq!(next_action(51, 100, 100), Action::NoOp);
        assert_eq!(
            Progress::classify(RowCounts {
                states: 51,
                safe: 100,
                dangerous: 100
            }),
            Progress::Complete
        );
    }

    #[test]
    fn off_checkpoint_state_counts_are_noop() {
        for n in 0..=120 {
            if [0, 22, 40, 51].contains(&n) {
                continue;
            }
            assert_eq!(next_action(n, 0, 0), Action::NoOp, "states = {}", n);
            assert!(matches!(
                Progress::classify(RowCounts { states: n, safe: 0, dangerous: 0 }),
                Progress::Stalled { why: StallReason::StatesOffCheckpoint { states } } if states == n
            ));
        }
    }

    #[test]
    fn off_checkpoint_city_counts_are_noop() {
        for n in 0..=120 {
            if [0, 25, 50, 75, 100].contains(&n) {
                continue;
            }
            assert_eq!(next_action(51, n, n), Action::NoOp, "cities = {}", n);
            assert!(matches!(
                Progress::classify(RowCounts { states: 51, safe: n, dangerous: n }),
                Progress::Stalled { why: StallReason::CitiesOffCheckpoint { .. } }
            ));
        }
    }

    #[test]
    fn diverged_city_counts_stall() {
        assert_eq!(next_action(51, 25, 0), Action::NoOp);
        assert_eq!(
            Progress::classify(RowCounts {
                states: 51,
                safe: 25,
                dangerous: 0
            }),
            Progress::Stalled {
                why: StallReason::CitiesDiverged {
                    safe: 25,
                    dangerous: 0
                }
            }
        );
    }

    #[test]
    fn last_batch_flag() {
        let Action::ScrapeStates(b) = next_action(40, 0, 0) else {
            panic!("expected states batch");
        };
        assert!(b.is_last());
        let Action::ScrapeCities(b) = next_action(51, 50, 50) else {
            panic!("expected cities batch");
        };
        assert!(!b.is_last());
        assert_eq!(b.step, 3);
    }

    #[test]
    fn stall_message_lists_checkpoints() {
        let msg = StallReason::StatesOffCheckpoint { states: 10 }.to_string();
        assert!(msg.contains("[0, 22, 40, 51]"), "{}", msg);
    }
}
