//! Deferred actions keyed by session generation
//!
//! Delays run on simulation time, so nothing elapses while the session is
//! paused. Entries from an older generation are dropped when they come due.

use serde::{Deserialize, Serialize};

/// Work that fires some time after it was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Begin the next wave
    StartWave { number: u32 },
    /// Take a defeated boss off the field
    RemoveBoss,
    /// Pause and present a rolled ability offer
    OfferAbilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    generation: u64,
    fire_at_ms: f64,
    seq: u64,
    action: ScheduledAction,
}

/// Queue of pending actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, generation: u64, fire_at_ms: f64, action: ScheduledAction) {
        log::debug!("Scheduled {:?} at {:.0} ms (gen {})", action, fire_at_ms, generation);
        self.pending.push(Pending {
            generation,
            fire_at_ms,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Remove and return every action due at `now_ms`, in firing order
    pub fn drain_due(&mut self, generation: u64, now_ms: f64) -> Vec<ScheduledAction> {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) = self
            .pending
            .drain(..)
            .partition(|p| p.fire_at_ms <= now_ms);
        self.pending = rest;

        due.sort_by(|a, b| {
            a.fire_at_ms
                .partial_cmp(&b.fire_at_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });

        due.into_iter()
            .filter_map(|p| {
                if p.generation == generation {
                    Some(p.action)
                } else {
                    log::warn!(
                        "Dropping stale {:?} from generation {} (current {})",
                        p.action,
                        p.generation,
                        generation
                    );
                    None
                }
            })
            .collect()
    }

    pub fn contains(&self, action: ScheduledAction) -> bool {
        self.pending.iter().any(|p| p.action == action)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_time_order() {
        let mut schedule = Schedule::new();
        schedule.push(1, 300.0, ScheduledAction::RemoveBoss);
        schedule.push(1, 100.0, ScheduledAction::OfferAbilities);
        schedule.push(1, 900.0, ScheduledAction::StartWave { number: 2 });

        assert!(schedule.drain_due(1, 50.0).is_empty());
        assert_eq!(
            schedule.drain_due(1, 300.0),
            vec![ScheduledAction::OfferAbilities, ScheduledAction::RemoveBoss]
        );
        assert_eq!(schedule.len(), 1);
        assert_eq!(
            schedule.drain_due(1, 1000.0),
            vec![ScheduledAction::StartWave { number: 2 }]
        );
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut schedule = Schedule::new();
        schedule.push(1, 100.0, ScheduledAction::StartWave { number: 5 });
        schedule.push(2, 100.0, ScheduledAction::RemoveBoss);
        assert_eq!(schedule.drain_due(2, 200.0), vec![ScheduledAction::RemoveBoss]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_same_time_keeps_insertion_order() {
        let mut schedule = Schedule::new();
        schedule.push(0, 10.0, ScheduledAction::RemoveBoss);
        schedule.push(0, 10.0, ScheduledAction::OfferAbilities);
        assert_eq!(
            schedule.drain_due(0, 10.0),
            vec![ScheduledAction::RemoveBoss, ScheduledAction::OfferAbilities]
        );
    }
}
