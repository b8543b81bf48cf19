//! One-shot task scheduler.
//!
//! Timed work (despawns, structure-attack rechecks, cosmetic cleanup) is kept
//! as plain data keyed by handle and raid rather than captured closures. The
//! host drives the scheduler from its tick loop; a task never runs before its
//! due time but may run late if the loop is backlogged. Tasks do not carry
//! cancellation state: each one re-checks the registry when it runs, and acts
//! only if the handle is still registered to the same raid. Hosts may reuse
//! handles once an agent is gone.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::registry::RaidId;
use crate::world::{AgentHandle, CosmeticHandle};

/// Game time in seconds.
pub type Seconds = f64;

/// A scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Force-remove an agent whose raid duration elapsed.
    Despawn(AgentHandle, RaidId),
    /// Re-evaluate structure-attack behavior for an agent.
    Recheck(AgentHandle, RaidId),
    /// Remove a marker or effect.
    RemoveCosmetic(CosmeticHandle, RaidId),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: Seconds,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of tasks ordered by due time, then by insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run at `due`.
    pub fn schedule(&mut self, due: Seconds, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due, seq, task }));
    }

    /// Pop the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Seconds) -> Option<(Seconds, Task)> {
        let Reverse(next) = self.queue.peek()?;
        if next.due > now {
            return None;
        }
        self.queue.pop().map(|Reverse(e)| (e.due, e.task))
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_due(&self) -> Option<Seconds> {
        self.queue.peek().map(|Reverse(e)| e.due)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no tasks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAID: RaidId = RaidId(1);

    #[test]
    fn test_tasks_pop_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10.0, Task::Despawn(AgentHandle(1), RAID));
        scheduler.schedule(5.0, Task::Recheck(AgentHandle(2), RAID));
        scheduler.schedule(7.5, Task::RemoveCosmetic(CosmeticHandle(3), RAID));

        assert_eq!(scheduler.next_due(), Some(5.0));
        assert_eq!(
            scheduler.pop_due(100.0),
            Some((5.0, Task::Recheck(AgentHandle(2), RAID)))
        );
        assert_eq!(
            scheduler.pop_due(100.0),
            Some((7.5, Task::RemoveCosmetic(CosmeticHandle(3), RAID)))
        );
        assert_eq!(
            scheduler.pop_due(100.0),
            Some((10.0, Task::Despawn(AgentHandle(1), RAID)))
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_tasks_never_run_early() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(600.0, Task::Despawn(AgentHandle(1), RAID));
        assert_eq!(scheduler.pop_due(599.999), None);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.pop_due(600.0).is_some());
    }

    #[test]
    fn test_equal_due_times_keep_insertion_order() {
        let mut scheduler = Scheduler::new();
        for h in 0..5 {
            scheduler.schedule(1.0, Task::Despawn(AgentHandle(h), RAID));
        }
        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(1.0))
            .map(|(_, t)| t)
            .collect();
        let expected: Vec<_> = (0..5).map(|h| Task::Despawn(AgentHandle(h), RAID)).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_clear() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1.0, Task::Despawn(AgentHandle(1), RAID));
        scheduler.clear();
        assert!(scheduler.pop_due(f64::MAX).is_none());
    }
}
