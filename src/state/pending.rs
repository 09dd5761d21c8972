/// Debounced name edits
///
/// Typed names are buffered here per slot index and only written to the
/// catalog once the field has been quiet for `delay`. A new keystroke
/// replaces the buffered value and restarts that field's deadline, so at
/// most one commit is pending per slot.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingName {
    value: String,
    due: Instant,
}

#[derive(Debug, Clone)]
pub struct PendingEdits {
    delay: Duration,
    names: BTreeMap<usize, PendingName>,
}

impl PendingEdits {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            names: BTreeMap::new(),
        }
    }

    /// Buffer a name typed into slot `index` at time `now`
    pub fn stage(&mut self, index: usize, value: String, now: Instant) {
        self.names.insert(
            index,
            PendingName {
                value,
                due: now + self.delay,
            },
        );
    }

    /// Buffered value for a slot, shown in its input while uncommitted
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(|p| p.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Remove and return every edit whose quiet period has elapsed
    pub fn take_due(&mut self, now: Instant) -> Vec<(usize, String)> {
        let due: Vec<usize> = self
            .names
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(index, _)| *index)
            .collect();

        due.into_iter()
            .filter_map(|index| self.names.remove(&index).map(|p| (index, p.value)))
            .collect()
    }

    /// Remove and return every edit regardless of its deadline
    pub fn take_all(&mut self) -> Vec<(usize, String)> {
        std::mem::take(&mut self.names)
            .into_iter()
            .map(|(index, pending)| (index, pending.value))
            .collect()
    }
}
