//! Step numbering for dynamic views.
//!
//! A [`Sequencer`] hands out the order of each interaction added to a dynamic
//! view. Every call at the top level advances the sequence. Inside a parallel
//! branch only the first call advances it, so every interaction of one branch
//! shares a step number. Branches may nest.

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counter {
    value: u32,
    advanced: bool,
}

/// A chain of counters, with the root at the bottom and the innermost open
/// branch on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    counters: Vec<Counter>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            counters: vec![Counter::default()],
        }
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the order for the next interaction.
    pub fn next_order(&mut self) -> String {
        let in_branch = self.counters.len() > 1;
        let counter = self.active_mut();
        if !in_branch || !counter.advanced {
            counter.value = counter.value.saturating_add(1);
            counter.advanced = true;
        }
        counter.value.to_string()
    }

    /// Opens a parallel branch that starts from the current step.
    pub fn start_parallel_sequence(&mut self) {
        let value = self.active_mut().value;
        self.counters.push(Counter {
            value,
            advanced: false,
        });
    }

    /// Closes the innermost parallel branch.
    ///
    /// With `merge`, the enclosing sequence continues after the branch's last
    /// step; otherwise it continues from where it was when the branch opened.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if no branch is open.
    pub fn end_parallel_sequence(&mut self, merge: bool) -> Result<()> {
        if self.counters.len() < 2 {
            return Err(ModelError::invalid(
                "There is no parallel sequence to end.",
            ));
        }
        let Some(branch) = self.counters.pop() else {
            return Ok(());
        };
        if merge {
            self.active_mut().value = branch.value;
        }
        Ok(())
    }

    /// Moves the top-level sequence past `last`, so that the next order
    /// follows an already numbered step. Never moves it backwards.
    pub fn resume(&mut self, last: u32) {
        let root = &mut self.counters[0];
        root.value = root.value.max(last);
    }

    /// Number of open parallel branches.
    pub fn depth(&self) -> usize {
        self.counters.len() - 1
    }

    fn active_mut(&mut self) -> &mut Counter {
        let last = self.counters.len() - 1;
        &mut self.counters[last]
    }
}
