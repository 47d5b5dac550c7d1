//! Named external trigger events.
//!
//! External drivers fire events by name between steps; conditions consume
//! them.  To keep consumption independent of agent evaluation order, fired
//! events are *latched*: [`EventRegistry::fire`] records the name, and the
//! machine drains the fired set once at the start of the next step
//! ([`take_fired`](EventRegistry::take_fired)).  Every agent evaluated that
//! step sees the same event set; afterwards the events are gone until fired
//! again.
//!
//! The pending set sits behind a mutex because `fire` is callable from an
//! embedding thread while the simulator is idle between steps — never
//! concurrently with a step.

use std::sync::Mutex;

use rustc_hash::{FxHashMap, FxHashSet};

use crowd_core::{CrowdError, CrowdResult};

/// Registry of declared event names and their pending fired state.
#[derive(Default)]
pub struct EventRegistry {
    /// Declared names → declaration order (stable enumeration for the
    /// control surface).
    names: FxHashMap<String, usize>,
    pending: Mutex<FxHashSet<String>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an event name.  Declaring twice is harmless.
    pub fn declare(&mut self, name: impl Into<String>) {
        let next = self.names.len();
        self.names.entry(name.into()).or_insert(next);
    }

    /// `true` if `name` was declared.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Declared event names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        let mut v: Vec<(&str, usize)> =
            self.names.iter().map(|(n, &i)| (n.as_str(), i)).collect();
        v.sort_unstable_by_key(|&(_, i)| i);
        v.into_iter().map(|(n, _)| n).collect()
    }

    /// Fire `name`.  Latched until the next step consumes it.
    ///
    /// Unknown names are a recoverable runtime failure.
    pub fn fire(&self, name: &str) -> CrowdResult<()> {
        if !self.contains(name) {
            return Err(CrowdError::EventNotFound(name.to_string()));
        }
        self.pending.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    /// Drain the fired set (called once per step by the machine).
    pub fn take_fired(&self) -> FxHashSet<String> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}
