//! Identifier types for model items
//!
//! Elements and relationships are addressed by opaque string ids that are
//! unique within one model. The ids are assigned by an [`IdGenerator`] owned
//! by the model, never by callers.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use log::trace;
use serde::{Deserialize, Serialize};

macro_rules! model_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from its string representation.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

model_id!(
    /// Identity of an element within its model.
    ///
    /// # Examples
    ///
    /// ```
    /// use archmodel_core::identifier::ElementId;
    ///
    /// let id = ElementId::new("1");
    /// assert_eq!(id, "1");
    /// assert_eq!(id.to_string(), "1");
    /// ```
    ElementId
);

model_id!(
    /// Identity of a relationship within its model.
    RelationshipId
);

/// Monotonic source of model ids.
///
/// Every call to [`IdGenerator::generate`] returns a distinct value, even when
/// called from several threads against the same generator. The counter lives
/// behind a mutex so that increment and read happen as one step.
///
/// # Examples
///
/// ```
/// use archmodel_core::identifier::IdGenerator;
///
/// let ids = IdGenerator::new();
/// assert_eq!(ids.generate().as_deref(), Some("1"));
/// ids.seed(41);
/// assert_eq!(ids.generate().as_deref(), Some("42"));
/// ids.seed(u64::MAX);
/// assert_eq!(ids.generate(), None);
/// ```
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Mutex<u64>,
}

impl IdGenerator {
    /// Creates a generator whose first id is `"1"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id, or `None` once the counter is exhausted.
    ///
    /// An exhausted generator stays exhausted.
    pub fn generate(&self) -> Option<String> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = last.checked_add(1)?;
        *last = next;
        Some(next.to_string())
    }

    /// Advances the counter so that the next id is greater than `max_observed`.
    ///
    /// Seeding never moves the counter backwards.
    pub fn seed(&self, max_observed: u64) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if max_observed > *last {
            trace!(max_observed; "Seeding id counter");
            *last = max_observed;
        }
    }

    /// Records an id restored from a serialized model.
    ///
    /// Ids that are not plain integers cannot collide with generated ones
    /// and are ignored.
    pub fn found(&self, id: &str) {
        if let Ok(value) = id.parse::<u64>() {
            self.seed(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_generate_starts_at_one() {
        let ids = IdGenerator::new();
        assert_eq!(ids.generate().as_deref(), Some("1"));
        assert_eq!(ids.generate().as_deref(), Some("2"));
    }

    #[test]
    fn test_seed_never_moves_backwards() {
        let ids = IdGenerator::new();
        ids.seed(10);
        ids.seed(3);
        assert_eq!(ids.generate().as_deref(), Some("11"));
    }

    #[test]
    fn test_found_ignores_non_numeric_ids() {
        let ids = IdGenerator::new();
        ids.found("web-app");
        ids.found("7");
        assert_eq!(ids.generate().as_deref(), Some("8"));
    }

    #[test]
    fn test_exhausted_counter_yields_nothing() {
        let ids = IdGenerator::new();
        ids.found("18446744073709551614");
        assert_eq!(ids.generate().as_deref(), Some("18446744073709551615"));
        assert_eq!(ids.generate(), None);
        assert_eq!(ids.generate(), None);
    }

    #[test]
    fn test_concurrent_generation_has_no_collisions() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..100).map(|_| ids.generate().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 800);
        assert!(seen.contains("800"));
        assert!(!seen.contains("801"));
    }

    #[test]
    fn test_id_compares_with_str() {
        let id = RelationshipId::from("12");
        assert_eq!(id, "12");
        assert_eq!(id.as_str(), "12");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ElementId::new("5");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"5\"");
    }

    proptest! {
        #[test]
        fn test_generate_after_seed_exceeds_seed(seed in 0u64..1_000_000, draws in 1usize..20) {
            let ids = IdGenerator::new();
            ids.seed(seed);
            let mut previous = seed;
            for _ in 0..draws {
                let next: u64 = ids.generate().unwrap().parse().unwrap();
                prop_assert_eq!(next, previous + 1);
                previous = next;
            }
        }
    }
}
