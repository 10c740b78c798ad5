use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::delegate::Delegate;
use crate::reporter::Reporter;

/// All the state held for one mock during its lifetime: the bound reporter,
/// the lazily populated operation-name → delegate map, and the ordering
/// tracker shared by every delegate of this mock.
pub(crate) struct MockState {
    reporter: Arc<dyn Reporter>,
    delegates: RwLock<BTreeMap<String, Arc<Delegate>>>,
    order: Mutex<OrderTracker>,
}

/// Cross-operation call-order state. `in_order` is only meaningful while
/// configuration clauses are being applied; `ordinal` advances at both
/// registration time (stamping) and dispatch time (checking).
struct OrderTracker {
    in_order: bool,
    ordinal: usize,
}

impl MockState {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            reporter,
            delegates: RwLock::new(BTreeMap::new()),
            order: Mutex::new(OrderTracker {
                in_order: false,
                ordinal: 0,
            }),
        }
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Retrieve or create the delegate for an operation name.
    /// First write wins; safe to call from multiple threads.
    pub fn delegate_by_name(&self, name: &str) -> Arc<Delegate> {
        {
            let delegates = self.delegates.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(delegate) = delegates.get(name) {
                return Arc::clone(delegate);
            }
        }
        let mut delegates = self
            .delegates
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            delegates
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Delegate::new())),
        )
    }

    /// Snapshot of all delegates, in deterministic name order.
    pub fn delegates(&self) -> Vec<(String, Arc<Delegate>)> {
        self.delegates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, delegate)| (name.clone(), Arc::clone(delegate)))
            .collect()
    }

    /// Advance the ordinal and return its new value. Used both to stamp a
    /// registration made under `in_order` and to claim a position at
    /// dispatch time.
    pub fn bump_ordinal(&self) -> usize {
        let mut order = self.lock_order();
        order.ordinal += 1;
        order.ordinal
    }

    pub fn current_ordinal(&self) -> usize {
        self.lock_order().ordinal
    }

    /// Toggle the configuration-time in-order flag, returning the prior
    /// value so nested clauses can restore it stack-like.
    pub fn set_in_order(&self, in_order: bool) -> bool {
        let mut order = self.lock_order();
        std::mem::replace(&mut order.in_order, in_order)
    }

    pub fn in_order(&self) -> bool {
        self.lock_order().in_order
    }

    fn lock_order(&self) -> std::sync::MutexGuard<'_, OrderTracker> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::RecordingReporter;

    #[test]
    fn delegate_by_name_is_first_write_wins() {
        let state = MockState::new(Arc::new(RecordingReporter::new()));
        let first = state.delegate_by_name("Get");
        let second = state.delegate_by_name("Get");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(1, state.delegates().len());
    }

    #[test]
    fn ordinal_is_monotonic() {
        let state = MockState::new(Arc::new(RecordingReporter::new()));
        assert_eq!(0, state.current_ordinal());
        assert_eq!(1, state.bump_ordinal());
        assert_eq!(2, state.bump_ordinal());
        assert_eq!(2, state.current_ordinal());
    }
}
