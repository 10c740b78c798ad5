use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::callable::Callable;

/// The ordered queue of callables registered for one operation on one mock,
/// together with its call counter.
///
/// Each delegate has its own lock, held across the whole dispatch, so one
/// operation serves at most one call at a time while different operations
/// on the same mock dispatch in parallel.
pub struct Delegate {
    core: Mutex<DelegateCore>,
}

pub(crate) struct DelegateCore {
    callables: Vec<Arc<Callable>>,
    call_count: usize,
}

impl Delegate {
    pub(crate) fn new() -> Self {
        Self {
            core: Mutex::new(DelegateCore {
                callables: Vec::new(),
                call_count: 0,
            }),
        }
    }

    /// Append a callable, preserving registration order.
    pub fn append(&self, callable: Callable) {
        self.lock().callables.push(Arc::new(callable));
    }

    /// Number of registered callables.
    pub fn len(&self) -> usize {
        self.lock().callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().callables.is_empty()
    }

    /// Number of dispatches served so far.
    pub fn call_count(&self) -> usize {
        self.lock().call_count
    }

    // A delegate that panicked mid-call is a reported failure, not a reason
    // to wedge every later dispatch on this operation.
    pub(crate) fn lock(&self) -> MutexGuard<'_, DelegateCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DelegateCore {
    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn call_count(&self) -> usize {
        self.call_count
    }

    pub fn call_count_mut(&mut self) -> &mut usize {
        &mut self.call_count
    }

    /// Whether the queue can serve another call: either unconsumed
    /// single-invocation callables remain, or the tail repeats.
    pub fn can_serve(&self) -> bool {
        self.call_count < self.callables.len() || self.has_multi_tail()
    }

    pub fn has_multi_tail(&self) -> bool {
        self.callables
            .last()
            .map(|callable| callable.is_multi())
            .unwrap_or(false)
    }

    /// Select the callable for the given position: the one registered at
    /// that position, or past the end the repeating tail. Dispatch filters
    /// out the no-tail overflow before selection ever runs.
    pub fn select(&self, position: usize) -> Arc<Callable> {
        if position < self.callables.len() {
            return Arc::clone(&self.callables[position]);
        }
        match self.callables.last() {
            Some(last) if last.is_multi() => Arc::clone(last),
            _ => unreachable!("delegate queue exhausted without a multi-invocation tail"),
        }
    }
}
