use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::callable::{Args, Value};
use crate::clause::{self, Clause};
use crate::delegate::Delegate;
use crate::mock::MockState;
use crate::output::ResultShape;
use crate::reporter::Reporter;

/// Opaque identity of one live mock.
///
/// Minted from a process-wide monotonic counter at construction, so two
/// live mocks can never collide regardless of which registry holds them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MockId(u64);

static NEXT_MOCK_ID: AtomicU64 = AtomicU64::new(1);

impl MockId {
    fn mint() -> Self {
        MockId(NEXT_MOCK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for MockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mock #{}", self.0)
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Maps mock identities to their state: delegate queues, ordering state,
/// and the bound reporter.
///
/// A registry is an explicit, cheaply cloneable context object; each test
/// normally creates its own so lifecycles stay scoped to the owning test.
/// [`Registry::global`] provides one process-wide instance for generated
/// stubs that want ambient registration instead.
#[derive(Clone, Default)]
pub struct Registry {
    mocks: Arc<Mutex<HashMap<MockId, Arc<MockState>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Create a mock bound to `reporter` and apply its configuration
    /// clauses. The returned handle is the original: dropping it removes
    /// the mock from this registry.
    pub fn create(
        &self,
        reporter: Arc<dyn Reporter>,
        clauses: impl IntoIterator<Item = Clause>,
    ) -> Handle {
        let id = MockId::mint();
        let state = Arc::new(MockState::new(reporter));
        {
            let mut mocks = self.lock();
            // Identities are minted, so a collision means corrupted state.
            // Never silently overwrite a live mock.
            if mocks.contains_key(&id) {
                panic!("{id} already registered: identities must be unique per live mock");
            }
            mocks.insert(id, Arc::clone(&state));
        }
        for clause in clauses {
            clause::apply(clause, &state);
        }
        Handle {
            registry: self.clone(),
            id,
            original: true,
        }
    }

    /// Remove a mock. Idempotent; called at teardown.
    pub fn remove(&self, id: MockId) {
        self.lock().remove(&id);
    }

    pub(crate) fn get(&self, id: MockId) -> Option<Arc<MockState>> {
        self.lock().get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MockId, Arc<MockState>>> {
        self.mocks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A reference to one registered mock, used by stub methods to dispatch
/// invocations and by configuration code to address the mock.
///
/// Handles are cloneable; clones are plain references, while dropping the
/// handle returned by [`Registry::create`] tears the mock down.
pub struct Handle {
    registry: Registry,
    id: MockId,
    original: bool,
}

impl Handle {
    pub fn id(&self) -> MockId {
        self.id
    }

    /// Raw dispatch: invoke the named operation and return the delegate's
    /// raw result (or the shape's synthesized degraded result). Generated
    /// stub methods normally use `call0`..`call9` instead.
    pub fn dispatch(&self, name: &str, shape: &ResultShape, args: Args) -> Value {
        crate::eval::dispatch(&self.resolve(name), name, shape, args)
    }

    /// The delegate queue for an operation name, created on first use.
    pub fn delegate(&self, name: &str) -> Arc<Delegate> {
        self.resolve(name).delegate_by_name(name)
    }

    pub(crate) fn state(&self) -> Option<Arc<MockState>> {
        self.registry.get(self.id)
    }

    /// Dispatching against a torn-down or foreign identity is a programmer
    /// error, not an expectation violation: there is no reporter left to
    /// tell, so fault immediately.
    pub(crate) fn resolve(&self, operation: &str) -> Arc<MockState> {
        match self.registry.get(self.id) {
            Some(state) => state,
            None => panic!("call to {operation} on {}: mock is not registered (already torn down?)", self.id),
        }
    }
}

impl Clone for Handle {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            id: self.id,
            original: false,
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.original {
            self.registry.remove(self.id);
        }
    }
}
