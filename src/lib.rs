//!
//! `standin` is a mocking library built around delegate queues: a mock's
//! behavior is entirely determined by the stand-in functions registered for
//! its named operations, and the dispatch engine enforces the call-count
//! and ordering contracts those registrations imply.
//!
//! Stub types hold a [`Handle`] and forward each method to `call0`..`call9`
//! with the operation name and its arguments; configuration code registers
//! delegates with [`expect`] and friends when the mock is created:
//!
//! ```rust
//! use std::sync::Arc;
//! use standin::{
//!     args, assert_expected_calls, expect, expect_many, CallCount, Failure, Handle,
//!     PanicReporter, Registry,
//! };
//!
//! // A hand-written stub; generated stubs look the same.
//! struct MockCache {
//!     mock: Handle,
//! }
//!
//! impl MockCache {
//!     fn put(&self, key: &str, value: i64) -> Result<(), Failure> {
//!         self.mock.call1("Put", args![key.to_string(), value])
//!     }
//!
//!     fn get(&self, key: &str) -> (i64, bool) {
//!         self.mock.call2("Get", args![key.to_string()])
//!     }
//!
//!     // Variadic operations pass the tail as one sequence argument.
//!     fn load(&self, keys: &[&str]) {
//!         let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
//!         self.mock.call0("Load", args![keys]);
//!     }
//! }
//!
//! let registry = Registry::new();
//! let reporter = Arc::new(PanicReporter::new());
//! let cache = MockCache {
//!     mock: registry.create(
//!         reporter.clone(),
//!         [
//!             // Called exactly once; the delegate sees the stub's arguments.
//!             expect("Put", |key: String, value: i64| -> Result<(), Failure> {
//!                 assert_eq!(("foo", 42), (key.as_str(), value));
//!                 Ok(())
//!             }),
//!             expect("Get", |_key: String| (42_i64, true)),
//!             // Serves every later call, observing the zero-based count.
//!             expect_many("Load", |count: CallCount, keys: Vec<String>| {
//!                 let _ = (count, keys);
//!             }),
//!         ],
//!     ),
//! };
//!
//! cache.put("foo", 42).unwrap();
//! assert_eq!((42, true), cache.get("foo"));
//! cache.load(&["a", "b"]);
//! cache.load(&["c"]);
//!
//! // Fails the test for every registered call that never happened.
//! assert_expected_calls(reporter.as_ref(), &[&cache.mock]);
//! ```
//!
//! Expectation violations (a call with no delegate left, a call out of
//! declared order, a registration never called) are reported through the
//! mock's [`Reporter`] and accumulate without aborting the code under test,
//! which instead observes zero values plus a [`Failure`] in its last result
//! slot when that slot can carry one. Broken fixtures (argument or result
//! shapes that cannot match, dispatch after teardown) panic immediately.
//!
//! Mocks are safe to share across threads; each operation serves one call
//! at a time while different operations dispatch in parallel.

#![forbid(unsafe_code)]

mod callable;
mod clause;
mod delegate;
mod error;
mod eval;
mod mock;
mod output;
mod registry;
mod reporter;
mod teardown;

pub use callable::{
    Args, CallCount, Callable, IntoCallable, IntoMultiCallable, Signature, Value,
};
pub use clause::{expect, expect_any_order, expect_in_order, expect_many, unused, Clause};
pub use delegate::Delegate;
pub use error::Failure;
pub use output::{ResultShape, Slot};
pub use registry::{Handle, MockId, Registry};
pub use reporter::{PanicReporter, RecordingReporter, Reporter, ReporterHandle};
pub use teardown::assert_expected_calls;
