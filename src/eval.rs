use crate::callable::{Args, CallCount, Value};
use crate::error::{Failure, Violation};
use crate::mock::MockState;
use crate::output::ResultShape;

/// Dispatch one invocation of a named operation.
///
/// Holds the delegate lock from selection through invocation and counter
/// bump, so call counts are assigned deterministically and one operation
/// serves at most one call at a time. The mock-level ordering lock is only
/// ever taken while the delegate lock is held, never the other way around.
pub(crate) fn dispatch(state: &MockState, name: &str, shape: &ResultShape, args: Args) -> Value {
    let reporter = state.reporter();
    reporter.helper();

    let delegate = state.delegate_by_name(name);
    let mut core = delegate.lock();

    if !core.can_serve() {
        let violation = Violation::UnexpectedCall {
            name: name.to_string(),
        };
        reporter.error(&violation.to_string());
        return shape.synthesize(Failure::new(&violation));
    }

    let count = core.call_count();
    let callable = core.select(count);

    let ordinal = match callable.expected_ordinal() {
        Some(expected) => {
            let actual = state.bump_ordinal();
            if actual != expected {
                let violation = Violation::OutOfOrder {
                    name: name.to_string(),
                    expected_ordinal: expected,
                    actual_ordinal: actual,
                };
                // Reported, not fatal: the call still proceeds so downstream
                // effects stay observable.
                reporter.error(&violation.to_string());
            }
            actual
        }
        None => state.current_ordinal(),
    };

    reporter.log(&format!("call to {name}: {count}/{ordinal}"));

    // Count the call even if the delegate panics out of the dispatch.
    let _bump = Bump(core.call_count_mut());
    callable.call(reporter, CallCount(count), args)
}

struct Bump<'a>(&'a mut usize);

impl Drop for Bump<'_> {
    fn drop(&mut self) {
        *self.0 += 1;
    }
}
