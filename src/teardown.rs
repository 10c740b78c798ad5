use crate::callable::CallCount;
use crate::error::Violation;
use crate::registry::Handle;
use crate::reporter::Reporter;

/// Verify that every registered delegate of each mock has been called
/// through its queue.
///
/// For every operation whose queue length exceeds its call count, reports
/// how many calls remain owed through `reporter`. Overflow and ordering
/// violations are reported at dispatch time; this covers the other side of
/// the contract, calls that never happened. A handle whose mock was already
/// torn down is fatal.
pub fn assert_expected_calls(reporter: &dyn Reporter, handles: &[&Handle]) {
    reporter.helper();

    for handle in handles {
        let Some(state) = handle.state() else {
            reporter.fatal(&format!("mock not found: {}", handle.id()));
        };

        for (name, delegate) in state.delegates() {
            let count = delegate.call_count();
            if count < delegate.len() {
                let violation = Violation::UnfulfilledCalls {
                    name,
                    count: CallCount(count),
                };
                reporter.error(&violation.to_string());
            }
        }
    }
}
