use crate::callable::{Callable, IntoCallable, IntoMultiCallable};
use crate::mock::MockState;

/// One configuration step applied when a mock is created: a delegate
/// registration, or an ordering scope wrapping nested clauses.
pub struct Clause(ClauseKind);

enum ClauseKind {
    Register { name: String, callable: Callable },
    Ordered { in_order: bool, clauses: Vec<Clause> },
    Unused,
}

/// Register a function to be called exactly once, at its registration
/// position, when the named operation is invoked on the mock.
pub fn expect<M>(name: impl Into<String>, delegate: impl IntoCallable<M>) -> Clause {
    Clause(ClauseKind::Register {
        name: name.into(),
        callable: delegate.into_callable(),
    })
}

/// Register a function for the named operation that, once reached, serves
/// every later call. It receives the zero-based [`CallCount`](crate::CallCount)
/// when its signature accepts one.
pub fn expect_many<M>(name: impl Into<String>, delegate: impl IntoMultiCallable<M>) -> Clause {
    Clause(ClauseKind::Register {
        name: name.into(),
        callable: delegate.into_callable(),
    })
}

/// Require the nested registrations to be called in the order given, even
/// across different operations. Nests with [`expect_any_order`]; the outer
/// mode is restored when the scope ends.
pub fn expect_in_order(clauses: impl IntoIterator<Item = Clause>) -> Clause {
    Clause(ClauseKind::Ordered {
        in_order: true,
        clauses: clauses.into_iter().collect(),
    })
}

/// Lift the ordering requirement for the nested registrations.
pub fn expect_any_order(clauses: impl IntoIterator<Item = Clause>) -> Clause {
    Clause(ClauseKind::Ordered {
        in_order: false,
        clauses: clauses.into_iter().collect(),
    })
}

/// A clause that registers nothing: states the intent that the mock is not
/// expected to receive any calls.
pub fn unused() -> Clause {
    Clause(ClauseKind::Unused)
}

pub(crate) fn apply(clause: Clause, state: &MockState) {
    match clause.0 {
        ClauseKind::Register { name, mut callable } => {
            if state.in_order() {
                callable.stamp_ordinal(state.bump_ordinal());
            }
            state.delegate_by_name(&name).append(callable);
        }
        ClauseKind::Ordered { in_order, clauses } => {
            let prior = state.set_in_order(in_order);
            for clause in clauses {
                apply(clause, state);
            }
            state.set_in_order(prior);
        }
        ClauseKind::Unused => {}
    }
}
