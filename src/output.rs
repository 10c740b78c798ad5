use crate::callable::{Args, Value};
use crate::error::{Failure, Violation};
use crate::registry::Handle;

/// One declared result slot.
///
/// `zero` produces the slot's default value, used when a violation prevents
/// real results. `from_failure` converts a [`Failure`] into the slot when
/// the slot's type can carry one; the blanket answer is "it cannot".
/// `Result<T, E>` with `E: From<Failure>` is the stock failure-capable
/// slot. Use [`impl_slot!`](crate::impl_slot) to register additional
/// default-constructible types.
pub trait Slot: Sized + 'static {
    fn zero() -> Self;

    fn from_failure(failure: Failure) -> Option<Self> {
        let _ = failure;
        None
    }
}

/// Implement [`Slot`] for types whose zero value is [`Default`].
#[macro_export]
macro_rules! impl_slot {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Slot for $ty {
                fn zero() -> Self {
                    <$ty as ::core::default::Default>::default()
                }
            }
        )*
    };
}

impl_slot!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    std::time::Duration,
    std::path::PathBuf,
);

impl Slot for &'static str {
    fn zero() -> Self {
        ""
    }
}

impl<T: 'static> Slot for Option<T> {
    fn zero() -> Self {
        None
    }
}

impl<T: 'static> Slot for Vec<T> {
    fn zero() -> Self {
        Vec::new()
    }
}

impl<T: 'static> Slot for std::collections::VecDeque<T> {
    fn zero() -> Self {
        Self::new()
    }
}

impl<K: 'static, V: 'static> Slot for std::collections::HashMap<K, V> {
    fn zero() -> Self {
        Self::new()
    }
}

impl<K: 'static, V: 'static> Slot for std::collections::BTreeMap<K, V> {
    fn zero() -> Self {
        Self::new()
    }
}

impl<T: 'static> Slot for std::collections::HashSet<T> {
    fn zero() -> Self {
        Self::new()
    }
}

impl<T: 'static> Slot for std::collections::BTreeSet<T> {
    fn zero() -> Self {
        Self::new()
    }
}

impl<T: Slot> Slot for Box<T> {
    fn zero() -> Self {
        Box::new(T::zero())
    }
}

impl<T: Slot, E: From<Failure> + 'static> Slot for Result<T, E> {
    fn zero() -> Self {
        Ok(T::zero())
    }

    fn from_failure(failure: Failure) -> Option<Self> {
        Some(Err(E::from(failure)))
    }
}

/// Describes the declared result slots of one invocation: the type a
/// delegate's return must downcast to, and how to synthesize a degraded
/// result when no callable is available.
///
/// Stub methods normally go through `call0`..`call9`, which build the
/// shape themselves; the constructors are public for generated code that
/// drives [`Handle::dispatch`] directly.
pub struct ResultShape {
    type_name: &'static str,
    synth: fn(Failure) -> Value,
}

impl ResultShape {
    /// The expected type of a delegate's raw return for this shape.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Zero-valued results shaped by the declared slots, with the last slot
    /// carrying the failure when it can; callers that check an error
    /// observe the synthetic failure without faulting.
    pub(crate) fn synthesize(&self, failure: Failure) -> Value {
        (self.synth)(failure)
    }

    /// No declared results.
    pub fn of0() -> Self {
        fn synth(_failure: Failure) -> Value {
            Value::new(())
        }
        Self {
            type_name: std::any::type_name::<()>(),
            synth,
        }
    }

    /// A single declared result.
    pub fn of1<T1: Slot>() -> Self {
        fn synth<T1: Slot>(failure: Failure) -> Value {
            Value::new(T1::from_failure(failure).unwrap_or_else(T1::zero))
        }
        Self {
            type_name: std::any::type_name::<T1>(),
            synth: synth::<T1>,
        }
    }
}

impl Handle {
    /// Invoke the named operation, discarding any results.
    pub fn call0(&self, name: &str, args: Args) {
        let state = self.resolve(name);
        state.reporter().helper();
        let _ = crate::eval::dispatch(&state, name, &ResultShape::of0(), args);
    }

    /// Invoke the named operation, marshaling one declared result.
    pub fn call1<T1: Slot>(&self, name: &str, args: Args) -> T1 {
        let state = self.resolve(name);
        state.reporter().helper();
        let shape = ResultShape::of1::<T1>();
        let raw = crate::eval::dispatch(&state, name, &shape, args);
        let actual = raw.type_name();
        match raw.downcast::<T1>() {
            Ok(result) => result,
            Err(_) => {
                let violation = Violation::ResultMismatch {
                    name: name.to_string(),
                    expected: shape.type_name(),
                    actual,
                };
                state.reporter().error(&violation.to_string());
                match T1::from_failure(Failure::new(&violation)) {
                    Some(last) => last,
                    None => panic!("{violation}"),
                }
            }
        }
    }
}

macro_rules! impl_call_n {
    ($call:ident, $of:ident; $($head:ident),+; $last:ident) => {
        impl ResultShape {
            pub fn $of<$($head: Slot,)+ $last: Slot>() -> ResultShape {
                fn synth<$($head: Slot,)+ $last: Slot>(failure: Failure) -> Value {
                    Value::new((
                        $($head::zero(),)+
                        $last::from_failure(failure).unwrap_or_else($last::zero),
                    ))
                }
                ResultShape {
                    type_name: std::any::type_name::<($($head,)+ $last)>(),
                    synth: synth::<$($head,)+ $last>,
                }
            }
        }

        impl Handle {
            /// Invoke the named operation, marshaling the declared results.
            /// A mismatch between the delegate's return and the declared
            /// slots converts to a failure on the last slot when it can
            /// carry one, and faults otherwise.
            pub fn $call<$($head: Slot,)+ $last: Slot>(
                &self,
                name: &str,
                args: Args,
            ) -> ($($head,)+ $last) {
                let state = self.resolve(name);
                state.reporter().helper();
                let shape = ResultShape::$of::<$($head,)+ $last>();
                let raw = crate::eval::dispatch(&state, name, &shape, args);
                let actual = raw.type_name();
                match raw.downcast::<($($head,)+ $last)>() {
                    Ok(results) => results,
                    Err(_) => {
                        let violation = Violation::ResultMismatch {
                            name: name.to_string(),
                            expected: shape.type_name(),
                            actual,
                        };
                        state.reporter().error(&violation.to_string());
                        match $last::from_failure(Failure::new(&violation)) {
                            Some(last) => ($($head::zero(),)+ last),
                            None => panic!("{violation}"),
                        }
                    }
                }
            }
        }
    };
}

impl_call_n!(call2, of2; T1; T2);
impl_call_n!(call3, of3; T1, T2; T3);
impl_call_n!(call4, of4; T1, T2, T3; T4);
impl_call_n!(call5, of5; T1, T2, T3, T4; T5);
impl_call_n!(call6, of6; T1, T2, T3, T4, T5; T6);
impl_call_n!(call7, of7; T1, T2, T3, T4, T5, T6; T7);
impl_call_n!(call8, of8; T1, T2, T3, T4, T5, T6, T7; T8);
impl_call_n!(call9, of9; T1, T2, T3, T4, T5, T6, T7, T8; T9);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_slot_is_failure_capable() {
        let failure = Failure::new(&Violation::UnexpectedCall {
            name: "Get".to_string(),
        });
        let slot: Option<Result<String, Failure>> = Slot::from_failure(failure);
        let err = slot.unwrap().unwrap_err();
        assert_eq!("unexpected call to Get", err.message());
    }

    #[test]
    fn plain_slots_are_not() {
        let failure = Failure::new(&Violation::UnexpectedCall {
            name: "Get".to_string(),
        });
        assert!(<String as Slot>::from_failure(failure).is_none());
        assert_eq!("", String::zero());
        assert_eq!(0, i32::zero());
    }

    #[test]
    fn synthesized_shape_zeroes_heads_and_fails_the_tail() {
        let shape = ResultShape::of2::<String, Result<bool, Failure>>();
        let failure = Failure::new(&Violation::UnexpectedCall {
            name: "Get".to_string(),
        });
        let (head, tail) = shape
            .synthesize(failure)
            .downcast::<(String, Result<bool, Failure>)>()
            .unwrap();
        assert_eq!("", head);
        assert_eq!("unexpected call to Get", tail.unwrap_err().message());
    }
}
