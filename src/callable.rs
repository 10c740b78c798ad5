use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::reporter::{Reporter, ReporterHandle};

/// Zero-based number of dispatches an operation has served.
///
/// A multi-invocation delegate whose first parameter (after an optional
/// reporter) is `CallCount` receives the count of the call being served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallCount(pub usize);

impl std::fmt::Display for CallCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CallCount> for usize {
    fn from(count: CallCount) -> usize {
        count.0
    }
}

/// One type-erased argument or result, tagged with its type name for
/// diagnostics.
pub struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The type name recorded when the value was boxed.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the concrete value, or get `self` back on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Value { inner, type_name }),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

/// Positional arguments for one invocation, as supplied by a stub method.
///
/// Build with the [`args!`](crate::args) macro. A variadic tail is passed as
/// one trailing sequence value (e.g. a `Vec`), never spread.
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn prepend(mut self, value: Value) -> Self {
        self.values.insert(0, value);
        self
    }

    /// Arity check at the stub/delegate seam. A mismatch means the fixture
    /// itself is broken, so this faults rather than reporting.
    pub(crate) fn into_values(self, expected: usize) -> std::vec::IntoIter<Value> {
        if self.values.len() != expected {
            panic!(
                "delegate expected {expected} argument(s), got {}",
                self.values.len()
            );
        }
        self.values.into_iter()
    }
}

/// Build an [`Args`] list from positional expressions.
#[macro_export]
macro_rules! args {
    () => { $crate::Args::empty() };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::from_values(::std::vec![$($crate::Value::new($value)),+])
    };
}

pub(crate) fn take_arg<T: Any>(values: &mut std::vec::IntoIter<Value>, position: usize) -> T {
    let value = values.next().expect("argument count already checked");
    let actual = value.type_name();
    match value.downcast::<T>() {
        Ok(value) => value,
        Err(_) => panic!(
            "argument {position}: expected {}, got {actual}",
            std::any::type_name::<T>()
        ),
    }
}

type Trampoline = Box<dyn Fn(&Arc<dyn Reporter>, CallCount, Args) -> Value + Send + Sync>;

/// One registered stand-in function: an invocation trampoline plus its
/// capability (single or multi-invocation) and, once configuration stamps
/// it, the ordinal it must match at call time.
pub struct Callable {
    trampoline: Trampoline,
    multi: bool,
    expected_ordinal: Option<usize>,
}

impl Callable {
    pub(crate) fn single(trampoline: Trampoline) -> Self {
        Self {
            trampoline,
            multi: false,
            expected_ordinal: None,
        }
    }

    pub(crate) fn multi(trampoline: Trampoline) -> Self {
        Self {
            trampoline,
            multi: true,
            expected_ordinal: None,
        }
    }

    pub(crate) fn is_multi(&self) -> bool {
        self.multi
    }

    pub(crate) fn expected_ordinal(&self) -> Option<usize> {
        self.expected_ordinal
    }

    pub(crate) fn stamp_ordinal(&mut self, ordinal: usize) {
        self.expected_ordinal = Some(ordinal);
    }

    pub(crate) fn call(&self, reporter: &Arc<dyn Reporter>, count: CallCount, args: Args) -> Value {
        (self.trampoline)(reporter, count, args)
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callable")
            .field("multi", &self.multi)
            .field("expected_ordinal", &self.expected_ordinal)
            .finish_non_exhaustive()
    }
}

/// Marker carrying a delegate function's signature, so the adapter traits
/// can be implemented once per arity without overlapping.
pub struct Signature<A, O>(PhantomData<fn(A) -> O>);

/// Adapts a function into a single-invocation [`Callable`].
///
/// Implemented for `Fn(A0..An) -> O` with arities 0 through 8. A leading
/// [`ReporterHandle`] parameter opts the delegate into receiving the
/// mock's reporter; the remaining parameter types must match the boxed
/// argument types exactly, so closure parameters need type annotations.
pub trait IntoCallable<Marker> {
    fn into_callable(self) -> Callable;
}

/// Adapts a function into a multi-invocation [`Callable`].
///
/// Accepts the same shapes as [`IntoCallable`]. In addition, a leading
/// [`CallCount`] parameter (after the reporter, when both are present)
/// opts the delegate into observing which repetition it is serving.
pub trait IntoMultiCallable<Marker> {
    fn into_callable(self) -> Callable;
}

/// What the declared leading parameters opt the delegate into. Decided
/// once, at registration, from the parameter types.
#[derive(Clone, Copy)]
struct Prefix {
    reporter: bool,
    count: bool,
}

impl Prefix {
    fn of(params: &[TypeId], multi: bool) -> Self {
        let reporter = params.first() == Some(&TypeId::of::<ReporterHandle>());
        let rest = if reporter { 1 } else { 0 };
        let count = multi && params.get(rest) == Some(&TypeId::of::<CallCount>());
        Prefix { reporter, count }
    }

    fn apply(self, reporter: &Arc<dyn Reporter>, count: CallCount, args: Args) -> Args {
        let args = if self.count {
            args.prepend(Value::new(count))
        } else {
            args
        };
        if self.reporter {
            args.prepend(Value::new(ReporterHandle::new(Arc::clone(reporter))))
        } else {
            args
        }
    }
}

macro_rules! impl_delegate_adapters {
    ($($arg:ident $idx:tt),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<Func, Out, $($arg,)*> IntoCallable<Signature<($($arg,)*), Out>> for Func
        where
            Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
            Out: Any,
            $($arg: Any,)*
        {
            fn into_callable(self) -> Callable {
                let prefix = Prefix::of(&[$(TypeId::of::<$arg>()),*], false);
                Callable::single(Box::new(move |reporter: &Arc<dyn Reporter>, count: CallCount, args: Args| {
                    let args = prefix.apply(reporter, count, args);
                    let mut values = args.into_values(0usize $(+ { let _ = stringify!($arg); 1usize })*);
                    $(let $arg = take_arg::<$arg>(&mut values, $idx);)*
                    Value::new(self($($arg),*))
                }))
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<Func, Out, $($arg,)*> IntoMultiCallable<Signature<($($arg,)*), Out>> for Func
        where
            Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
            Out: Any,
            $($arg: Any,)*
        {
            fn into_callable(self) -> Callable {
                let prefix = Prefix::of(&[$(TypeId::of::<$arg>()),*], true);
                Callable::multi(Box::new(move |reporter: &Arc<dyn Reporter>, count: CallCount, args: Args| {
                    let args = prefix.apply(reporter, count, args);
                    let mut values = args.into_values(0usize $(+ { let _ = stringify!($arg); 1usize })*);
                    $(let $arg = take_arg::<$arg>(&mut values, $idx);)*
                    Value::new(self($($arg),*))
                }))
            }
        }
    };
}

impl_delegate_adapters!();
impl_delegate_adapters!(A0 0);
impl_delegate_adapters!(A0 0, A1 1);
impl_delegate_adapters!(A0 0, A1 1, A2 2);
impl_delegate_adapters!(A0 0, A1 1, A2 2, A3 3);
impl_delegate_adapters!(A0 0, A1 1, A2 2, A3 3, A4 4);
impl_delegate_adapters!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);
impl_delegate_adapters!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);
impl_delegate_adapters!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::RecordingReporter;

    fn invoke(callable: &Callable, count: usize, args: Args) -> Value {
        let reporter: Arc<dyn Reporter> = Arc::new(RecordingReporter::new());
        callable.call(&reporter, CallCount(count), args)
    }

    #[test]
    fn adapter_unpacks_arguments_positionally() {
        let callable =
            IntoCallable::into_callable(|a: String, b: i32| -> String { format!("{a}:{b}") });
        let out = invoke(&callable, 0, args!["x".to_string(), 7_i32]);
        assert_eq!("x:7", out.downcast::<String>().unwrap());
    }

    #[test]
    fn leading_reporter_parameter_is_injected() {
        let callable = IntoCallable::into_callable(|t: ReporterHandle, key: String| {
            t.log(&format!("saw {key}"));
        });
        let reporter = Arc::new(RecordingReporter::new());
        let dyn_reporter: Arc<dyn Reporter> = reporter.clone();
        callable.call(&dyn_reporter, CallCount(0), args!["k".to_string()]);
        assert_eq!(vec!["saw k"], reporter.logs());
    }

    #[test]
    fn leading_count_parameter_is_injected_for_multi() {
        let callable = IntoMultiCallable::into_callable(|n: CallCount, key: String| -> usize {
            n.0 + key.len()
        });
        let out = invoke(&callable, 3, args!["ab".to_string()]);
        assert_eq!(5, out.downcast::<usize>().unwrap());
        assert!(callable.is_multi());
    }

    #[test]
    fn count_is_not_injected_for_single_callables() {
        let callable = IntoCallable::into_callable(|n: CallCount| -> usize { n.0 });
        // The caller must supply the CallCount argument itself.
        let out = invoke(&callable, 7, args![CallCount(42)]);
        assert_eq!(42, out.downcast::<usize>().unwrap());
    }

    #[test]
    fn reporter_then_count_are_injected_in_order() {
        let callable = IntoMultiCallable::into_callable(
            |t: ReporterHandle, n: CallCount, key: String| {
                t.log(&format!("{n}:{key}"));
            },
        );
        let reporter = Arc::new(RecordingReporter::new());
        let dyn_reporter: Arc<dyn Reporter> = reporter.clone();
        callable.call(&dyn_reporter, CallCount(2), args!["k".to_string()]);
        assert_eq!(vec!["2:k"], reporter.logs());
    }

    #[test]
    #[should_panic(expected = "argument 1: expected i32")]
    fn argument_type_mismatch_faults() {
        let callable = IntoCallable::into_callable(|_a: String, _b: i32| {});
        invoke(&callable, 0, args!["x".to_string(), "y".to_string()]);
    }

    #[test]
    #[should_panic(expected = "delegate expected 2 argument(s), got 1")]
    fn argument_arity_mismatch_faults() {
        let callable = IntoCallable::into_callable(|_a: String, _b: i32| {});
        invoke(&callable, 0, args!["x".to_string()]);
    }
}
