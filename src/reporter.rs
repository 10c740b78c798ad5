use std::sync::{Arc, Mutex, PoisonError};

/// The capability set a mock uses to talk to its owning test.
///
/// This is the seam between the dispatch engine and whatever test harness
/// hosts it: expectation violations go through [`error`](Reporter::error),
/// broken-fixture conditions through [`fatal`](Reporter::fatal), and
/// dispatch diagnostics through [`log`](Reporter::log). Formatting happens
/// at the call site, so a single `&str` method covers both the plain and
/// `*f` flavors of each capability.
///
/// Implementations must be safe to share between threads; dispatch may
/// report from any thread that calls into the mock.
pub trait Reporter: Send + Sync + 'static {
    /// Record a non-fatal test failure. The test keeps running.
    fn error(&self, message: &str);

    /// Abort the unit of work. The fixture itself is broken.
    fn fatal(&self, message: &str) -> !;

    /// Record a diagnostic line.
    fn log(&self, message: &str);

    /// Marks the enclosing function as a test helper. A hook for harnesses
    /// that attribute failures to call sites; the default does nothing.
    fn helper(&self) {}
}

/// A cheap, clonable handle to the reporter a mock is bound to.
///
/// A delegate that declares `ReporterHandle` as its first parameter
/// receives the owning mock's reporter at each invocation, the way a Go
/// delegate receives `testing.TB`.
#[derive(Clone)]
pub struct ReporterHandle {
    inner: Arc<dyn Reporter>,
}

impl ReporterHandle {
    pub(crate) fn new(inner: Arc<dyn Reporter>) -> Self {
        Self { inner }
    }

    pub fn error(&self, message: &str) {
        self.inner.error(message)
    }

    pub fn fatal(&self, message: &str) -> ! {
        self.inner.fatal(message)
    }

    pub fn log(&self, message: &str) {
        self.inner.log(message)
    }

    pub fn helper(&self) {
        self.inner.helper()
    }
}

#[derive(Default)]
struct Record {
    errors: Vec<String>,
    logs: Vec<String>,
}

/// The stock reporter for ordinary tests.
///
/// Errors are printed to stderr as they happen and accumulate; when the
/// reporter goes out of scope at the end of the test it panics if any were
/// recorded, failing the test. Fatal reports panic immediately.
#[derive(Default)]
pub struct PanicReporter {
    record: Mutex<Record>,
}

impl PanicReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for PanicReporter {
    fn error(&self, message: &str) {
        eprintln!("standin: {message}");
        lock(&self.record).errors.push(message.to_string());
    }

    fn fatal(&self, message: &str) -> ! {
        panic!("standin: {message}");
    }

    fn log(&self, message: &str) {
        eprintln!("standin: {message}");
    }
}

impl Drop for PanicReporter {
    fn drop(&mut self) {
        // A panic mid-flight already fails the test; don't double-panic.
        if std::thread::panicking() {
            return;
        }
        let errors = std::mem::take(&mut lock(&self.record).errors);
        if !errors.is_empty() {
            panic!(
                "standin: {} failure(s) reported:\n{}",
                errors.len(),
                errors.join("\n")
            );
        }
    }
}

/// A reporter that only records, for inspecting what a mock reported.
///
/// Useful when testing the fixtures themselves: wire a mock to a
/// `RecordingReporter`, drive it, then assert on [`errors`](Self::errors)
/// and [`logs`](Self::logs) instead of failing the surrounding test.
/// Fatal reports still panic, since they must not return.
#[derive(Default)]
pub struct RecordingReporter {
    record: Mutex<Record>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages reported through [`Reporter::error`] so far.
    pub fn errors(&self) -> Vec<String> {
        lock(&self.record).errors.clone()
    }

    /// All messages reported through [`Reporter::log`] so far.
    pub fn logs(&self) -> Vec<String> {
        lock(&self.record).logs.clone()
    }

    /// True if any error has been reported.
    pub fn failed(&self) -> bool {
        !lock(&self.record).errors.is_empty()
    }
}

impl Reporter for RecordingReporter {
    fn error(&self, message: &str) {
        lock(&self.record).errors.push(message.to_string());
    }

    fn fatal(&self, message: &str) -> ! {
        {
            lock(&self.record).errors.push(message.to_string());
        }
        panic!("standin: {message}");
    }

    fn log(&self, message: &str) {
        lock(&self.record).logs.push(message.to_string());
    }
}

// A panicking delegate must not wedge the reporter for the rest of the test.
fn lock(record: &Mutex<Record>) -> std::sync::MutexGuard<'_, Record> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}
