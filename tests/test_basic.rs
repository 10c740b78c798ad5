use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use standin::{
    args, assert_expected_calls, expect, expect_many, CallCount, Failure, Handle,
    RecordingReporter, Registry, ReporterHandle,
};

/// Hand-written stub for a small cache collaborator, shaped the way a
/// generator would emit it: one method per operation, each forwarding to a
/// typed call helper.
struct MockCache {
    mock: Handle,
}

impl MockCache {
    fn put(&self, key: &str, value: String) -> Result<(), Failure> {
        self.mock.call1("Put", args![key.to_string(), value])
    }

    fn get(&self, key: &str) -> (String, bool) {
        self.mock.call2("Get", args![key.to_string()])
    }

    fn delete(&self, key: &str) {
        self.mock.call0("Delete", args![key.to_string()])
    }

    fn load(&self, keys: &[&str]) {
        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        self.mock.call0("Load", args![keys])
    }
}

fn mock_cache(reporter: &Arc<RecordingReporter>, clauses: Vec<standin::Clause>) -> MockCache {
    MockCache {
        mock: Registry::new().create(reporter.clone(), clauses),
    }
}

#[test]
fn delegates_run_at_their_registration_position() {
    let reporter = Arc::new(RecordingReporter::new());
    let called = Arc::new(Mutex::new(Vec::new()));

    let trace = called.clone();
    let cache = mock_cache(
        &reporter,
        vec![
            expect("Put", move |key: String, value: String| -> Result<(), Failure> {
                trace.lock().unwrap().push(format!("put {key} {value}"));
                Ok(())
            }),
            expect("Get", {
                let trace = called.clone();
                move |key: String| -> (String, bool) {
                    trace.lock().unwrap().push(format!("get {key}"));
                    ("bar".to_string(), true)
                }
            }),
            expect("Delete", {
                let trace = called.clone();
                move |key: String| trace.lock().unwrap().push(format!("delete {key}"))
            }),
        ],
    );

    cache.put("foo", "bar".to_string()).unwrap();
    assert_eq!(("bar".to_string(), true), cache.get("foo"));
    cache.delete("foo");

    assert_eq!(
        vec!["put foo bar", "get foo", "delete foo"],
        *called.lock().unwrap()
    );
    assert_eq!(Vec::<String>::new(), reporter.errors());
    assert_expected_calls(reporter.as_ref(), &[&cache.mock]);
    assert!(!reporter.failed());
}

#[test]
fn delegates_may_take_the_reporter_first() {
    let reporter = Arc::new(RecordingReporter::new());
    let cache = mock_cache(
        &reporter,
        vec![expect("Delete", |t: ReporterHandle, key: String| {
            t.log(&format!("deleting {key}"));
        })],
    );

    cache.delete("foo");

    assert!(reporter.logs().contains(&"deleting foo".to_string()));
    assert!(!reporter.failed());
}

#[test]
fn dispatch_logs_call_count_and_ordinal() {
    let reporter = Arc::new(RecordingReporter::new());
    let cache = mock_cache(
        &reporter,
        vec![
            expect("Delete", |_key: String| {}),
            expect("Delete", |_key: String| {}),
        ],
    );

    cache.delete("foo");
    cache.delete("foo");

    assert_eq!(
        vec!["call to Delete: 0/0", "call to Delete: 1/0"],
        reporter.logs()
    );
}

#[test]
fn multi_delegate_observes_increasing_call_counts() {
    let reporter = Arc::new(RecordingReporter::new());
    let observed = Arc::new(Mutex::new(Vec::new()));

    let trace = observed.clone();
    let cache = mock_cache(
        &reporter,
        vec![expect_many("Load", move |count: CallCount, keys: Vec<String>| {
            trace.lock().unwrap().push((count.0, keys));
        })],
    );

    cache.load(&["a", "b"]);
    cache.load(&["c"]);

    assert_eq!(
        vec![
            (0, vec!["a".to_string(), "b".to_string()]),
            (1, vec!["c".to_string()]),
        ],
        *observed.lock().unwrap()
    );
    assert!(!reporter.failed());
    assert_expected_calls(reporter.as_ref(), &[&cache.mock]);
}

#[test]
fn queue_walks_positions_then_repeats_the_multi_tail() {
    let reporter = Arc::new(RecordingReporter::new());
    let observed = Arc::new(Mutex::new(Vec::new()));

    let tag = |label: &'static str, trace: Arc<Mutex<Vec<(&'static str, usize)>>>| {
        move |count: CallCount, _keys: Vec<String>| {
            trace.lock().unwrap().push((label, count.0));
        }
    };

    let cache = mock_cache(
        &reporter,
        vec![
            expect_many("Load", tag("first", observed.clone())),
            expect_many("Load", tag("second", observed.clone())),
            expect_many("Load", tag("tail", observed.clone())),
        ],
    );

    for _ in 0..5 {
        cache.load(&["x"]);
    }

    assert_eq!(
        vec![
            ("first", 0),
            ("second", 1),
            ("tail", 2),
            ("tail", 3),
            ("tail", 4),
        ],
        *observed.lock().unwrap()
    );
    assert!(!reporter.failed());
}

#[test]
fn single_delegates_may_share_an_operation_with_a_multi_tail() {
    let reporter = Arc::new(RecordingReporter::new());
    let observed = Arc::new(Mutex::new(Vec::new()));

    let trace = observed.clone();
    let tail = observed.clone();
    let cache = mock_cache(
        &reporter,
        vec![
            expect("Delete", move |key: String| {
                trace.lock().unwrap().push(format!("once {key}"));
            }),
            expect_many("Delete", move |key: String| {
                tail.lock().unwrap().push(format!("many {key}"));
            }),
        ],
    );

    cache.delete("a");
    cache.delete("b");
    cache.delete("c");

    assert_eq!(
        vec!["once a", "many b", "many c"],
        *observed.lock().unwrap()
    );
    assert!(!reporter.failed());
}
