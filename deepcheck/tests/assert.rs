use std::{error::Error as StdError, fmt};

use deepcheck::{
    assert::{self, TestingT, Unsupported},
    assert_equal, assert_that, is, Checker, Inspect,
};

fn setup() {
    deepcheck_logger::test_setup("trace");
}

#[derive(Default)]
struct Recorder {
    logs: Vec<String>,
    failed: bool,
}

impl TestingT for Recorder {
    fn fail(&mut self) {
        self.failed = true;
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) -> Result<(), Unsupported> {
        self.logs.push(args.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct PlainLog {
    logs: Vec<String>,
    failed: bool,
}

impl TestingT for PlainLog {
    fn fail(&mut self) {
        self.failed = true;
    }

    fn log(&mut self, msg: &str) -> Result<(), Unsupported> {
        self.logs.push(msg.to_string());
        Ok(())
    }
}

struct Silent;

impl TestingT for Silent {
    fn fail(&mut self) {}
}

fn location() -> String {
    format!("{}:", file!())
}

#[test]
fn passing_assertions_stay_quiet() {
    setup();
    let mut t = Recorder::default();

    assert!(assert::is_true(&mut t, true, None));
    assert!(assert::is_false(&mut t, false, None));
    assert!(assert::nil(&mut t, &None::<u8>, None));
    assert!(assert::not_nil(&mut t, &Some(1u8), None));
    assert!(assert::equal(&mut t, &vec!["a"], &vec!["a"], None));
    assert!(assert::not_equal(&mut t, &1u8, &2u8, None));

    assert!(t.logs.is_empty());
    assert!(!t.failed);
}

#[test]
fn failures_are_logged_with_location() {
    setup();
    let mut t = Recorder::default();

    assert!(!assert::is_true(&mut t, false, Some(format_args!("flag {}", "ready"))));

    assert!(t.failed);
    assert_eq!(t.logs.len(), 1);
    let log = &t.logs[0];
    assert!(log.starts_with(&location()), "{log}");
    assert!(log.ends_with(": Want true\nflag ready\n"), "{log}");
}

#[test]
fn plain_log_fallback() {
    setup();
    let mut t = PlainLog::default();

    assert!(!assert::equal(&mut t, &1u32, &2u32, None));

    assert!(t.failed);
    assert!(
        t.logs[0].ends_with(": Not equal:\nExpected: 1\nActual:   2\nDiff:\n$: 1 != 2\n"),
        "{}",
        t.logs[0]
    );
}

#[test]
#[should_panic(expected = "unsupported testing handle")]
fn handle_without_logging() {
    assert::is_true(&mut Silent, false, None);
}

#[derive(Debug, PartialEq)]
struct Timeout;

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out")
    }
}

impl StdError for Timeout {}

#[test]
fn error_assertions() {
    setup();
    let mut t = Recorder::default();
    let failed: Result<(), Timeout> = Err(Timeout);
    let done: Result<(), Timeout> = Ok(());

    assert!(assert::error(&mut t, &failed, None));
    assert!(assert::error_is(&mut t, &failed, &Timeout, None));
    assert!(assert::no_error(&mut t, &done, None));
    assert!(t.logs.is_empty());

    assert!(!assert::no_error(&mut t, &failed, None));
    assert!(t.logs[0].ends_with(": Error: timed out (type: Timeout)\n"));
}

#[test]
fn any_and_all() {
    setup();
    let mut t = Recorder::default();
    let pass = is::is_true(true);
    let miss = is::is_false(true);

    assert!(assert::any(&mut t, &[&miss, &pass], None));
    assert!(!assert::all(&mut t, &[&pass, &miss], None));
    assert_eq!(t.logs.len(), 1);
    assert!(t.logs[0].ends_with(": Want false\n"));

    let other = is::is_true(false);
    let checkers: [&dyn Checker; 2] = [&miss, &other];
    assert!(!assert::any(&mut t, &checkers, None));
    assert!(t.logs[1].ends_with(": Want false\nWant true\n"), "{}", t.logs[1]);
}

#[derive(Inspect)]
struct Session {
    user: String,
    #[deep = "compare=false"]
    started: u64,
}

#[test]
fn macros_pass() {
    setup();
    assert_that!(is::is_true(true));
    assert_that!(is::not_equal(&"a", &"b"), "letters {}", 2);
    assert_equal!(
        Session { user: "ann".into(), started: 1 },
        Session { user: "ann".into(), started: 9 },
    );
}

#[test]
#[should_panic(expected = "$.user: \"ann\" != \"bob\"")]
fn assert_equal_panics_with_diff() {
    assert_equal!(
        Session { user: "ann".into(), started: 1 },
        Session { user: "bob".into(), started: 1 },
        "session mismatch"
    );
}
