//! Assertions that report to a test runner.
//!
//! Every assertion runs a [`Checker`] and, when it fails, logs the checker's explanation to a
//! [`TestingT`] handle and marks it failed. Assertions return whether the check held, so a test
//! can stop early or carry on after a failure, depending on what the handle's
//! [`fail`][TestingT::fail] does.
use std::{
    any::type_name,
    error::Error as StdError,
    fmt,
    io::{self, Write},
    panic::Location,
};

use deepcheck_deep::Inspect;
use deepcheck_is::{self as is, Checker};

/// Returned by a [`TestingT`] logging method the handle doesn't provide.
#[derive(Clone, Copy, Debug, thiserror::Error)]
#[error("logging capability not supported")]
pub struct Unsupported;

/// A test runner handle.
///
/// A handle must provide at least one of [`logf`][TestingT::logf] and [`log`][TestingT::log].
/// Failed assertions prefer `logf`.
pub trait TestingT {
    /// Marks the test as failed.
    fn fail(&mut self);

    /// Logs formatted text.
    fn logf(&mut self, args: fmt::Arguments<'_>) -> Result<(), Unsupported> {
        let _ = args;
        Err(Unsupported)
    }

    /// Logs plain text.
    fn log(&mut self, msg: &str) -> Result<(), Unsupported> {
        let _ = msg;
        Err(Unsupported)
    }
}

/// Collects checker output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buf(Vec<u8>);

impl Buf {
    /// Ends the current line unless the buffer is empty or already ends with a newline.
    pub fn newline(&mut self) {
        if self.0.last().is_some_and(|&byte| byte != b'\n') {
            self.0.push(b'\n');
        }
    }

    /// Returns the collected bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn append(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
        self.newline();
    }
}

impl Write for Buf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `checker`, reporting its explanation to `t` if it fails.
#[track_caller]
pub fn eval<T: TestingT + ?Sized>(
    t: &mut T,
    checker: impl Checker,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    let mut buf = Buf::default();
    if checker.check(&mut buf) {
        return true;
    }

    fail(t, &[buf], message);
    false
}

/// Passes if any of `checkers` passes. Otherwise reports every explanation.
#[track_caller]
pub fn any<T: TestingT + ?Sized>(
    t: &mut T,
    checkers: &[&dyn Checker],
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    let mut bufs = vec![Buf::default(); checkers.len()];

    for (checker, buf) in checkers.iter().zip(&mut bufs) {
        if checker.check(buf) {
            return true;
        }
    }

    fail(t, &bufs, message);
    false
}

/// Passes if all of `checkers` pass, stopping at the first one that fails.
#[track_caller]
pub fn all<T: TestingT + ?Sized>(
    t: &mut T,
    checkers: &[&dyn Checker],
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    let mut buf = Buf::default();

    for checker in checkers {
        if !checker.check(&mut buf) {
            fail(t, &[buf], message);
            return false;
        }
    }

    true
}

/// Logs `bufs` followed by `message` to `t` and marks it failed.
///
/// The text starts with the caller's location.
///
/// # Panics
///
/// Panics if `t` provides neither logging method.
#[track_caller]
pub fn fail<T: TestingT + ?Sized>(t: &mut T, bufs: &[Buf], message: Option<fmt::Arguments<'_>>) {
    let mut text = Buf(format!("{}: ", Location::caller()).into_bytes());

    for buf in bufs.iter().filter(|buf| !buf.0.is_empty()) {
        text.append(&buf.0);
    }
    if let Some(message) = message {
        text.append(message.to_string().as_bytes());
    }

    let text = String::from_utf8_lossy(&text.0);
    log::trace!("assertion failed: {text}");

    if t.logf(format_args!("{text}")).is_err() && t.log(&text).is_err() {
        panic!("unsupported testing handle: {}", type_name::<T>());
    }
    t.fail();
}

/// Asserts that `ok` is `true`.
#[track_caller]
pub fn is_true<T: TestingT + ?Sized>(
    t: &mut T,
    ok: bool,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::is_true(ok), message)
}

/// Asserts that `ok` is `false`.
#[track_caller]
pub fn is_false<T: TestingT + ?Sized>(
    t: &mut T,
    ok: bool,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::is_false(ok), message)
}

/// Asserts that `value` is nil, see [`is::nil`].
#[track_caller]
pub fn nil<T: TestingT + ?Sized>(
    t: &mut T,
    value: &dyn Inspect,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::nil(value), message)
}

/// Asserts that `value` isn't nil.
#[track_caller]
pub fn not_nil<T: TestingT + ?Sized>(
    t: &mut T,
    value: &dyn Inspect,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::not_nil(value), message)
}

/// Asserts that `result` is `Ok`.
#[track_caller]
pub fn no_error<T: TestingT + ?Sized, R, E: StdError>(
    t: &mut T,
    result: &Result<R, E>,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::no_error(result), message)
}

/// Asserts that `result` is `Err`.
#[track_caller]
pub fn error<T: TestingT + ?Sized, R, E>(
    t: &mut T,
    result: &Result<R, E>,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::error(result), message)
}

/// Asserts that `result` failed with `target` somewhere in its source chain.
#[track_caller]
pub fn error_is<T, R, E, K>(
    t: &mut T,
    result: &Result<R, E>,
    target: &K,
    message: Option<fmt::Arguments<'_>>,
) -> bool
where
    T: TestingT + ?Sized,
    E: StdError + 'static,
    K: StdError + PartialEq + 'static,
{
    eval(t, is::error_is(result, target), message)
}

/// Asserts that `expected` and `actual` are structurally equal.
#[track_caller]
pub fn equal<T: TestingT + ?Sized>(
    t: &mut T,
    expected: &dyn Inspect,
    actual: &dyn Inspect,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::equal(expected, actual), message)
}

/// Asserts that `unexpected` and `actual` differ structurally.
#[track_caller]
pub fn not_equal<T: TestingT + ?Sized>(
    t: &mut T,
    unexpected: &dyn Inspect,
    actual: &dyn Inspect,
    message: Option<fmt::Arguments<'_>>,
) -> bool {
    eval(t, is::not_equal(unexpected, actual), message)
}

/// Handle for plain `#[test]` functions: failing panics with the logged text.
#[derive(Debug, Default)]
pub struct StdTest {
    log: String,
}

impl StdTest {
    /// Creates a handle with an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TestingT for StdTest {
    fn fail(&mut self) {
        panic!("{}", self.log.trim_end());
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) -> Result<(), Unsupported> {
        self.log.push_str(&args.to_string());
        Ok(())
    }
}

/// Panics with the checker's explanation unless the checker passes.
///
/// Extra arguments are formatted with [`format_args!`] and appended to the explanation.
///
/// ```
/// use deepcheck::{assert_that, is};
///
/// assert_that!(is::is_true(1 + 1 == 2));
/// assert_that!(is::not_equal(&"a", &"b"), "comparing {} letters", 2);
/// ```
#[macro_export]
macro_rules! assert_that {
    ($checker:expr $(,)?) => {{
        $crate::assert::eval(&mut $crate::assert::StdTest::new(), $checker, None);
    }};
    ($checker:expr, $($arg:tt)+) => {{
        $crate::assert::eval(
            &mut $crate::assert::StdTest::new(),
            $checker,
            Some(format_args!($($arg)+)),
        );
    }};
}

/// Panics unless `expected` and `actual` are structurally equal.
///
/// ```
/// use deepcheck::assert_equal;
///
/// assert_equal!(vec![1, 2], vec![1, 2]);
/// assert_equal!(Some("x"), Some("x"), "lookup of {}", "x");
/// ```
#[macro_export]
macro_rules! assert_equal {
    ($expected:expr, $actual:expr $(,)?) => {
        $crate::assert_that!($crate::is::equal(&$expected, &$actual))
    };
    ($expected:expr, $actual:expr, $($arg:tt)+) => {
        $crate::assert_that!($crate::is::equal(&$expected, &$actual), $($arg)+)
    };
}
