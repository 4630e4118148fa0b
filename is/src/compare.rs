use std::io::Write;

use deepcheck_deep::{self as deep, Inspect};

use crate::{guard::guarded, Checker, CheckerFn};

/// Renders `value` for a failure message.
pub(crate) fn rendered(value: &dyn Inspect) -> String {
    let mut buf = vec![];
    print_into(&mut buf, value);
    String::from_utf8_lossy(&buf).into_owned()
}

fn print_into(buf: &mut Vec<u8>, value: &dyn Inspect) {
    if let Err(err) = deep::fprint(&mut *buf, &[value]) {
        buf.extend_from_slice(format!("PRINT ERROR: {err}\n").as_bytes());
    }
}

/// Holds if `expected` and `actual` are structurally equal.
///
/// The failure text shows both values and, when available, the path to the first difference.
pub fn equal<'a>(expected: &'a dyn Inspect, actual: &'a dyn Inspect) -> impl Checker + 'a {
    CheckerFn::new(move |w: &mut dyn Write| {
        guarded(w, |buf| {
            let mut diff = vec![];
            if deep::diff(&mut diff, expected, actual)? {
                return Ok(true);
            }

            buf.extend_from_slice(b"Not equal:\nExpected: ");
            print_into(buf, expected);
            buf.extend_from_slice(b"\nActual:   ");
            print_into(buf, actual);

            if !diff.is_empty() {
                buf.extend_from_slice(b"\nDiff:\n");
                buf.extend_from_slice(&diff);
            }

            Ok(false)
        })
    })
}

/// Holds if `unexpected` and `actual` differ structurally.
pub fn not_equal<'a>(unexpected: &'a dyn Inspect, actual: &'a dyn Inspect) -> impl Checker + 'a {
    CheckerFn::new(move |w: &mut dyn Write| {
        guarded(w, |buf| {
            if !deep::equal(unexpected, actual)? {
                return Ok(true);
            }

            buf.extend_from_slice(b"Expected not equal: ");
            print_into(buf, unexpected);

            Ok(false)
        })
    })
}

/// Holds if `value` equals its type's default value.
pub fn zero<T: Inspect + Default>(value: &T) -> impl Checker + '_ {
    CheckerFn::new(move |w: &mut dyn Write| {
        guarded(w, |buf| {
            if deep::equal(value, &T::default())? {
                return Ok(true);
            }

            buf.extend_from_slice(b"Want zero value, got: ");
            print_into(buf, value);

            Ok(false)
        })
    })
}

/// Holds unless `value` equals its type's default value.
pub fn not_zero<T: Inspect + Default>(value: &T) -> impl Checker + '_ {
    CheckerFn::new(move |w: &mut dyn Write| {
        guarded(w, |buf| {
            if !deep::equal(value, &T::default())? {
                return Ok(true);
            }

            buf.extend_from_slice(b"Want not zero value, got: ");
            print_into(buf, value);

            Ok(false)
        })
    })
}
