use std::io::Write;

use deepcheck_deep::{Inspect, Kind};

use crate::{compare::rendered, report, Checker, CheckerFn};

/// Holds if `ok` is `true`.
pub fn is_true(ok: bool) -> impl Checker {
    CheckerFn::new(move |w: &mut dyn Write| ok || report(w, format_args!("Want true")))
}

/// Holds if `ok` is `false`.
pub fn is_false(ok: bool) -> impl Checker {
    CheckerFn::new(move |w: &mut dyn Write| !ok || report(w, format_args!("Want false")))
}

fn is_nil(value: &dyn Inspect) -> bool {
    matches!(value.inspect().kind, Kind::Nil | Kind::Pointer(None))
}

/// Holds if `value` is `()` or an empty reference such as `None`.
///
/// Empty collections are not nil.
pub fn nil(value: &dyn Inspect) -> impl Checker + '_ {
    CheckerFn::new(move |w: &mut dyn Write| {
        is_nil(value) || report(w, format_args!("Want nil, got: {}", rendered(value)))
    })
}

/// Holds unless `value` is `()` or an empty reference such as `None`.
pub fn not_nil(value: &dyn Inspect) -> impl Checker + '_ {
    CheckerFn::new(move |w: &mut dyn Write| {
        !is_nil(value) || report(w, format_args!("Want not nil"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(checker: impl Checker) -> (bool, String) {
        let mut out = vec![];
        let ok = checker.check(&mut out);
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn booleans() {
        assert_eq!(run(is_true(true)), (true, String::new()));
        assert_eq!(run(is_true(false)), (false, "Want true".to_string()));
        assert_eq!(run(is_false(false)), (true, String::new()));
        assert_eq!(run(is_false(true)), (false, "Want false".to_string()));
    }

    #[test]
    fn nil_values() {
        assert!(run(nil(&())).0);
        assert!(run(nil(&None::<Box<u8>>)).0);
        assert_eq!(run(nil(&Some(3u8))), (false, "Want nil, got: 3".to_string()));
        assert_eq!(
            run(nil(&Vec::<u8>::new())),
            (false, "Want nil, got: Vec<u8>(\"\")".to_string())
        );

        assert!(run(not_nil(&5u8)).0);
        assert_eq!(run(not_nil(&None::<u8>)), (false, "Want not nil".to_string()));
    }
}
