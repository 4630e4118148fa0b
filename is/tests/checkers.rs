use std::{cell::OnceCell, io::Write, rc::Rc};

use deepcheck_deep::{Inspect, Value};
use deepcheck_is::{self as is, Checker, CheckerFn};

fn setup() {
    deepcheck_logger::test_setup("trace");
}

fn run(checker: impl Checker) -> (bool, String) {
    let mut out = vec![];
    let ok = checker.check(&mut out);
    (ok, String::from_utf8(out).unwrap())
}

#[derive(Inspect)]
struct Report {
    x: Vec<i32>,
}

#[test]
fn equal_values_pass_silently() {
    setup();
    let a = Report { x: vec![1, 2, 3] };
    let b = Report { x: vec![1, 2, 3] };
    assert_eq!(run(is::equal(&a, &b)), (true, String::new()));
}

#[test]
fn unequal_values_are_explained() {
    setup();
    let a = Report { x: vec![1, 2, 3] };
    let b = Report { x: vec![1, 5, 3] };
    let (ok, text) = run(is::equal(&a, &b));
    assert!(!ok);
    assert_eq!(
        text,
        "Not equal:\n\
         Expected: Report{\n    x:              Vec<i32>{1, 2, 3}\n}\n\
         Actual:   Report{\n    x:              Vec<i32>{1, 5, 3}\n}\n\
         Diff:\n$.x[1]: 2 != 5\n"
    );
}

#[test]
fn not_equal() {
    setup();
    assert!(run(is::not_equal(&1u8, &2u8)).0);
    assert_eq!(
        run(is::not_equal(&"same", &"same")),
        (false, "Expected not equal: \"same\"".to_string())
    );
}

fn one() -> u8 {
    1
}

#[test]
fn unsupported_comparisons_are_contained() {
    setup();
    let f: fn() -> u8 = one;
    let (ok, text) = run(is::equal(&f, &f));
    assert!(!ok);
    assert_eq!(
        text,
        "PANIC: unsupported comparison of fn() -> u8: functions can't be compared\n"
    );
}

struct Exploding;

impl Inspect for Exploding {
    fn inspect(&self) -> Value<'_> {
        panic!("inspect exploded")
    }
}

#[test]
fn panics_are_contained() {
    setup();
    let (ok, text) = run(is::equal(&Exploding, &Exploding));
    assert!(!ok);
    assert_eq!(text, "PANIC: inspect exploded\n");
}

#[test]
fn zero_values() {
    setup();
    assert!(run(is::zero(&0u32)).0);
    assert!(run(is::zero(&Vec::<String>::new())).0);
    assert_eq!(
        run(is::zero(&5u32)),
        (false, "Want zero value, got: 5".to_string())
    );
    assert!(run(is::not_zero(&Some(1u8))).0);
    assert_eq!(
        run(is::not_zero(&String::new())),
        (false, "Want not zero value, got: \"\"".to_string())
    );
}

#[test]
fn checker_objects() {
    setup();
    let checkers: Vec<Box<dyn Checker>> = vec![
        Box::new(is::is_true(true)),
        Box::new(CheckerFn::new(|w: &mut dyn Write| {
            let _ = write!(w, "custom");
            false
        })),
    ];

    let mut out = vec![];
    assert!(checkers[0].check(&mut out));
    assert!(!(&checkers[1]).check(&mut out));
    assert_eq!(out, b"custom");
}

#[derive(Inspect)]
struct Loop {
    value: u8,
    #[deep = "print=max-depth=2"]
    next: OnceCell<Rc<Loop>>,
}

fn self_loop(value: u8) -> Rc<Loop> {
    let node = Rc::new(Loop {
        value,
        next: OnceCell::new(),
    });
    assert!(node.next.set(node.clone()).is_ok());
    node
}

#[test]
fn cyclic_values_are_explained() {
    setup();
    let (ok, text) = run(is::equal(&self_loop(1), &self_loop(2)));
    assert!(!ok);
    assert!(text.contains("(OnceCell<Rc<Loop>>)(omitted)"), "{text}");
    assert!(text.ends_with("Diff:\n$.value: 1 != 2\n"), "{text}");
}
