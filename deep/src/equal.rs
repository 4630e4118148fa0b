//! Structural equality.
//!
//! Two values are equal when they have the same static type and equal contents, recursively.
//! References are followed, so two distinct allocations holding equal values are equal.
//!
//! Reference cycles are handled by remembering every pair of references that is being compared.
//! When the same pair is reached again the comparison optimistically assumes it to be equal,
//! leaving it to the comparison already in progress to find any difference.
use std::{
    any::TypeId,
    fmt,
    hash::BuildHasherDefault,
    io::Write,
};

use hashbrown::HashSet;
use zwohash::ZwoHasher;

use crate::{
    directive::{self, Compare},
    error::Error,
    print::render,
    value::{Inspect, Kind, Map, Record, Seq, Type, Value},
};

/// Returns whether `a` and `b` are structurally equal.
///
/// Fails with [`Error::Unsupported`] when the comparison reaches values without a structural
/// meaning, such as two non-null function pointers.
pub fn equal(a: &dyn Inspect, b: &dyn Inspect) -> Result<bool, Error> {
    Comparer::new(None).values(a.inspect(), b.inspect())
}

/// Like [`equal`], but also writes a line describing the first difference to `sink`.
///
/// The line starts with the path from the compared values to the difference, `$` standing for
/// the values themselves.
pub fn diff(sink: &mut dyn Write, a: &dyn Inspect, b: &dyn Inspect) -> Result<bool, Error> {
    Comparer::new(Some(Trace {
        sink,
        path: vec![],
    }))
    .values(a.inspect(), b.inspect())
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct Visit {
    a: Key,
    b: Key,
    ty: TypeId,
}

/// Address of the referenced storage and the number of elements it spans.
type Key = (usize, usize);

enum Segment {
    Field(&'static str),
    Index(usize),
    Key(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, ".{name}"),
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Key(key) => write!(f, "[{key}]"),
        }
    }
}

struct Trace<'w> {
    sink: &'w mut dyn Write,
    path: Vec<Segment>,
}

struct Comparer<'w> {
    visited: Option<HashSet<Visit, BuildHasherDefault<ZwoHasher>>>,
    trace: Option<Trace<'w>>,
}

impl<'w> Comparer<'w> {
    fn new(trace: Option<Trace<'w>>) -> Self {
        Comparer {
            visited: None,
            trace,
        }
    }

    /// Reports a difference at the current path and returns `Ok(false)`.
    fn mismatch(&mut self, message: fmt::Arguments<'_>) -> Result<bool, Error> {
        if let Some(trace) = &mut self.trace {
            let mut line = String::from("$");
            for segment in &trace.path {
                line.push_str(&segment.to_string());
            }
            writeln!(trace.sink, "{line}: {message}")?;
        }
        Ok(false)
    }

    /// Compares with `segment` appended to the reported path.
    fn nested(
        &mut self,
        segment: impl FnOnce() -> Segment,
        a: Value<'_>,
        b: Value<'_>,
    ) -> Result<bool, Error> {
        if self.trace.is_none() {
            return self.values(a, b);
        }
        self.push(segment());
        let result = self.values(a, b);
        self.pop();
        result
    }

    fn push(&mut self, segment: Segment) {
        if let Some(trace) = &mut self.trace {
            trace.path.push(segment);
        }
    }

    fn pop(&mut self) {
        if let Some(trace) = &mut self.trace {
            trace.path.pop();
        }
    }

    /// Records the pair of references, returning `false` if it was already being compared.
    fn enter(&mut self, a: &Value<'_>, b: &Value<'_>) -> bool {
        let (Some(a_key), Some(b_key)) = (cycle_key(a), cycle_key(b)) else {
            return true;
        };

        let visit = Visit {
            a: a_key.min(b_key),
            b: a_key.max(b_key),
            ty: a.ty.id(),
        };

        let inserted = self.visited.get_or_insert_with(Default::default).insert(visit);
        if !inserted {
            log::trace!("{} pair {:#x}/{:#x} already visited", a.ty, visit.a.0, visit.b.0);
        }
        inserted
    }

    fn values(&mut self, a: Value<'_>, b: Value<'_>) -> Result<bool, Error> {
        match (a.kind, b.kind) {
            (Kind::Nil, Kind::Nil) => return Ok(true),
            (Kind::Nil, _) => return self.mismatch(format_args!("nil != {}", b.ty)),
            (_, Kind::Nil) => return self.mismatch(format_args!("{} != nil", a.ty)),
            _ => {}
        }

        if a.ty != b.ty {
            return self.mismatch(format_args!("type {} != {}", a.ty, b.ty));
        }

        if !self.enter(&a, &b) {
            return Ok(true);
        }

        match (a.kind, b.kind) {
            (Kind::Pointer(None), Kind::Pointer(None)) => Ok(true),
            (Kind::Pointer(None), Kind::Pointer(Some(_))) => {
                self.mismatch(format_args!("nil != non-nil {}", a.ty))
            }
            (Kind::Pointer(Some(_)), Kind::Pointer(None)) => {
                self.mismatch(format_args!("non-nil != nil {}", a.ty))
            }
            (Kind::Pointer(Some(a)), Kind::Pointer(Some(b))) => {
                self.values(a.target.inspect(), b.target.inspect())
            }
            (Kind::Scalar(x), Kind::Scalar(y)) => {
                if x == y {
                    Ok(true)
                } else {
                    self.mismatch(format_args!("{x} != {y}"))
                }
            }
            (Kind::Opaque(x), Kind::Opaque(y)) => {
                if x.eq_opaque(y) {
                    Ok(true)
                } else {
                    self.mismatch(format_args!("{x:?} != {y:?}"))
                }
            }
            (Kind::Dynamic(x), Kind::Dynamic(y)) => {
                let (x, y) = (x.inspect(), y.inspect());
                if x.ty != y.ty {
                    return self.mismatch(format_args!("dynamic type {} != {}", x.ty, y.ty));
                }
                self.values(x, y)
            }
            (Kind::Seq(x), Kind::Seq(y)) => self.seqs(x, y),
            (Kind::Map(x), Kind::Map(y)) => self.maps(x, y),
            (Kind::Struct(x), Kind::Struct(y)) => self.records(a.ty, x, y),
            (Kind::Func(_), Kind::Func(_)) => {
                Err(Error::unsupported(a.ty, "functions can't be compared"))
            }
            _ => Err(Error::unsupported(a.ty, "inconsistent kinds for one type")),
        }
    }

    fn seqs(&mut self, a: Seq<'_>, b: Seq<'_>) -> Result<bool, Error> {
        let len = a.items.len();
        if len != b.items.len() {
            return self.mismatch(format_args!("len {} != {}", len, b.items.len()));
        }

        for index in 0..len {
            let (x, y) = (Value::of(a.items.get(index)), Value::of(b.items.get(index)));
            if !self.nested(|| Segment::Index(index), x, y)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn maps(&mut self, a: Map<'_>, b: Map<'_>) -> Result<bool, Error> {
        let len = a.entries.len();
        if len != b.entries.len() {
            return self.mismatch(format_args!("len {} != {}", len, b.entries.len()));
        }

        for (key, x) in a.entries.entries() {
            let Some(y) = b.entries.get(key) else {
                return self.mismatch(format_args!("missing key {}", render(key)));
            };
            if !self.nested(|| Segment::Key(render(key)), x.inspect(), y.inspect())? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn records(&mut self, ty: Type, a: &dyn Record, b: &dyn Record) -> Result<bool, Error> {
        let (x, y) = (a.variant(), b.variant());
        if x.index != y.index {
            return self.mismatch(format_args!(
                "variant {ty}::{} != {ty}::{}",
                x.name.unwrap_or("?"),
                y.name.unwrap_or("?")
            ));
        }

        let directives = directive::resolve(ty, &x);

        for (index, (field, directive)) in x.fields.iter().zip(directives.iter()).enumerate() {
            let (fa, fb) = (Value::of(a.field(index)), Value::of(b.field(index)));

            let equal = match directive.compare {
                Compare::Skip => continue,
                Compare::Default => self.nested(|| Segment::Field(field.name), fa, fb)?,
                Compare::NilOnly => {
                    let (Some(na), Some(nb)) = (fa.is_nil(), fb.is_nil()) else {
                        return Err(Error::unsupported(fa.ty, "value can't be nil"));
                    };
                    na == nb || self.field_mismatch(field.name, format_args!("nil {na} != {nb}"))?
                }
                Compare::IdentityOnly => {
                    let (Some(ia), Some(ib)) = (fa.identity(), fb.identity()) else {
                        return Err(Error::unsupported(fa.ty, "value has no identity"));
                    };
                    ia == ib
                        || self.field_mismatch(
                            field.name,
                            format_args!("pointer {ia:#x} != {ib:#x}"),
                        )?
                }
            };

            if !equal {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn field_mismatch(
        &mut self,
        name: &'static str,
        message: fmt::Arguments<'_>,
    ) -> Result<bool, Error> {
        self.push(Segment::Field(name));
        let result = self.mismatch(message);
        self.pop();
        result
    }
}

/// Identity used to detect cycles, for values that can be part of one.
///
/// Slices of one buffer can start at the same element, so sequences include their length.
fn cycle_key(value: &Value<'_>) -> Option<Key> {
    match value.kind {
        Kind::Pointer(Some(pointer))
            if !pointer.transparent && std::mem::size_of_val(pointer.target) != 0 =>
        {
            Some((pointer.addr, 1))
        }
        Kind::Seq(seq) => Some((seq.addr?, seq.items.len())),
        Kind::Map(map) => Some((map.addr, map.entries.len())),
        Kind::Dynamic(inner) if std::mem::size_of_val(inner) != 0 => {
            Some((inner as *const dyn Inspect as *const () as usize, 1))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn diff_text(a: &dyn Inspect, b: &dyn Inspect) -> (bool, String) {
        let mut out = vec![];
        let equal = diff(&mut out, a, b).unwrap();
        (equal, String::from_utf8(out).unwrap())
    }

    #[test]
    fn scalars() {
        assert!(equal(&5u32, &5u32).unwrap());
        assert!(!equal(&5u32, &6u32).unwrap());
        assert!(!equal(&5u32, &5u64).unwrap());
        assert!(equal(&f64::NAN, &f64::NAN).unwrap());
        assert!(equal(&(), &()).unwrap());
        assert!(!equal(&(), &0u8).unwrap());
    }

    #[test]
    fn root_mismatch_lines() {
        assert_eq!(diff_text(&5u8, &6u8), (false, "$: 5 != 6\n".to_string()));
        assert_eq!(
            diff_text(&5u8, &5i8),
            (false, "$: type u8 != i8\n".to_string())
        );
        assert_eq!(
            diff_text(&vec![1u8], &vec![1u8, 2]),
            (false, "$: len 1 != 2\n".to_string())
        );
        assert_eq!(diff_text(&"a", &"a"), (true, String::new()));
    }

    #[test]
    fn sequence_paths() {
        let a = vec![(1u8, "x"), (2, "y")];
        let b = vec![(1u8, "x"), (2, "z")];
        assert_eq!(
            diff_text(&a, &b),
            (false, "$[1].1: \"y\" != \"z\"\n".to_string())
        );
    }

    #[test]
    fn pointers() {
        assert!(equal(&Box::new(3u8), &Box::new(3u8)).unwrap());
        assert!(equal(&None::<Box<u8>>, &None::<Box<u8>>).unwrap());
        assert_eq!(
            diff_text(&Some(1u8), &None::<u8>),
            (false, "$: non-nil != nil Option<u8>\n".to_string())
        );
    }

    #[test]
    fn dynamic_types_must_match() {
        let a: Box<dyn Inspect> = Box::new(5i32);
        let b: Box<dyn Inspect> = Box::new(5i64);
        let c: Box<dyn Inspect> = Box::new(5i32);
        assert_eq!(
            diff_text(&a, &b),
            (false, "$: dynamic type i32 != i64\n".to_string())
        );
        assert!(equal(&a, &c).unwrap());
    }

    #[test]
    fn functions_are_unsupported() {
        fn one() -> u8 {
            1
        }
        let f: fn() -> u8 = one;
        assert!(matches!(equal(&f, &f), Err(Error::Unsupported { .. })));
        assert!(equal(&None::<fn() -> u8>, &None::<fn() -> u8>).unwrap());
        assert!(!equal(&Some(f), &None::<fn() -> u8>).unwrap());
    }

    #[test]
    fn failing_sink() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("broken"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        assert!(matches!(diff(&mut Broken, &1u8, &2u8), Err(Error::Io(_))));
        assert!(diff(&mut Broken, &1u8, &1u8).unwrap());
    }
}
