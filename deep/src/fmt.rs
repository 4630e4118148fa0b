//! Utilities for writing [`std::fmt`] implementations.

use std::fmt::{Debug, Display, Formatter, Write};

struct FmtClosure<T>(T);

impl<T> Debug for FmtClosure<T>
where
    T: Fn(&mut Formatter<'_>) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0(f)
    }
}

impl<T> Display for FmtClosure<T>
where
    T: Fn(&mut Formatter<'_>) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0(f)
    }
}

/// Turns a closure that writes to a [`Formatter`] into a type that implements [`Display`] and
/// [`Debug`] by calling that closure.
pub fn fmt_closure<T: Fn(&mut Formatter<'_>) -> std::fmt::Result>(
    closure: T,
) -> impl Display + Debug {
    FmtClosure(closure)
}

/// Formats a type name as returned by [`std::any::type_name`] without module paths.
///
/// Every path in the name is reduced to its last segment, so
/// `core::option::Option<alloc::boxed::Box<my_crate::Node>>` is shown as `Option<Box<Node>>`.
pub fn short_type_name(name: &str) -> impl Display + Debug + '_ {
    fmt_closure(move |f| {
        let mut rest = name;
        while !rest.is_empty() {
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
                .unwrap_or(rest.len());
            let (path, tail) = rest.split_at(end);
            f.write_str(path.rsplit("::").next().unwrap_or(path))?;

            let mut tail = tail.chars();
            if let Some(delimiter) = tail.next() {
                f.write_char(delimiter)?;
            }
            rest = tail.as_str();
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_module_paths() {
        let cases = [
            ("u8", "u8"),
            ("alloc::vec::Vec<my_crate::A>", "Vec<A>"),
            (
                "core::option::Option<alloc::boxed::Box<dyn deepcheck_deep::value::Inspect>>",
                "Option<Box<dyn Inspect>>",
            ),
            ("(i32, alloc::string::String)", "(i32, String)"),
            ("fn(i32) -> i32", "fn(i32) -> i32"),
            ("[u8; 4]", "[u8; 4]"),
            ("&str", "&str"),
            (
                "std::collections::hash::map::HashMap<u32, a::b::C>",
                "HashMap<u32, C>",
            ),
        ];

        for (name, short) in cases {
            assert_eq!(short_type_name(name).to_string(), short);
        }
    }
}
