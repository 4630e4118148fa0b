//! Per-field directives.
//!
//! A field of a derived record can carry directive text, attached with
//! `#[deep = "<directive text>"]`. The text is a comma separated list of `key` or `key=value`
//! entries:
//!
//! * `-` excludes the field from both comparison and printing, overriding everything else.
//! * `compare=false` skips the field when comparing.
//! * `compare=nil` only compares whether both sides are nil.
//! * `compare=pointer` only compares whether both sides reference the same storage.
//! * `print=omit` hides the field in printed output.
//! * `print=max-depth=N` allows `N` more nesting levels below the field, regardless of the depth
//!   limit that applies to the enclosing record.
//!
//! Directive text is parsed once per record type and variant and then cached per thread.
use std::{any::TypeId, cell::RefCell, rc::Rc};

use crate::value::{Type, Variant};

/// Entry excluding a field from both comparison and printing.
pub const EXCLUDE: &str = "-";
/// Key of the comparison facet.
pub const COMPARE: &str = "compare";
/// Key of the printing facet.
pub const PRINT: &str = "print";

/// How a field takes part in structural comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compare {
    /// Compare structurally.
    #[default]
    Default,
    /// Ignore the field.
    Skip,
    /// Compare only whether both sides are nil.
    NilOnly,
    /// Compare only whether both sides reference the same storage.
    IdentityOnly,
}

/// How a field is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Print {
    /// Print with the depth limit of the enclosing record.
    #[default]
    Default,
    /// Hide the field.
    Omit,
    /// Allow this many nesting levels below the field.
    MaxDepth(usize),
}

/// The parsed directives of a single field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldDirective {
    /// The field carries the blanket exclusion.
    pub excluded: bool,
    /// Comparison facet.
    pub compare: Compare,
    /// Printing facet.
    pub print: Print,
}

/// Returns the value of the first entry in `tag` whose key is `facet`.
///
/// Entries without a value yield `""`.
pub fn lookup<'a>(tag: &'a str, facet: &str) -> Option<&'a str> {
    tag.split(',').find_map(|entry| {
        let entry = entry.trim();
        let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
        (key == facet).then_some(value)
    })
}

impl FieldDirective {
    /// Parses the directive text of a field.
    ///
    /// Unrecognized facet values fall back to the default behavior.
    pub fn parse(tag: &str) -> Self {
        if tag.split(',').any(|entry| entry.trim() == EXCLUDE) {
            return FieldDirective {
                excluded: true,
                compare: Compare::Skip,
                print: Print::Omit,
            };
        }

        let compare = match lookup(tag, COMPARE) {
            None => Compare::Default,
            Some("false") => Compare::Skip,
            Some("nil" | "isnil") => Compare::NilOnly,
            Some("pointer" | "ptr") => Compare::IdentityOnly,
            Some(other) => {
                log::debug!("ignoring unknown compare directive {other:?} in {tag:?}");
                Compare::Default
            }
        };

        let print = match lookup(tag, PRINT) {
            None => Print::Default,
            Some("omit") => Print::Omit,
            Some(other) => match parse_max_depth(other) {
                Some(depth) => Print::MaxDepth(depth),
                None => {
                    log::debug!("ignoring unknown print directive {other:?} in {tag:?}");
                    Print::Default
                }
            },
        };

        FieldDirective {
            excluded: false,
            compare,
            print,
        }
    }
}

fn parse_max_depth(value: &str) -> Option<usize> {
    match value.split_once('=')? {
        ("max-depth" | "maxdepth", depth) => depth.parse().ok(),
        _ => None,
    }
}

thread_local! {
    static CACHE: RefCell<zwohash::HashMap<(TypeId, usize), Rc<[FieldDirective]>>> =
        RefCell::new(Default::default());
}

/// Returns the parsed directives for the fields of `variant`, in field order.
pub fn resolve(ty: Type, variant: &Variant) -> Rc<[FieldDirective]> {
    CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry((ty.id(), variant.index))
            .or_insert_with(|| {
                log::trace!("parsing field directives of {ty}");
                variant
                    .fields
                    .iter()
                    .map(|field| FieldDirective::parse(field.tag))
                    .collect()
            })
            .clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Field;

    #[test]
    fn lookup_facets() {
        assert_eq!(lookup("compare=false,print=omit", COMPARE), Some("false"));
        assert_eq!(lookup("compare=false,print=omit", PRINT), Some("omit"));
        assert_eq!(lookup("print=max-depth=3", PRINT), Some("max-depth=3"));
        assert_eq!(lookup("compare", COMPARE), Some(""));
        assert_eq!(lookup("print=omit", COMPARE), None);
        assert_eq!(lookup("", COMPARE), None);
        assert_eq!(
            lookup("compare=nil, compare=false", COMPARE),
            Some("nil"),
            "first matching entry wins"
        );
    }

    #[test]
    fn parse_facets() {
        assert_eq!(FieldDirective::parse(""), FieldDirective::default());
        assert_eq!(FieldDirective::parse("compare=false").compare, Compare::Skip);
        assert_eq!(FieldDirective::parse("compare=isnil").compare, Compare::NilOnly);
        assert_eq!(
            FieldDirective::parse("compare=ptr").compare,
            Compare::IdentityOnly
        );
        assert_eq!(FieldDirective::parse("print=omit").print, Print::Omit);
        assert_eq!(
            FieldDirective::parse("print=max-depth=15").print,
            Print::MaxDepth(15)
        );
        assert_eq!(
            FieldDirective::parse("print=maxdepth=2").print,
            Print::MaxDepth(2)
        );
        assert_eq!(
            FieldDirective::parse("print=max-depth=many").print,
            Print::Default
        );
        assert_eq!(FieldDirective::parse("compare=maybe").compare, Compare::Default);
    }

    #[test]
    fn exclusion_wins() {
        let directive = FieldDirective::parse("compare=nil,-,print=max-depth=4");
        assert!(directive.excluded);
        assert_eq!(directive.compare, Compare::Skip);
        assert_eq!(directive.print, Print::Omit);
    }

    #[test]
    fn resolve_is_cached_per_variant() {
        struct Marker;

        const FIELDS: &[Field] = &[
            Field {
                name: "a",
                tag: "compare=false",
            },
            Field { name: "b", tag: "" },
        ];
        let variant = Variant {
            index: 0,
            name: None,
            fields: FIELDS,
        };

        let first = resolve(Type::of::<Marker>(), &variant);
        let second = resolve(Type::of::<Marker>(), &variant);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first[0].compare, Compare::Skip);
        assert_eq!(first[1], FieldDirective::default());
    }
}
