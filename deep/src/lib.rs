//! Structural equality and diagnostic printing for arbitrary values.
//!
//! Values take part through the [`Inspect`][value::Inspect] trait, which is implemented for most
//! standard library types and can be derived for user defined types with
//! [`#[derive(Inspect)]`][macro@Inspect].
//!
//! * [`equal`] and [`diff`] decide whether two values are deeply equal, following references and
//!   terminating on reference cycles.
//! * [`fprint`] and [`Printer`] render values as indented text for failure messages.
//! * Fields of derived types can opt out of either with directives, see [`directive`].
#![warn(missing_docs)]

// Lets derived impls inside this crate refer to it by name.
extern crate self as deepcheck_deep;

pub mod bytes;
pub mod directive;
mod equal;
mod error;
pub mod fmt;
mod impls;
mod print;
pub mod value;

pub use equal::{diff, equal};
pub use error::Error;
pub use print::{fprint, Options, Printer};
pub use value::{Inspect, Kind, Type, Value};

/// Derives [`Inspect`][trait@Inspect] for a struct or enum.
///
/// Every field must implement [`Inspect`][trait@Inspect]. Fields accept directives with
/// `#[deep = "..."]`, see [`directive`] for the syntax. On the type itself, `#[deep = "opaque"]`
/// treats the whole value as a unit that is compared with [`PartialEq`] and printed with
/// [`Debug`][std::fmt::Debug], and `#[deep = "newtype"]` makes a single field tuple struct a named
/// wrapper around its field.
pub use deepcheck_derive::Inspect;
