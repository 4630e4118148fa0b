//! Test assertions built on structural equality.
//!
//! This crate bundles the pieces of deepcheck:
//!
//! * [`deep`] compares and prints arbitrary values that implement [`Inspect`].
//! * [`is`] turns comparisons into [`Checker`]s that explain their failures.
//! * [`assert`] reports failed checkers to a test runner, and [`assert_that!`] and
//!   [`assert_equal!`] do so from plain `#[test]` functions.
//!
//! ```
//! use deepcheck::{assert_equal, Inspect};
//!
//! #[derive(Inspect)]
//! struct Config {
//!     name: String,
//!     #[deep = "compare=false"]
//!     loaded_at: u64,
//! }
//!
//! assert_equal!(
//!     Config { name: "main".into(), loaded_at: 1 },
//!     Config { name: "main".into(), loaded_at: 2 },
//! );
//! ```
#![warn(missing_docs)]

pub use deepcheck_deep as deep;
pub use deepcheck_is as is;

pub mod assert;

pub use deep::Inspect;
pub use is::Checker;
