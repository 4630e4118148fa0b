//! Checkers: predicates that explain themselves when they fail.
//!
//! A [`Checker`] decides whether an assertion holds. When it doesn't, the checker writes a human
//! readable explanation to the sink it was given. Checkers never panic on behalf of the values
//! they inspect: comparisons the engine can't perform and panics raised while inspecting values
//! are turned into `PANIC: ...` text instead.
#![warn(missing_docs)]

use std::io::Write;

mod basic;
mod compare;
mod error;
mod guard;

pub use basic::{is_false, is_true, nil, not_nil};
pub use compare::{equal, not_equal, not_zero, zero};
pub use error::{error, error_is, no_error};

/// A predicate that explains its failure.
pub trait Checker {
    /// Returns `true` if the assertion holds. Otherwise writes an explanation to `w` and returns
    /// `false`.
    fn check(&self, w: &mut dyn Write) -> bool;
}

impl<C: Checker + ?Sized> Checker for &C {
    fn check(&self, w: &mut dyn Write) -> bool {
        (**self).check(w)
    }
}

impl<C: Checker + ?Sized> Checker for Box<C> {
    fn check(&self, w: &mut dyn Write) -> bool {
        (**self).check(w)
    }
}

/// A [`Checker`] implemented by a closure.
#[derive(Clone, Copy)]
pub struct CheckerFn<F>(F);

impl<F: Fn(&mut dyn Write) -> bool> CheckerFn<F> {
    /// Wraps `check` as a [`Checker`].
    pub fn new(check: F) -> Self {
        CheckerFn(check)
    }
}

impl<F: Fn(&mut dyn Write) -> bool> Checker for CheckerFn<F> {
    fn check(&self, w: &mut dyn Write) -> bool {
        (self.0)(w)
    }
}

/// Writes a failure explanation, returning `false` for use as the check result.
fn report(w: &mut dyn Write, message: std::fmt::Arguments<'_>) -> bool {
    if let Err(err) = w.write_fmt(message) {
        log::warn!("failed to write check failure: {err}");
    }
    false
}
