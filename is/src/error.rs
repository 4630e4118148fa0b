use std::{any::type_name, error::Error as StdError, io::Write};

use deepcheck_deep::fmt::short_type_name;

use crate::{report, Checker, CheckerFn};

/// Holds if `result` is `Ok`.
pub fn no_error<T, E: StdError>(result: &Result<T, E>) -> impl Checker + '_ {
    CheckerFn::new(move |w: &mut dyn Write| match result {
        Ok(_) => true,
        Err(err) => report(
            w,
            format_args!("Error: {err} (type: {})", short_type_name(type_name::<E>())),
        ),
    })
}

/// Holds if `result` is `Err`.
pub fn error<T, E>(result: &Result<T, E>) -> impl Checker + '_ {
    CheckerFn::new(move |w: &mut dyn Write| result.is_err() || report(w, format_args!("Want error")))
}

/// Holds if `result` is an error that is `target` or has `target` in its chain of sources.
///
/// An error in the chain matches if it has the same type as `target` and compares equal to it.
pub fn error_is<'a, T, E, K>(result: &'a Result<T, E>, target: &'a K) -> impl Checker + 'a
where
    E: StdError + 'static,
    K: StdError + PartialEq + 'static,
{
    CheckerFn::new(move |w: &mut dyn Write| {
        let target_type = short_type_name(type_name::<K>());

        let err = match result {
            Ok(_) => {
                return report(
                    w,
                    format_args!("Want error: {:?} (type {target_type})", target.to_string()),
                )
            }
            Err(err) => err as &(dyn StdError + 'static),
        };

        let chain = || std::iter::successors(Some(err), |err: &&(dyn StdError + 'static)| (*err).source());

        if chain().any(|link| link.downcast_ref::<K>() == Some(target)) {
            return true;
        }

        let mut message = String::from("Error chain\n");
        for (depth, link) in chain().enumerate() {
            message.push_str(&format!("{:?}", link.to_string()));
            if depth == 0 {
                message.push_str(&format!(" (type {})", short_type_name(type_name::<E>())));
            }
            message.push('\n');
        }

        report(
            w,
            format_args!("{message}is not {:?} (type {target_type})", target.to_string()),
        )
    })
}
