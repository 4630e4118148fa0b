use std::{
    any::Any,
    io::Write,
    panic::{self, AssertUnwindSafe},
};

use deepcheck_deep::Error;

/// Runs `check` on a scratch buffer, converting errors and panics into `PANIC: ...` text.
///
/// Whatever `check` wrote is copied to `w` in either case.
pub(crate) fn guarded(
    w: &mut dyn Write,
    check: impl FnOnce(&mut Vec<u8>) -> Result<bool, Error>,
) -> bool {
    let mut buf = vec![];

    let ok = match panic::catch_unwind(AssertUnwindSafe(|| check(&mut buf))) {
        Ok(Ok(ok)) => ok,
        Ok(Err(err)) => {
            log::debug!("check aborted: {err}");
            fault(&mut buf, &err);
            false
        }
        Err(payload) => {
            fault(&mut buf, &panic_message(payload.as_ref()));
            false
        }
    };

    if let Err(err) = w.write_all(&buf) {
        log::warn!("failed to write check failure: {err}");
    }

    ok
}

fn fault(buf: &mut Vec<u8>, message: &dyn std::fmt::Display) {
    if buf.last().is_some_and(|&byte| byte != b'\n') {
        buf.push(b'\n');
    }
    buf.extend_from_slice(format!("PANIC: {message}\n").as_bytes());
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_results() {
        let mut out = vec![];
        assert!(guarded(&mut out, |_| Ok(true)));
        assert!(!guarded(&mut out, |buf| {
            buf.extend_from_slice(b"failed");
            Ok(false)
        }));
        assert_eq!(out, b"failed");
    }

    #[test]
    fn converts_panics() {
        let mut out = vec![];
        assert!(!guarded(&mut out, |buf| {
            buf.extend_from_slice(b"partial");
            panic!("boom {}", 42)
        }));
        assert_eq!(String::from_utf8(out).unwrap(), "partial\nPANIC: boom 42\n");
    }
}
