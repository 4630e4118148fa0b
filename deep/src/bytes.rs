//! Helpers for rendering byte sequences.
use std::fmt::{Debug, Display};

use crate::fmt::fmt_closure;

/// CRC-32 (IEEE 802.3) checksum of `data`.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

/// Returns `true` when at least 80% of the bytes are printable ASCII.
pub fn is_mostly_printable(data: &[u8]) -> bool {
    let printable = data
        .iter()
        .filter(|&&byte| (0x20..=0x7e).contains(&byte))
        .count();
    printable * 5 >= data.len() * 4
}

/// Formats bytes as lowercase hex digits.
pub fn hex(data: &[u8]) -> impl Display + Debug + '_ {
    fmt_closure(move |f| {
        for byte in data {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    })
}
