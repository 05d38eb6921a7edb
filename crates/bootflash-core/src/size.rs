//! Byte quantities with a unit suffix
//!
//! Partition specs describe sizes and offsets as `<digits><unit>` where the
//! unit is one of `B`, `K`, `M` or `G` (binary multiples). Formatting picks the
//! largest unit that divides the value evenly and groups digits in thousands,
//! so `1_610_612_736` renders as `1,536M`. Parsing accepts those separators
//! back when they group digits in threes, which keeps
//! `parse_size(&format_size(n)) == n`.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// One kibibyte
pub const KIB: u64 = 1024;
/// One mebibyte
pub const MIB: u64 = 1024 * KIB;
/// One gibibyte
pub const GIB: u64 = 1024 * MIB;

/// Units from largest to smallest
const UNITS: [(char, u64); 4] = [('G', GIB), ('M', MIB), ('K', KIB), ('B', 1)];

fn multiplier(unit: char) -> Option<u64> {
    UNITS.iter().find(|(u, _)| *u == unit).map(|(_, m)| *m)
}

/// Parse a size literal like `512K`, `1M`, `2G` or `4096B`
///
/// The whole (trimmed) text must match. Unlike the shell tools this replaces,
/// a non-matching input is an error rather than a silent zero.
pub fn parse_size(s: &str) -> Result<u64> {
    let text = s.trim();
    let invalid = || Error::InvalidSize(text.to_string());

    let unit = text.chars().last().ok_or_else(invalid)?;
    let mult = multiplier(unit).ok_or_else(invalid)?;
    let digits = &text[..text.len() - unit.len_utf8()];

    // Thousands separators group digits in threes, as format_size writes them
    let grouped = digits.contains(',');
    let well_formed = digits.split(',').enumerate().all(|(i, group)| {
        let len_ok = match (i, grouped) {
            (0, false) => !group.is_empty(),
            (0, true) => (1..=3).contains(&group.len()),
            _ => group.len() == 3,
        };
        len_ok && group.bytes().all(|b| b.is_ascii_digit())
    });
    if !well_formed {
        return Err(invalid());
    }

    let mut value: u64 = 0;
    for c in digits.chars().filter(|c| *c != ',') {
        let d = u64::from(c as u8 - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(d))
            .ok_or_else(invalid)?;
    }

    value.checked_mul(mult).ok_or_else(invalid)
}

/// Format a byte count with the largest unit that divides it evenly
pub fn format_size(bytes: u64) -> String {
    format_with(bytes, group_thousands)
}

/// Like [`format_size`] but without thousands separators (`1536K`)
///
/// This is the form used when writing a spec line back out, where a `,`
/// would split the token.
pub fn format_size_compact(bytes: u64) -> String {
    format_with(bytes, |n| n.to_string())
}

fn format_with(bytes: u64, digits: impl Fn(u64) -> String) -> String {
    for (unit, mult) in UNITS {
        if bytes >= mult && bytes % mult == 0 {
            let mut out = digits(bytes / mult);
            out.push(unit);
            return out;
        }
    }
    // Only zero gets here
    let mut out = digits(bytes);
    out.push('B');
    out
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A byte count that displays and parses in unit notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Size(pub u64);

impl Size {
    /// Number of bytes
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_size(self.0))
    }
}

impl FromStr for Size {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_size(s).map(Size)
    }
}

impl From<u64> for Size {
    fn from(bytes: u64) -> Self {
        Size(bytes)
    }
}
