//! Extracting length-prefixed text from packets

use crate::recording::Frame;

/// Strings of this length or longer are assumed to be binary data
pub const MAX_STRING_LEN: usize = 1024;

const LOSS_PREFIX: &str = "You lose ";
const LOSS_SUFFIXES: [&str; 2] = [" hitpoint", " mana"];
const USE_PREFIX: &str = "Using one of ";
const USE_REPLACEMENT: &str = "Using one of X Y...";
const ELLIPSIS: &str = "...";

fn is_printable(byte: u8) -> bool {
    matches!(byte, 32..=126 | 160..=255)
}

/// Every printable Latin-1 string in `frames` that is at least `min_len` bytes long
///
/// A string is only accepted when the two bytes in front of it hold its exact length, the way
/// the game encodes text inside packets.
pub fn strings(frames: &[Frame], min_len: usize) -> Vec<String> {
    let mut found = Vec::new();
    for frame in frames {
        let data = frame.data.as_slice();
        let mut offset = 0;
        while offset + 2 < data.len() {
            let length = usize::from(u16::from_le_bytes([data[offset], data[offset + 1]]));
            let start = offset + 2;
            let end = start + length;

            if length >= min_len && length < MAX_STRING_LEN && end <= data.len() {
                let raw = &data[start..end];
                if raw.iter().copied().all(is_printable) {
                    found.push(raw.iter().map(|&b| char::from(b)).collect());
                    offset = end;
                    continue;
                }
            }

            offset += 1;
        }
    }

    found
}

/// `found` sorted and without duplicates
///
/// Run the strings through [`normalize_counts`] first to fold status messages that only differ
/// in their numbers.
pub fn unique_strings(mut found: Vec<String>) -> Vec<String> {
    found.sort_unstable();
    found.dedup();
    found
}

/// Replace the counts in frequent status messages so they collapse into one string
///
/// `You lose 12 hitpoints` becomes `You lose X hitpoints`, and `Using one of 5 mana fluids...`
/// becomes `Using one of X Y...`.
pub fn normalize_counts(string: &str) -> String {
    normalize_uses(&normalize_losses(string))
}

fn leading_digits(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

fn normalize_losses(string: &str) -> String {
    let mut out = String::with_capacity(string.len());
    let mut rest = string;
    while let Some(start) = rest.find(LOSS_PREFIX) {
        let after = &rest[start + LOSS_PREFIX.len()..];
        out.push_str(&rest[..start + LOSS_PREFIX.len()]);

        let digits = leading_digits(after);
        let tail = &after[digits..];
        if digits > 0 && LOSS_SUFFIXES.iter().any(|suffix| tail.starts_with(suffix)) {
            out.push('X');
            rest = tail;
        } else {
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

fn normalize_uses(string: &str) -> String {
    let mut out = String::with_capacity(string.len());
    let mut rest = string;
    while let Some(start) = rest.find(USE_PREFIX) {
        let after = &rest[start + USE_PREFIX.len()..];
        out.push_str(&rest[..start]);

        let digits = leading_digits(after);
        // the item name runs up to the last ellipsis
        let item = after[digits..]
            .strip_prefix(' ')
            .and_then(|item| item.rfind(ELLIPSIS).filter(|&end| end > 0).map(|end| &item[end..]));

        match item {
            Some(tail) if digits > 0 => {
                out.push_str(USE_REPLACEMENT);
                rest = &tail[ELLIPSIS.len()..];
            }
            _ => {
                out.push_str(USE_PREFIX);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
