//! Human readable dumps of packet data

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Format `data` as lines of offset, hex and ASCII columns
///
/// ```
/// let dump = tibia_rec::hexdump::hex_dump(b"Hi!");
/// assert_eq!(
///     dump,
///     "00000000    48 69 21                                           |Hi!             |\n"
/// );
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|byte| format!("{byte:02X}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&byte| match byte {
                32..=126 => char::from(byte),
                _ => '.',
            })
            .collect();

        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{:08x}    {:<hex_width$}    |{:<ascii_width$}|",
            line * BYTES_PER_LINE,
            hex.join(" "),
            ascii,
            hex_width = BYTES_PER_LINE * 3 - 1,
            ascii_width = BYTES_PER_LINE,
        );
    }

    out
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::hex_dump;

    #[test]
    fn full_and_partial_lines() {
        let data: Vec<u8> = (0x41..0x41 + 18).collect();

        let expected = concat!(
            "00000000    41 42 43 44 45 46 47 48 49 4A 4B 4C 4D 4E 4F 50    |ABCDEFGHIJKLMNOP|\n",
            "00000010    51 52                                              |QR              |\n",
        );

        assert_eq!(hex_dump(&data), expected);
    }

    #[test]
    fn non_printable_bytes() {
        assert_eq!(
            hex_dump(&[0x00, 0x7F, 0x20]),
            "00000000    00 7F 20                                           |..              |\n"
        );
    }

    #[test]
    fn empty() {
        assert_eq!(hex_dump(&[]), "");
    }
}
