//! Program image loading and saving.
//!
//! Two external program forms feed the CPU: raw word dumps (two bytes
//! per word, either byte order) and a line-oriented hex text format
//! with `;` / `//` comments. Both produce a plain word vector that the
//! caller deposits with `Cpu::loadmem`; the execution core never reads
//! files itself.

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Byte order of a raw word dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Decode raw image bytes into words.
pub fn decode_words(bytes: &[u8], endian: Endian) -> Result<Vec<u16>, ImageError> {
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| match endian {
            Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
            Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .collect())
}

/// Encode words back into raw image bytes.
pub fn encode_words(words: &[u16], endian: Endian) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 2);
    for &word in words {
        let pair = match endian {
            Endian::Little => word.to_le_bytes(),
            Endian::Big => word.to_be_bytes(),
        };
        bytes.extend_from_slice(&pair);
    }
    bytes
}

/// Parse hex text source: one 16-bit hex literal per line.
///
/// Lines starting with `;` or `//` are comments, blank lines are
/// skipped, an optional `0x` prefix is accepted, and anything after the
/// literal on a line is ignored.
pub fn parse_hex(source: &str) -> Result<Vec<u16>, ImageError> {
    let mut words = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with("//") {
            continue;
        }

        let token = line.split_whitespace().next().unwrap_or_default();
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        let value = u32::from_str_radix(digits, 16).map_err(|_| ImageError::Parse {
            line: idx + 1,
            message: format!("expected a hex word, found {:?}", token),
        })?;
        if value > 0xFFFF {
            return Err(ImageError::Parse {
                line: idx + 1,
                message: format!("{} does not fit in 16 bits", token),
            });
        }

        words.push(value as u16);
    }

    Ok(words)
}

/// Load a raw binary word dump.
pub fn load_binary<P: AsRef<Path>>(path: P, endian: Endian) -> Result<Vec<u16>, ImageError> {
    decode_words(&fs::read(path)?, endian)
}

/// Load a hex text program.
pub fn load_hex<P: AsRef<Path>>(path: P) -> Result<Vec<u16>, ImageError> {
    parse_hex(&fs::read_to_string(path)?)
}

/// Load a program image, picking the format from the file extension:
/// `.cpu` is hex text, anything else a raw dump.
pub fn load_image<P: AsRef<Path>>(path: P, endian: Endian) -> Result<Vec<u16>, ImageError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("cpu") => load_hex(path),
        _ => load_binary(path, endian),
    }
}

/// Write words out as a raw binary dump.
pub fn save_binary<P: AsRef<Path>>(
    path: P,
    words: &[u16],
    endian: Endian,
) -> Result<(), ImageError> {
    fs::write(path, encode_words(words, endian))?;
    Ok(())
}

/// Errors that can occur while loading or saving program images.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("raw image has an odd byte count ({0})")]
    OddLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_skips_comments_and_blanks() {
        let source = "\
; leading comment
// slash comment too

0x5100
D00B
f800 ; trailing note
";
        assert_eq!(parse_hex(source).unwrap(), vec![0x5100, 0xD00B, 0xF800]);
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        let err = parse_hex("5100\nnot-hex\n").unwrap_err();
        match err {
            ImageError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn parse_hex_rejects_wide_values() {
        assert!(parse_hex("0x10000\n").is_err());
        assert!(parse_hex("0xFFFF\n").is_ok());
    }

    #[test]
    fn word_codec_little_endian() {
        let bytes = [0x0B, 0xD0, 0x00, 0x51];
        assert_eq!(
            decode_words(&bytes, Endian::Little).unwrap(),
            vec![0xD00B, 0x5100]
        );
        assert_eq!(encode_words(&[0xD00B, 0x5100], Endian::Little), bytes);
    }

    #[test]
    fn word_codec_big_endian() {
        let bytes = [0xD0, 0x0B, 0x51, 0x00];
        assert_eq!(
            decode_words(&bytes, Endian::Big).unwrap(),
            vec![0xD00B, 0x5100]
        );
        assert_eq!(encode_words(&[0xD00B, 0x5100], Endian::Big), bytes);
    }

    #[test]
    fn odd_byte_count_is_rejected() {
        assert!(matches!(
            decode_words(&[0x01, 0x02, 0x03], Endian::Little),
            Err(ImageError::OddLength(3))
        ));
    }

    #[test]
    fn hex_text_matches_binary_roundtrip() {
        let words = parse_hex("0100\n0110\n4001\n5101\n01FE\nF800\n").unwrap();
        let bytes = encode_words(&words, Endian::Big);
        assert_eq!(decode_words(&bytes, Endian::Big).unwrap(), words);
    }
}
