use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::{ConversionError, Result};

const UTF8_BOM: &str = "\u{feff}";

/// Replaces every line break (`\r\n`, `\r` or `\n`) with a single space.
///
/// RIS values can be wrapped over several lines, so tag markers are searched
/// for in one continuous line of text.
pub(crate) fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", " ").replace(['\r', '\n'], " "))
}

/// Strips a leading UTF-8 byte order mark, as written by some reference managers.
pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix(UTF8_BOM).unwrap_or(text)
}

/// Decodes raw bytes as UTF-8.
///
/// UTF-16 byte order marks are reported by name, since those files are a
/// common export format of older reference managers.
pub(crate) fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    match bytes.get(..2) {
        Some([0xFF, 0xFE]) => {
            return Err(ConversionError::Decode {
                message: "found a UTF-16 LE byte order mark".to_string(),
            });
        }
        Some([0xFE, 0xFF]) => {
            return Err(ConversionError::Decode {
                message: "found a UTF-16 BE byte order mark".to_string(),
            });
        }
        _ => {}
    }

    String::from_utf8(bytes).map_err(|e| ConversionError::Decode {
        message: format!(
            "invalid UTF-8 sequence at byte {}",
            e.utf8_error().valid_up_to()
        ),
    })
}

/// Expands a leading `~/` to the user's home directory, if `HOME` is set.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => Path::new(&home).join(rest),
        _ => PathBuf::from(path),
    }
}

/// Checks the extension of a path, ignoring ASCII case.
pub(crate) fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("TY  - JOUR", "TY  - JOUR")]
    #[case("TY  - JOUR\nER  - ", "TY  - JOUR ER  - ")]
    #[case("TY  - JOUR\r\nER  - ", "TY  - JOUR ER  - ")]
    #[case("TY  - JOUR\rER  - ", "TY  - JOUR ER  - ")]
    #[case("a\n\nb", "a  b")]
    fn test_normalize_line_breaks(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_line_breaks(input), expected);
    }

    #[test]
    fn test_normalize_borrows_single_line() {
        assert!(matches!(normalize_line_breaks("TY  - JOUR"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}TY  - JOUR"), "TY  - JOUR");
        assert_eq!(strip_bom("TY  - JOUR"), "TY  - JOUR");
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_utf8(b"TY  - JOUR".to_vec()).unwrap(), "TY  - JOUR");

        let err = decode_utf8(b"TI  - Caf\xe9".to_vec()).unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8 sequence at byte 9"));

        let err = decode_utf8(vec![0xFF, 0xFE, b'T', 0]).unwrap_err();
        assert!(err.to_string().contains("UTF-16 LE"));

        let err = decode_utf8(vec![0xFE, 0xFF, 0, b'T']).unwrap_err();
        assert!(err.to_string().contains("UTF-16 BE"));
    }

    #[rstest]
    #[case("refs.ris", "ris", true)]
    #[case("refs.RIS", "ris", true)]
    #[case("refs.csv", "ris", false)]
    #[case("refs", "ris", false)]
    #[case("refs.ris.bak", "ris", false)]
    fn test_has_extension(#[case] path: &str, #[case] ext: &str, #[case] expected: bool) {
        assert_eq!(has_extension(Path::new(path), ext), expected);
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(
            expand_home("out/report.csv"),
            PathBuf::from("out/report.csv")
        );
    }
}
