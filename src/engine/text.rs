//! Caption and marker text normalization.
//!
//! The dictionary workbooks spell their section markers inconsistently
//! ("SECCIÓN", "SECCION", "Sección"); every textual heuristic in the engine
//! therefore compares accent-stripped, case-folded forms. Output file names
//! come from [`slugify`], which reduces a free-text caption to a
//! deterministic `[A-Z0-9_-]` identifier.

use regex::Regex;

/// Maps accented vowels to their unaccented base letters.
/// All other characters pass through unchanged.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|character| match character {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' => 'U',
            other => other,
        })
        .collect()
}

/// Tests whether `text` starts with `marker`, ignoring accents, case,
/// and leading/trailing whitespace on both sides.
pub fn starts_with_marker(text: &str, marker: &str) -> bool {
    let text = strip_accents(text.trim()).to_lowercase();
    let marker = strip_accents(marker.trim()).to_lowercase();
    text.starts_with(marker.as_str())
}

/// Derives a filesystem-safe identifier from a free-text caption.
///
/// Steps, in order: strip accents, uppercase, delete newlines, replace ':'
/// with '-', delete every character that is not an ASCII word character,
/// whitespace, or '-', replace whitespace with '_', collapse "-_" back to
/// a bare '-', and strip one trailing '_'. Deterministic and side-effect
/// free; distinct captions may collide on the same slug.
pub fn slugify(caption: &str) -> String {
    let pattern = Regex::new(r"[^A-Za-z0-9_\s-]").expect("Hardcode regex pattern");
    let text = strip_accents(caption).to_uppercase().replace('\n', "").replace(':', "-");
    let text = pattern.replace_all(&text, "");
    let text: String = text
        .chars()
        .map(|character| if character.is_whitespace() { '_' } else { character })
        .collect();
    let text = text.replace("-_", "-");
    text.strip_suffix('_').unwrap_or(&text).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_accents_maps_vowels() {
        assert_eq!(strip_accents("áéíóú ÁÉÍÓÚ"), "aeiou AEIOU");
    }

    #[test]
    fn strip_accents_is_noop_without_accents() {
        let plain = "SECTION A: plain text 123 _-;";
        assert_eq!(strip_accents(plain), plain);
    }

    #[test]
    fn marker_prefix_ignores_accents_and_case() {
        assert!(starts_with_marker("SECCIÓN A: FOO", "seccion"));
        assert!(starts_with_marker("  sección b", "SECCION"));
        assert!(!starts_with_marker("SELECCIÓN", "SECCION A"));
    }

    #[test]
    fn marker_prefix_matches_caption_prefixes() {
        assert!(starts_with_marker("REM-A01: CONTROLES", "REM"));
        assert!(!starts_with_marker("CONTROLES REM", "REM"));
    }

    #[test]
    fn slugify_section_caption() {
        assert_eq!(slugify("SECCIÓN B: FOO"), "SECCION_B-FOO");
    }

    #[test]
    fn slugify_removes_punctuation_and_newlines() {
        assert_eq!(slugify("cool-text; \n"), "COOL-TEXT");
    }

    #[test]
    fn slugify_keeps_underscores_and_digits() {
        assert_eq!(slugify("rem_a01 total (2009)"), "REM_A01_TOTAL_2009");
    }

    #[test]
    fn slugify_never_ends_in_underscore() {
        assert!(!slugify("trailing space ").ends_with('_'));
    }

    #[test]
    fn slugify_alphabet_is_bounded() {
        let slug = slugify("SECCIÓN C.2: Niños; vacunación\t(total)");
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-'));
    }
}
