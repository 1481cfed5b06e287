//! Text canonicalization used by every comparison in the engine.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonicalizes a string for comparison.
///
/// Lowercases, strips diacritics (NFD decomposition with combining marks
/// removed), collapses internal whitespace runs to a single space, and trims
/// the edges. Total: any input produces a (possibly empty) output.
///
/// Report labels and roster names must go through the same canonicalization,
/// otherwise identities that should compare equal drift apart.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Ana SILVA  "), "ana silva");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize("João Luiz"), "joao luiz");
        assert_eq!(normalize("Duração"), "duracao");
        assert_eq!(normalize("ACENTUAÇÃO"), "acentuacao");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize("Ana\t\t Silva\n de  Souza"), "ana silva de souza");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n "), "");
    }

    #[test]
    fn keeps_digits_and_punctuation() {
        assert_eq!(normalize("01/02/2025  10:30:00"), "01/02/2025 10:30:00");
    }
}
