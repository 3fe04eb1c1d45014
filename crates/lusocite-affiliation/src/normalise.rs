//! Affiliation string normalisation.
//!
//! The normalised form is the key of the affiliation map, so it must stay
//! stable across releases: lowercase, the accented vowels of Portuguese
//! replaced by their bare letter, and ASCII punctuation and whitespace
//! trimmed from both ends. Interior text is left alone.
//!
//! Whitespace trimming goes beyond the older punctuation-only form: keys in
//! an existing `affiliations.json` with surrounding spaces no longer match.

const ACCENTED: &str = "áéíóúàèìòùãõâêîôû";
const PLAIN:    &str = "aeiouaeiouaoaeiou";

fn strip_accent(c: char) -> char {
    match ACCENTED.chars().position(|a| a == c) {
        Some(i) => PLAIN.chars().nth(i).unwrap_or(c),
        None    => c,
    }
}

pub fn normalise(text: &str) -> String {
    let folded: String = text.to_lowercase().chars().map(strip_accent).collect();
    folded
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_folds_case_and_accents() {
        assert_eq!(normalise("Universidade de São Paulo, Brasil"), "universidade de sao paulo, brasil");
        assert_eq!(normalise("Universidade Federal do Pará"), "universidade federal do para");
        assert_eq!(normalise("GOIÂNIA"), "goiania");
    }

    #[test]
    fn test_normalise_trims_punctuation_at_both_ends_only() {
        assert_eq!(normalise(" (UFMG), Brasil. "), "ufmg), brasil");
        assert_eq!(normalise("Dept. of C.S., MIT, United States"), "dept. of c.s., mit, united states");
        assert_eq!(normalise("...;"), "");
    }

    #[test]
    fn test_surrounding_whitespace_maps_to_one_key() {
        assert_eq!(normalise("  INESC-ID, Portugal \t"), normalise("INESC-ID, Portugal"));
        assert_eq!(normalise(" , INESC-ID, Portugal ;"), "inesc-id, portugal");
    }

    #[test]
    fn test_cedilla_is_kept() {
        assert_eq!(normalise("Moçambique"), "moçambique");
    }
}
