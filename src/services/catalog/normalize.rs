//! Display-oriented name normalization: size and gender suffix extraction.
//!
//! Runs per record at catalog-assembly time, never at ingestion time, and is
//! not involved in search-key derivation. This scan is token-aware, unlike
//! the parser's first-hyphen cut; the two mechanisms coexist deliberately
//! (see DESIGN.md).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Size abbreviations in scan order: longest tokens first, so a two-letter
/// code never falsely matches inside a three-letter one.
const SIZE_TOKENS: &[(&str, &str)] = &[
    ("XLG", "Extra Large"),
    ("MLG", "Medium-Large"),
    ("MED", "Medium"),
    ("SML", "Small"),
    ("LRG", "Large"),
    ("XL", "Extra Large"),
    ("ML", "Medium-Large"),
    ("MD", "Medium"),
    ("LG", "Large"),
    ("SM", "Small"),
];

/// Result of normalizing one raw catalog name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedName {
    pub display_name: String,
    pub size: Option<String>,
    pub gender: Option<String>,
}

/// Derives the display form of a raw catalog name, extracting at most one
/// size token and a trailing gender token.
///
/// Pure function: the same input always yields the same triple. Names that
/// legitimately contain a size-like substring are a known heuristic
/// false-positive risk inherited from the source data conventions.
pub fn normalize(raw_name: &str) -> NormalizedName {
    let mut name = raw_name
        .trim_end_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string();

    let size = extract_size(&mut name);
    let gender = extract_trailing_gender(&mut name);

    NormalizedName {
        display_name: tidy(&name),
        size,
        gender,
    }
}

/// Finds the first size token that occurs as a whole word with a hyphen or
/// space separator before it, removes the token and its separator, and
/// returns the expanded size word. Only one size is extracted per name.
fn extract_size(name: &mut String) -> Option<String> {
    let upper = name.to_ascii_uppercase();
    for (token, expanded) in SIZE_TOKENS {
        let mut search_from = 0;
        while let Some(rel) = upper[search_from..].find(token) {
            let start = search_from + rel;
            let end = start + token.len();

            let preceded =
                start == 0 || matches!(upper.as_bytes()[start - 1], b'-' | b' ');
            let bounded = end == upper.len()
                || !upper.as_bytes()[end].is_ascii_alphanumeric();

            if preceded && bounded {
                // Remove the separator along with the token.
                let from = if start > 0 { start - 1 } else { start };
                name.replace_range(from..end, "");
                return Some((*expanded).to_string());
            }
            search_from = end;
        }
    }
    None
}

/// Extracts a trailing `MALE`/`FEMALE` token, optionally hyphen-prefixed,
/// and returns it title-cased. `FEMALE` is checked first so its `MALE` tail
/// never matches by accident.
fn extract_trailing_gender(name: &mut String) -> Option<String> {
    let upper = name.to_ascii_uppercase();
    let trimmed = upper.trim_end();

    for (token, titled) in [("FEMALE", "Female"), ("MALE", "Male")] {
        if let Some(prefix) = trimmed.strip_suffix(token) {
            let boundary_ok = prefix.is_empty()
                || prefix.ends_with('-')
                || prefix.ends_with(' ');
            if !boundary_ok {
                continue;
            }
            let mut cut = prefix.len();
            if cut > 0 {
                cut -= 1; // drop the separator too
            }
            name.truncate(cut);
            return Some(titled.to_string());
        }
    }
    None
}

/// Collapses hyphen runs to single spaces, collapses whitespace runs, trims.
fn tidy(name: &str) -> String {
    let despaced: String = name
        .chars()
        .map(|c| if c == '-' { ' ' } else { c })
        .collect();
    despaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_gender_extraction() {
        let n = normalize("CLOWNFISH-MD-MALE");
        assert_eq!(n.display_name, "CLOWNFISH");
        assert_eq!(n.size.as_deref(), Some("Medium"));
        assert_eq!(n.gender.as_deref(), Some("Male"));
    }

    #[test]
    fn female_never_matches_as_male() {
        let n = normalize("MANDARIN GOBY-FEMALE");
        assert_eq!(n.display_name, "MANDARIN GOBY");
        assert_eq!(n.gender.as_deref(), Some("Female"));
        assert_eq!(n.size, None);
    }

    #[test]
    fn longest_size_token_wins() {
        // XLG must not be consumed as XL followed by a stray G.
        let n = normalize("NASO TANG-XLG");
        assert_eq!(n.size.as_deref(), Some("Extra Large"));
        assert_eq!(n.display_name, "NASO TANG");
    }

    #[test]
    fn only_one_size_is_extracted() {
        let n = normalize("WRASSE-SM-LG");
        assert_eq!(n.size.as_deref(), Some("Large"));
        // The unmatched token survives, with hyphens rendered as spaces.
        assert_eq!(n.display_name, "WRASSE SM");
    }

    #[test]
    fn size_requires_separator_and_word_boundary() {
        // "SM" inside a word is part of the species name, not a size.
        let n = normalize("DAMSEL");
        assert_eq!(n.size, None);
        assert_eq!(n.display_name, "DAMSEL");

        let n = normalize("SMITH'S BLENNY");
        assert_eq!(n.size, None);
        assert_eq!(n.display_name, "SMITH'S BLENNY");
    }

    #[test]
    fn space_prefixed_size_matches() {
        let n = normalize("YELLOW TANG LG");
        assert_eq!(n.size.as_deref(), Some("Large"));
        assert_eq!(n.display_name, "YELLOW TANG");
    }

    #[test]
    fn trailing_hyphens_are_trimmed_first() {
        let n = normalize("FIREFISH- ");
        assert_eq!(n.display_name, "FIREFISH");
        assert_eq!(n.size, None);
        assert_eq!(n.gender, None);
    }

    #[test]
    fn hyphen_runs_collapse_to_spaces() {
        let n = normalize("BLUE-SPOT JAWFISH-MD");
        assert_eq!(n.size.as_deref(), Some("Medium"));
        assert_eq!(n.display_name, "BLUE SPOT JAWFISH");
    }

    #[test]
    fn normalization_is_deterministic() {
        assert_eq!(normalize("CLOWNFISH-MD-MALE"), normalize("CLOWNFISH-MD-MALE"));
    }
}
