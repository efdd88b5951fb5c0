//! Legal-entity designators stripped from the end of business names

/// Default lexicon of business-entity designators
pub const DEFAULT_ENTITY_TERMS: &[&str] = &[
    "co",
    "company",
    "corp",
    "corporation",
    "inc",
    "incorporated",
    "limited",
    "limited liability company",
    "limited liability partnership",
    "limited partnership",
    "llc",
    "lllp",
    "llp",
    "lp",
    "ltd",
    "pc",
    "plc",
    "pllc",
    "professional corporation",
];

/// A lexicon of entity designators, pre-normalized for suffix matching
///
/// Terms are compared token by token after lowercasing and dropping
/// punctuation, so `"Co."`, `"CO"` and `"co"` are the same designator. Terms
/// are tried longest first and then alphabetically, and the pass repeats
/// until no term matches, so a name ending in several designators loses all
/// of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTerms {
    terms: Vec<Vec<String>>,
}

impl Default for EntityTerms {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITY_TERMS.iter().copied())
    }
}

impl EntityTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<Vec<String>> = terms
            .into_iter()
            .map(|t| {
                t.as_ref()
                    .split_whitespace()
                    .map(normalize_token)
                    .filter(|tok| !tok.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|parts| !parts.is_empty())
            .collect();

        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();

        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Remove trailing designators from `name`
    ///
    /// The surviving words are joined with single spaces. The result may be
    /// empty when the name consists only of designators.
    pub fn strip_suffixes(&self, name: &str) -> String {
        let name = strip_tail(name);
        let mut parts: Vec<&str> = name.split_whitespace().collect();
        let mut normalized: Vec<String> = parts.iter().map(|p| normalize_token(p)).collect();

        loop {
            let before = normalized.len();
            for term in &self.terms {
                let size = term.len();
                if normalized.len() >= size && normalized[normalized.len() - size..] == term[..] {
                    normalized.truncate(normalized.len() - size);
                    parts.truncate(parts.len() - size);
                }
            }
            if normalized.len() == before {
                break;
            }
        }

        strip_tail(&parts.join(" ")).to_string()
    }
}

/// Lowercase and drop punctuation
fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Drop trailing symbols other than word characters and periods
fn strip_tail(name: &str) -> &str {
    name.trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '.' || c == '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_single_suffix() {
        let terms = EntityTerms::default();
        assert_eq!(
            terms.strip_suffixes("Victoria Fire and Casualty Co."),
            "Victoria Fire and Casualty"
        );
        assert_eq!(terms.strip_suffixes("XYZ Incorporated"), "XYZ");
        assert_eq!(terms.strip_suffixes("ABC Corp"), "ABC");
    }

    #[test]
    fn test_multi_token_term_wins() {
        let terms = EntityTerms::default();
        assert_eq!(terms.strip_suffixes("Acme Limited Partnership"), "Acme");
    }

    #[test]
    fn test_repeated_designators_all_stripped() {
        let terms = EntityTerms::default();
        assert_eq!(terms.strip_suffixes("ABC Co Co"), "ABC");
        assert_eq!(terms.strip_suffixes("Acme Corp. Inc."), "Acme");
        assert_eq!(terms.strip_suffixes("Acme Inc. Corp."), "Acme");
    }

    #[test]
    fn test_designator_inside_name_kept() {
        let terms = EntityTerms::default();
        assert_eq!(terms.strip_suffixes("Co Op Bank"), "Co Op Bank");
    }

    #[test]
    fn test_only_designators_yields_empty() {
        let terms = EntityTerms::default();
        assert_eq!(terms.strip_suffixes("Inc."), "");
    }

    #[test]
    fn test_custom_lexicon() {
        let terms = EntityTerms::new(["N.A.", "bank"]);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms.strip_suffixes("Wells Fargo N.A."), "Wells Fargo");
        assert_eq!(terms.strip_suffixes("Wells Fargo Co."), "Wells Fargo Co.");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let terms = EntityTerms::default();
        assert_eq!(terms.strip_suffixes("Acme   Holdings  Inc"), "Acme Holdings");
    }
}
