//! Normalization of free-text application labels into [`ApplicationCode`]s.
//!
//! Vendors describe the same assay in many ways ("Western blot", "WB",
//! "ICC/IF", "Flow Cyt (Intracellular)"). Each rule in a [`RuleTable`] carries
//! a [`Specificity`] tier. Hits on a single label are ordered by tier first and
//! table position second, and a compound rule may subsume the generic codes it
//! refines, so new rules can be appended without reshuffling the table.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::ApplicationCode;
use crate::error::AbSearchError;

/// Precedence class of a rule, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    /// Phrases that combine two concepts, e.g. "intracellular flow" or "ICC/IF".
    Compound,
    /// Full method names, e.g. "western blot".
    Phrase,
    /// Bare abbreviations, e.g. "WB".
    Abbreviation,
}

/// Where in a label a rule may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Anywhere in the label, or as a whole token.
    Anywhere,
    /// Only as a whole token, for abbreviations that also occur as ordinary
    /// words in product names.
    Token,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub code: ApplicationCode,
    pub tier: Specificity,
    pub scope: Scope,
    pub subsumes: Vec<ApplicationCode>,
    search: Regex,
    whole: Regex,
}

impl Rule {
    /// Build a rule from a regex fragment. Matching is case-insensitive and
    /// word-bounded; use `\s*` inside multi-word phrases.
    pub fn new(
        code: ApplicationCode,
        tier: Specificity,
        pattern: &str,
        subsumes: &[ApplicationCode],
    ) -> Result<Self, AbSearchError> {
        Self::scoped(code, tier, Scope::Anywhere, pattern, subsumes)
    }

    pub fn scoped(
        code: ApplicationCode,
        tier: Specificity,
        scope: Scope,
        pattern: &str,
        subsumes: &[ApplicationCode],
    ) -> Result<Self, AbSearchError> {
        let compile = |source: String| {
            Regex::new(&source).map_err(|err| AbSearchError::InvalidPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })
        };
        Ok(Self {
            code,
            tier,
            scope,
            subsumes: subsumes.to_vec(),
            search: compile(format!(r"(?i)\b(?:{pattern})"))?,
            whole: compile(format!(r"(?i)^(?:{pattern})$"))?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.scope == Scope::Anywhere && self.search.is_match(text)
    }

    pub fn is_whole_match(&self, token: &str) -> bool {
        self.whole.is_match(token)
    }
}

use ApplicationCode::*;
use Specificity::*;

type StandardRule = (
    ApplicationCode,
    Specificity,
    Scope,
    &'static str,
    &'static [ApplicationCode],
);

// The bare "FC" token is case-sensitive: "Fc" is the immunoglobulin fragment.
const STANDARD_RULES: &[StandardRule] = &[
    (Icfc, Compound, Scope::Anywhere, r"intracellular\s*flow\b", &[Fc]),
    (Icfc, Compound, Scope::Anywhere, r"flow\s*cytometry\s*\(\s*intracellular\s*\)", &[Fc]),
    (Icfc, Compound, Scope::Anywhere, r"flow\s*cytometry\s*,?\s*intracellular\b", &[Fc]),
    (Icfc, Compound, Scope::Anywhere, r"flow\s*cyt\s*\(\s*intra\s*\)", &[Fc]),
    (Icfc, Compound, Scope::Anywhere, r"permeabili[sz](?:ed|ation)\s*flow\b", &[Fc]),
    (Icc, Compound, Scope::Anywhere, r"ICC\s*/\s*IF\b", &[If]),
    (Icc, Compound, Scope::Anywhere, r"IF\s*-?\s*ICC\b", &[If]),
    (Chip, Compound, Scope::Anywhere, r"chromatin\s*immunoprecipitation\b", &[Ip]),
    (Rip, Compound, Scope::Anywhere, r"RNA\s*immunoprecipitation\b", &[Ip]),
    (Icc, Phrase, Scope::Anywhere, r"immunocytochemistry\b", &[]),
    (Ihc, Phrase, Scope::Anywhere, r"immunohistochemistry\b", &[]),
    (Wb, Phrase, Scope::Anywhere, r"western\s*blot(?:ting)?\b", &[]),
    (If, Phrase, Scope::Anywhere, r"immunofluorescence\b", &[]),
    (Fc, Phrase, Scope::Anywhere, r"flow\s*cytometry\b", &[]),
    (Elisa, Phrase, Scope::Anywhere, r"(?:sandwich|competitive|indirect)\s*ELISA\b", &[]),
    (Ip, Phrase, Scope::Anywhere, r"immunoprecipitation\b", &[]),
    (DotBlot, Phrase, Scope::Anywhere, r"dot\s*blot\b", &[]),
    (Icfc, Abbreviation, Scope::Anywhere, r"ICFC\b", &[]),
    (Icc, Abbreviation, Scope::Anywhere, r"ICC\b", &[]),
    (Ihc, Abbreviation, Scope::Anywhere, r"IHC(?:\s*-?\s*(?:P|Fr))?\b", &[]),
    (Wb, Abbreviation, Scope::Anywhere, r"WB\b", &[]),
    (If, Abbreviation, Scope::Anywhere, r"IF\b", &[]),
    (Fc, Abbreviation, Scope::Anywhere, r"(?:FACS|FCM)\b", &[]),
    (Fc, Abbreviation, Scope::Token, r"(?-i:FC|fc)", &[]),
    (Elisa, Abbreviation, Scope::Anywhere, r"ELISA\b", &[]),
    (Ip, Abbreviation, Scope::Anywhere, r"IP\b", &[]),
    (Chip, Abbreviation, Scope::Anywhere, r"ChIP(?:\s*-?\s*seq)?\b", &[]),
    (Rip, Abbreviation, Scope::Anywhere, r"RIP\b", &[]),
];

/// An ordered, extensible set of normalization rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in vendor vocabulary.
    pub fn standard() -> &'static RuleTable {
        static TABLE: OnceLock<RuleTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let rules = STANDARD_RULES
                .iter()
                .map(|(code, tier, scope, pattern, subsumes)| {
                    Rule::scoped(*code, *tier, *scope, pattern, subsumes)
                        .expect("built-in application patterns are valid")
                })
                .collect();
            RuleTable { rules }
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn with_rule(
        mut self,
        code: ApplicationCode,
        tier: Specificity,
        pattern: &str,
        subsumes: &[ApplicationCode],
    ) -> Result<Self, AbSearchError> {
        self.push(Rule::new(code, tier, pattern, subsumes)?);
        Ok(self)
    }

    /// Codes for one label, ordered by tier then table position, with
    /// subsumed codes removed. May contain duplicates.
    pub fn classify(&self, label: &str) -> Vec<ApplicationCode> {
        let text = label.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(Specificity, usize, ApplicationCode)> = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.is_match(text) {
                hits.push((rule.tier, index, rule.code));
            }
        }
        for token in text.split(|ch: char| ch.is_whitespace() || ch == ',' || ch == '/') {
            if token.is_empty() {
                continue;
            }
            for (index, rule) in self.rules.iter().enumerate() {
                if rule.is_whole_match(token) {
                    hits.push((rule.tier, index, rule.code));
                }
            }
        }

        let subsumed: HashSet<ApplicationCode> = hits
            .iter()
            .flat_map(|(_, index, _)| self.rules[*index].subsumes.iter().copied())
            .collect();

        hits.sort_by_key(|(tier, index, _)| (*tier, *index));
        hits.into_iter()
            .map(|(_, _, code)| code)
            .filter(|code| !subsumed.contains(code))
            .collect()
    }

    pub fn normalize<I, S>(&self, labels: I) -> Vec<ApplicationCode>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for label in labels {
            for code in self.classify(label.as_ref()) {
                if seen.insert(code) {
                    ordered.push(code);
                }
            }
        }
        ordered
    }
}

/// Normalize labels with the standard rule table.
pub fn normalize_applications<I, S>(labels: I) -> Vec<ApplicationCode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RuleTable::standard().normalize(labels)
}

/// Priority tier of a set of codes: ICFC 3, else ICC 2, else IHC 1, else 0.
/// Only the highest tier present counts.
pub fn application_score(codes: &[ApplicationCode]) -> u8 {
    if codes.contains(&Icfc) {
        3
    } else if codes.contains(&Icc) {
        2
    } else if codes.contains(&Ihc) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intracellular_flow_wins_over_generic_flow() {
        assert_eq!(
            normalize_applications(["Flow Cytometry, Intracellular"]),
            vec![Icfc]
        );
        assert_eq!(
            normalize_applications(["Flow cytometry (intracellular)"]),
            vec![Icfc]
        );
        assert_eq!(normalize_applications(["Intracellular flow"]), vec![Icfc]);
    }

    #[test]
    fn plain_flow_cytometry_is_fc() {
        assert_eq!(normalize_applications(["Flow cytometry"]), vec![Fc]);
        assert_eq!(normalize_applications(["FACS"]), vec![Fc]);
    }

    #[test]
    fn icc_if_maps_to_icc_only() {
        assert_eq!(normalize_applications(["ICC/IF"]), vec![Icc]);
        assert_eq!(normalize_applications(["IF-ICC"]), vec![Icc]);
        assert_eq!(normalize_applications(["ICC / IF"]), vec![Icc]);
    }

    #[test]
    fn duplicates_removed_in_first_seen_order() {
        assert_eq!(normalize_applications(["WB", "WB", "IHC"]), vec![Wb, Ihc]);
    }

    #[test]
    fn flexible_whitespace_and_case() {
        assert_eq!(normalize_applications(["western   blot"]), vec![Wb]);
        assert_eq!(normalize_applications(["IMMUNOHISTOCHEMISTRY"]), vec![Ihc]);
        assert_eq!(normalize_applications(["IHC-P", "ihc-fr"]), vec![Ihc]);
    }

    #[test]
    fn short_tokens_inside_longer_labels() {
        assert_eq!(
            normalize_applications(["Suitable for: WB, ELISA"]),
            vec![Wb, Elisa]
        );
    }

    #[test]
    fn codes_are_fixed_points() {
        let codes: Vec<String> = ApplicationCode::ALL
            .iter()
            .map(|code| code.to_string())
            .collect();
        let normalized = normalize_applications(&codes);
        assert_eq!(normalized, ApplicationCode::ALL.to_vec());
        let again: Vec<String> = normalized.iter().map(|code| code.to_string()).collect();
        assert_eq!(normalize_applications(&again), normalized);
    }

    #[test]
    fn chip_does_not_leak_ip() {
        assert_eq!(normalize_applications(["ChIP-seq"]), vec![Chip]);
        assert_eq!(
            normalize_applications(["Chromatin immunoprecipitation"]),
            vec![Chip]
        );
    }

    #[test]
    fn bare_fc_only_as_a_token() {
        assert_eq!(normalize_applications(["WB, FC"]), vec![Wb, Fc]);
        assert_eq!(normalize_applications(["fc"]), vec![Fc]);
        assert!(normalize_applications(["Anti-Human IgG Fc antibody"]).is_empty());
        assert!(normalize_applications(["Goat anti-human IgG (Fc specific)"]).is_empty());
        assert!(normalize_applications(["FcRn"]).is_empty());
    }

    #[test]
    fn blank_and_unknown_labels_yield_nothing() {
        assert!(normalize_applications(["", "   ", "Mass spec"]).is_empty());
    }

    #[test]
    fn custom_rule_appended_without_reordering() {
        let table = RuleTable::standard()
            .clone()
            .with_rule(Icfc, Compound, r"intra\s*FC\b", &[Fc])
            .unwrap();
        assert_eq!(table.normalize(["Intra FC"]), vec![Icfc]);
        assert_eq!(table.normalize(["FC"]), vec![Fc]);
    }

    #[test]
    fn invalid_custom_pattern_is_rejected() {
        let err = RuleTable::empty()
            .with_rule(Wb, Phrase, r"western(", &[])
            .unwrap_err();
        assert!(matches!(err, AbSearchError::InvalidPattern { .. }));
    }

    #[test]
    fn score_uses_highest_tier_only() {
        assert_eq!(application_score(&[Ihc, Icc, Icfc]), 3);
        assert_eq!(application_score(&[Wb, Icc]), 2);
        assert_eq!(application_score(&[Ihc]), 1);
        assert_eq!(application_score(&[Wb, If]), 0);
    }
}
