use crate::catalog::ExciseRule;

/// The excise rule chosen for a code and the prefix that selected it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExciseMatch<'a> {
    pub rule: &'a ExciseRule,
    pub matched_prefix: &'a str,
}

/// Find the excise rule whose listed prefix best matches `code`.
///
/// A prefix matches when the code starts with it, or when the input is a
/// short code that the (longer) listed code starts with. The longest matching
/// prefix wins; on equal length the earlier rule is kept.
pub fn best_excise_rule<'a>(rules: &'a [ExciseRule], code: &str) -> Option<ExciseMatch<'a>> {
    let mut best: Option<ExciseMatch<'a>> = None;

    for rule in rules {
        for prefix in rule.prefixes() {
            let matches = code.starts_with(prefix)
                || (prefix.len() > code.len() && prefix.starts_with(code));
            if !matches {
                continue;
            }
            let longer = best
                .as_ref()
                .map_or(true, |b| prefix.len() > b.matched_prefix.len());
            if longer {
                best = Some(ExciseMatch {
                    rule,
                    matched_prefix: prefix,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rule(id: u32, codes: &str) -> ExciseRule {
        ExciseRule {
            id,
            category: "alcohol".into(),
            product_name: format!("Rule {}", id),
            product_name_local: None,
            codes: codes.into(),
            rate_percent: Some(dec!(20)),
            rate_specific: None,
            rate_unit: None,
            is_active: true,
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        let rules = vec![rule(1, "2203"), rule(2, "2204, 220300"), rule(3, "22")];
        let m = best_excise_rule(&rules, "2203001000").unwrap();
        assert_eq!(m.rule.id, 2);
        assert_eq!(m.matched_prefix, "220300");
    }

    #[test]
    fn test_short_input_matches_longer_rule_code() {
        let rules = vec![rule(1, "2402201000,2402209000")];
        let m = best_excise_rule(&rules, "2402").unwrap();
        assert_eq!(m.rule.id, 1);
        assert_eq!(m.matched_prefix, "2402201000");
    }

    #[test]
    fn test_tie_keeps_first_rule() {
        let rules = vec![rule(1, "2710"), rule(2, "2710")];
        assert_eq!(best_excise_rule(&rules, "2710124100").unwrap().rule.id, 1);
    }

    #[test]
    fn test_no_match() {
        let rules = vec![rule(1, "2203"), rule(2, "2402")];
        assert!(best_excise_rule(&rules, "8703231000").is_none());
        assert!(best_excise_rule(&rules, "2204").is_none());
    }
}
