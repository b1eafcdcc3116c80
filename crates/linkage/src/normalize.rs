//! Display name → canonical key.
//!
//! The pipeline is a fixed sequence of text rewrites. The two rule tables
//! below are plain ordered data so each can be tested and extended on its
//! own; the functions that consume them do not know any authority names.

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// Literal corrections for known misspellings and variants, applied in order.
/// Every occurrence of a pattern is replaced.
pub const CORRECTIONS: &[(&str, &str)] = &[
    (" coucil", " council"),
    ("aberdeen c ity", "aberdeen city"),
    ("aberdeen cuty", "aberdeen city"),
    ("comhairle nan eilean siar (western isles)", "comhairle nan eilean siar"),
    ("merthyr tudful", "merthyr tydfil"),
    ("merthyr tydfil ua", "merthyr tydfil"),
    ("rhondda cynon taff", "rhondda cynon taf"),
];

/// Administrative suffixes, most specific first. Only the first one found at
/// the end of the name (and preceded by a space) is removed.
pub const ADMIN_SUFFIXES: &[&str] = &[
    "county borough council",
    "metropolitan district council",
    "metropolitan borough council",
    "borough council",
    "county council",
    "district council",
    "county borough",
    "council",
    "county of",
    "city of",
];

/// Connective left dangling once a suffix is gone.
const DANGLING_CONNECTIVE: &str = "and";

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Canonical key for a raw display name.
///
/// Runs [`normalize_once`] until the output is stable. Real-world names
/// settle after the first pass; repeated passes only matter for degenerate
/// input such as a doubled suffix, and make the result idempotent.
pub fn normalize(raw: &str) -> String {
    let mut current = normalize_once(raw);
    // Every pass that changes a key shortens it or replaces a 'u' with
    // another letter, so this bound is never reached in practice.
    let limit = 2 * current.len() + 2;
    for _ in 0..limit {
        let next = normalize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// One pass of the canonicalization pipeline, in the order:
/// trim, punctuation to spaces, collapse whitespace, lower-case, `&` → `and`,
/// corrections, suffix strip, dangling `and` strip, trim.
pub fn normalize_once(raw: &str) -> String {
    let spaced: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            ',' | '.' | '-' => ' ',
            other => other,
        })
        .collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let name = collapsed.to_lowercase().replace(" & ", " and ");
    let name = apply_corrections(&name, CORRECTIONS);
    let name = strip_admin_suffix(&name, ADMIN_SUFFIXES);
    let name = strip_trailing_word(name, DANGLING_CONNECTIVE).unwrap_or(name);

    name.trim().to_string()
}

/// Apply each `(pattern, replacement)` pair in order.
pub fn apply_corrections(name: &str, rules: &[(&str, &str)]) -> String {
    rules
        .iter()
        .fold(name.to_string(), |acc, (pattern, replacement)| {
            if acc.contains(*pattern) {
                acc.replace(*pattern, replacement)
            } else {
                acc
            }
        })
}

/// Remove the first suffix in `suffixes` that ends the name as a whole word.
pub fn strip_admin_suffix<'a>(name: &'a str, suffixes: &[&str]) -> &'a str {
    suffixes
        .iter()
        .find_map(|suffix| strip_trailing_word(name, suffix))
        .unwrap_or(name)
}

/// `name` without a trailing ` <word>`; `None` when it does not end that way.
fn strip_trailing_word<'a>(name: &'a str, word: &str) -> Option<&'a str> {
    name.strip_suffix(word)?.strip_suffix(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aberdeen_variants_share_a_key() {
        assert_eq!(normalize("Aberdeen City Council"), "aberdeen city");
        assert_eq!(normalize("aberdeen c ity"), "aberdeen city");
        assert_eq!(normalize("Aberdeen Cuty Council"), "aberdeen city");
    }

    #[test]
    fn rhondda_correction_runs_before_suffix_strip() {
        assert_eq!(
            normalize("Rhondda Cynon Taff County Borough Council"),
            "rhondda cynon taf"
        );
    }

    #[test]
    fn merthyr_variants() {
        assert_eq!(normalize("Merthyr Tudful"), "merthyr tydfil");
        assert_eq!(normalize("Merthyr Tydfil UA"), "merthyr tydfil");
        assert_eq!(
            normalize("Merthyr Tydfil County Borough Council"),
            "merthyr tydfil"
        );
    }

    #[test]
    fn western_isles_parenthetical_dropped() {
        assert_eq!(
            normalize("Comhairle nan Eilean Siar (Western Isles)"),
            "comhairle nan eilean siar"
        );
    }

    #[test]
    fn coucil_typo_fixed_then_stripped() {
        assert_eq!(normalize("Wealden District Coucil"), "wealden");
    }

    #[test]
    fn punctuation_becomes_space() {
        assert_eq!(normalize("Stratford-on-Avon District Council"), "stratford on avon");
        assert_eq!(normalize("St. Albans City and District Council"), "st albans city");
        assert_eq!(normalize("Bristol, City of"), "bristol");
    }

    #[test]
    fn whitespace_collapsed_and_trimmed() {
        assert_eq!(normalize("  East   Riding \t of Yorkshire  "), "east riding of yorkshire");
    }

    #[test]
    fn ampersand_becomes_and() {
        assert_eq!(
            normalize("Brighton & Hove City Council"),
            "brighton and hove city"
        );
    }

    #[test]
    fn dangling_and_after_suffix_strip() {
        // Suffix goes first, which leaves the connective at the end.
        assert_eq!(normalize("Epsom and Ewell and Council"), "epsom and ewell");
    }

    #[test]
    fn only_most_specific_suffix_removed() {
        assert_eq!(strip_admin_suffix("kent county council", ADMIN_SUFFIXES), "kent");
        assert_eq!(
            strip_admin_suffix("wigan metropolitan borough council", ADMIN_SUFFIXES),
            "wigan"
        );
        assert_eq!(strip_admin_suffix("conwy county borough", ADMIN_SUFFIXES), "conwy");
    }

    #[test]
    fn suffix_must_be_a_whole_trailing_word() {
        assert_eq!(strip_admin_suffix("council", ADMIN_SUFFIXES), "council");
        assert_eq!(strip_admin_suffix("towncouncil", ADMIN_SUFFIXES), "towncouncil");
        assert_eq!(
            strip_admin_suffix("council of the isles of scilly", ADMIN_SUFFIXES),
            "council of the isles of scilly"
        );
    }

    #[test]
    fn single_pass_strips_one_suffix() {
        assert_eq!(normalize_once("Foo Council Council"), "foo council");
        assert_eq!(normalize("Foo Council Council"), "foo");
    }

    #[test]
    fn corrections_apply_in_order() {
        let rules = [("ab", "b"), ("bc", "x")];
        assert_eq!(apply_corrections("abc", &rules), "x");
    }

    #[test]
    fn empty_and_blank_names() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(" , . - "), "");
    }
}
