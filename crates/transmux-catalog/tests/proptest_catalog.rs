//! Property tests for plural evaluation and locale expansion.

use proptest::prelude::*;
use transmux_catalog::PluralRule;
use transmux_catalog::locale::candidates;

const RULES: &[&str] = &[
    "nplurals=1; plural=0;",
    "nplurals=2; plural=(n != 1);",
    "nplurals=2; plural=(n > 1);",
    "nplurals=3; plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
    "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
    "nplurals=4; plural=(n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3);",
    "nplurals=6; plural=(n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5);",
];

// ── Strategies ──────────────────────────────────────────────────────────

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,6}"
}

fn locale_strategy() -> impl Strategy<Value = (String, Option<String>, Option<String>, Option<String>)> {
    (
        "[a-z]{2,3}",
        prop::option::of(segment()),
        prop::option::of(segment()),
        prop::option::of(segment()),
    )
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn real_rules_stay_in_range(rule in prop::sample::select(RULES), n in any::<u64>()) {
        let rule = PluralRule::parse(rule).unwrap();
        prop_assert!(rule.index(n) < rule.nplurals());
    }

    #[test]
    fn candidates_run_from_full_name_to_language(
        (language, territory, codeset, modifier) in locale_strategy(),
    ) {
        let mut locale = language.clone();
        for (sep, part) in [('_', &territory), ('.', &codeset), ('@', &modifier)] {
            if let Some(part) = part {
                locale.push(sep);
                locale.push_str(part);
            }
        }

        let out = candidates(&locale).unwrap();
        let parts = [&territory, &codeset, &modifier]
            .iter()
            .filter(|p| p.is_some())
            .count();
        prop_assert_eq!(out.len(), 1 << parts);
        prop_assert_eq!(out.first(), Some(&locale));
        prop_assert_eq!(out.last(), Some(&language));
        prop_assert!(out.iter().all(|c| c.starts_with(language.as_str())));
    }
}
