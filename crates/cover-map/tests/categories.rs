//! Category and area matching against the bundled vocabulary.

use std::sync::Arc;

use cover_map::{MatchSettings, MatchTier, NameMatcher, Vocabulary};
use cover_model::AreaKind;
use cover_standards::load_default_standards;

fn category_matcher() -> NameMatcher {
    let standards = load_default_standards().expect("load standards");
    let reference = &standards.reference;
    let vocabulary = Vocabulary::from_categories(reference.categories(), reference.aliases())
        .expect("category vocabulary");
    NameMatcher::new(Arc::new(vocabulary), MatchSettings::default())
}

#[test]
fn hyphenated_header_resolves_through_alias() {
    let mut matcher = category_matcher();
    let result = matcher.match_label("DTaP-IPV-Hib");
    assert_eq!(result.code.as_deref(), Some("DTaP_IPV_Hib"));
    assert_eq!(result.tier, MatchTier::Alias);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn canonical_names_and_codes_match_exactly() {
    let mut matcher = category_matcher();
    for (label, code) in [
        ("DTaP/IPV/Hib", "DTaP_IPV_Hib"),
        ("dtap/ipv/hib/hepb", "DTaP_IPV_Hib_HepB"),
        ("Rotavirus", "Rota"),
        ("mmr2", "MMR2"),
        ("MenB_booster", "MenB_booster"),
    ] {
        let result = matcher.match_label(label);
        assert_eq!(result.code.as_deref(), Some(code), "{label}");
        assert_eq!(result.tier, MatchTier::Exact, "{label}");
    }
}

#[test]
fn exact_labels_resolve_the_same_under_every_tier() {
    let standards = load_default_standards().expect("load standards");
    let reference = &standards.reference;
    let vocabulary = Vocabulary::from_categories(reference.categories(), reference.aliases())
        .expect("category vocabulary");
    for category in reference.categories() {
        let normalized = cover_map::normalize_label(&category.name);
        if let Some(alias) = vocabulary.alias(&normalized) {
            assert_eq!(alias.code, category.code);
        }
        let ranked = cover_map::rank_candidates(&vocabulary, &normalized);
        assert_eq!(ranked[0].code, category.code);
    }
}

#[test]
fn unknown_labels_stay_unmatched() {
    let mut matcher = category_matcher();
    let result = matcher.match_label("Shingles");
    assert!(!result.is_matched());
    assert_eq!(result.raw, "Shingles");
}

#[test]
fn region_names_match_area_vocabulary() {
    let standards = load_default_standards().expect("load standards");
    let vocabulary = Vocabulary::from_areas(
        standards.reference.areas(),
        &[AreaKind::Nation, AreaKind::Region],
    )
    .expect("area vocabulary");
    let mut matcher = NameMatcher::new(Arc::new(vocabulary), MatchSettings::default());
    assert_eq!(
        matcher.match_label("Yorkshire and the Humber").code.as_deref(),
        Some("E12000003")
    );
    assert_eq!(matcher.match_label("London").code.as_deref(), Some("E12000007"));
    let fuzzy = matcher.match_label("South-East");
    assert_eq!(fuzzy.code.as_deref(), Some("E12000008"));
    assert_eq!(fuzzy.tier, MatchTier::Fuzzy);
}
