use cover_model::{CleanedValue, DisplayValue, MarkerKind, MarkerTable, format_numeric};
use cover_transform::ValueCleaner;
use proptest::prelude::*;

fn render(value: &CleanedValue) -> String {
    match value {
        CleanedValue::Number { value } => DisplayValue::Number(*value).render(),
        CleanedValue::Suppressed { token, .. } => token.clone(),
        CleanedValue::Range { text, .. } => text.clone(),
        CleanedValue::Missing => String::new(),
    }
}

proptest! {
    #[test]
    fn clean_is_total(raw in any::<String>()) {
        let cleaner = ValueCleaner::default();
        let _ = cleaner.clean(&raw);
    }

    #[test]
    fn clean_is_idempotent_through_rendering(raw in "\\PC{0,24}") {
        let cleaner = ValueCleaner::default();
        let first = cleaner.clean(&raw);
        let second = cleaner.clean(&render(&first));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn formatted_numbers_parse_back(value in 0.0f64..10_000_000.0) {
        let cleaner = ValueCleaner::default();
        let text = format_numeric(value);
        prop_assert_eq!(cleaner.clean(&text), CleanedValue::number(value));
    }

    #[test]
    fn thousands_separators_are_ignored(value in 1_000u64..1_000_000_000) {
        let cleaner = ValueCleaner::default();
        let digits = value.to_string();
        let mut grouped = String::new();
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        prop_assert_eq!(cleaner.clean(&grouped), CleanedValue::number(value as f64));
    }

    #[test]
    fn any_known_marker_suppresses(prefix in "[0-9 ]{0,4}", suffix in "[0-9 ]{0,4}") {
        let cleaner = ValueCleaner::new(MarkerTable::default());
        let raw = format!("{prefix}[c]{suffix}");
        let is_confidential = matches!(
            cleaner.clean(&raw),
            CleanedValue::Suppressed { kind: MarkerKind::Confidential, .. }
        );
        prop_assert!(is_confidential);
    }
}
