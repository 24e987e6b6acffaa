//! Utility functions for matching.

/// Normalizes a label for exact and alias lookup: trims, collapses internal
/// whitespace, and lowercases. Punctuation is kept, so "DTaP-IPV-Hib" and
/// "DTaP/IPV/Hib" stay distinct.
pub fn normalize_label(raw: &str) -> String {
    raw.trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_spacing() {
        assert_eq!(normalize_label("  MMR   dose 1 "), "mmr dose 1");
        assert_eq!(normalize_label("DTaP-IPV-Hib"), "dtap-ipv-hib");
        assert_eq!(normalize_label(""), "");
    }
}
