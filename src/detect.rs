//! Change detection.

use crate::rules::CanonicalText;

/// Exact comparison with no normalization. `original` must be the decoded text the
/// canonical form was derived from; comparing against anything else can report a
/// spurious change.
pub fn has_changed(original: &str, canonical: &CanonicalText) -> bool {
    original != canonical.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::split_lines;
    use crate::rules::{LineEnding, RuleSet, canonicalize};

    #[test]
    fn canonical_input_is_unchanged() {
        let rules = RuleSet::new(LineEnding::Lf, true);
        let original = "a\nb\n";
        assert!(!has_changed(original, &canonicalize(split_lines(original), &rules)));
    }

    #[test]
    fn line_ending_difference_counts() {
        let rules = RuleSet::new(LineEnding::Lf, true);
        let original = "a\r\nb";
        assert!(has_changed(original, &canonicalize(split_lines(original), &rules)));
    }
}
