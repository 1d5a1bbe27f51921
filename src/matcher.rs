//! Substring-based intent classification.

use crate::persona::PatternRule;

/// Return the tag of the first rule with a trigger phrase contained in the
/// utterance, ignoring case.
///
/// Rules are checked in catalog order and the first hit wins, so a broad
/// phrase in an early rule shadows every later rule containing the same text.
/// Only case is normalized; punctuation and whitespace are left alone.
pub fn match_pattern<'a>(utterance: &str, rules: &'a [PatternRule]) -> Option<&'a str> {
    let lowered = utterance.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.patterns
                .iter()
                .any(|phrase| lowered.contains(&phrase.to_lowercase()))
        })
        .map(|rule| rule.tag.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<PatternRule> {
        vec![
            PatternRule::new("greet", &["hello", "hi"]),
            PatternRule::new("thanks", &["thank you", "thanks"]),
            PatternRule::new("history", &["this"]),
        ]
    }

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(match_pattern("Hello there", &rules()), Some("greet"));
        assert_eq!(match_pattern("THANKS a lot", &rules()), Some("thanks"));
    }

    #[test]
    fn test_phrase_case_is_folded() {
        let rules = vec![PatternRule::new("shout", &["LOUD"])];
        assert_eq!(match_pattern("so loud", &rules), Some("shout"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_pattern("what's the weather", &rules()), None);
        assert_eq!(match_pattern("", &rules()), None);
    }

    #[test]
    fn test_first_rule_wins() {
        // "this" contains "hi", so the earlier greet rule shadows history
        assert_eq!(match_pattern("tell me about this", &rules()), Some("greet"));
    }

    #[test]
    fn test_earlier_rule_beats_more_specific_later_rule() {
        let rules = vec![
            PatternRule::new("generic", &["day"]),
            PatternRule::new("specific", &["good day to you"]),
        ];
        assert_eq!(match_pattern("good day to you", &rules), Some("generic"));
    }

    #[test]
    fn test_duplicate_tags_allowed() {
        let rules = vec![
            PatternRule::new("greet", &["hello"]),
            PatternRule::new("greet", &["howdy"]),
        ];
        assert_eq!(match_pattern("Howdy partner", &rules), Some("greet"));
    }

    #[test]
    fn test_punctuation_not_stripped() {
        let rules = vec![PatternRule::new("q", &["how are you?"])];
        assert_eq!(match_pattern("how are you", &rules), None);
        assert_eq!(match_pattern("How are you?", &rules), Some("q"));
    }

    #[test]
    fn test_empty_rules() {
        assert_eq!(match_pattern("hello", &[]), None);
    }
}
