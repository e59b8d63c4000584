//! Reserved characters in URN ids.
//!
//! Ids containing any of these characters cannot be embedded literally in a
//! tuple-style URN and must be replaced by a generated id.

/// Characters with structural meaning inside a URN.
pub const RESERVED_CHARS: [char; 4] = [',', '(', ')', '\u{241F}'];

/// URN encoding checks.
pub struct UrnEncoder;

impl UrnEncoder {
    /// Returns true if `value` contains a reserved character.
    pub fn contains_reserved_char(value: &str) -> bool {
        value.contains(RESERVED_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_chars() {
        assert!(!UrnEncoder::contains_reserved_char("Finance.Revenue"));
        assert!(!UrnEncoder::contains_reserved_char("Net Revenue / Q1"));
        assert!(UrnEncoder::contains_reserved_char("Revenue, gross"));
        assert!(UrnEncoder::contains_reserved_char("Revenue (net)"));
        assert!(UrnEncoder::contains_reserved_char("a\u{241F}b"));
    }
}
