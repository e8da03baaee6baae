//! Text processing utilities.

/// Check if content carries anything beyond whitespace. PDF extraction often
/// produces blank spans around page boundaries; those are not worth embedding.
pub fn has_meaningful_content(content: &str) -> bool {
    content.chars().any(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_meaningful_content() {
        assert!(!has_meaningful_content(""));
        assert!(!has_meaningful_content("   \n\n   "));
        assert!(!has_meaningful_content(&" ".repeat(1000)));
        assert!(has_meaningful_content("x"));
        assert!(has_meaningful_content("  a  "));
    }
}
