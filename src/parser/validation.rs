use regex::Regex;

/// A pattern that must match a whole value token
#[derive(Debug, Clone)]
pub struct ExactMatch {
    source: String,
    regex: Regex,
    message: String,
}

impl ExactMatch {
    pub fn new(pattern: &str, message: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
            message: message.to_string(),
        })
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_anchored() {
        let m = ExactMatch::new("[a-z]+", "Lowercase only.").unwrap();
        assert!(m.is_match("abc"));
        assert!(!m.is_match("abc1"));
        assert!(!m.is_match("1abc"));
        assert_eq!(m.message(), "Lowercase only.");
    }

    #[test]
    fn test_alternation_is_grouped() {
        // Without the group `^a|b$` would accept "ax"
        let m = ExactMatch::new("a|b", "").unwrap();
        assert!(!m.is_match("ax"));
        assert!(m.is_match("b"));
    }

    #[test]
    fn test_double_pattern() {
        let m = ExactMatch::new(r"-?[0-9]*\.?[0-9]+", "A double is expected.").unwrap();
        assert!(m.is_match("-1.5"));
        assert!(m.is_match(".5"));
        assert!(!m.is_match("1."));
        assert!(!m.is_match("abc"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ExactMatch::new("(unclosed", "").is_err());
    }
}
