use crate::error::Result;
use regex::Regex;

/// Optional device naming convention. Advisory only: a mismatch adds
/// evidence but never changes a verdict.
#[derive(Debug, Clone, Default)]
pub enum NamingRule {
    #[default]
    Disabled,
    Pattern { source: String, regex: Regex },
}

impl NamingRule {
    /// Compile a pattern. Matching is anchored at the start of the name.
    pub fn pattern(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})"))?;
        Ok(Self::Pattern {
            source: source.to_string(),
            regex,
        })
    }

    /// `None` or a blank pattern disables the rule.
    pub fn from_option(source: Option<&str>) -> Result<Self> {
        match source.map(str::trim) {
            Some(source) if !source.is_empty() => Self::pattern(source),
            _ => Ok(Self::Disabled),
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            NamingRule::Disabled => None,
            NamingRule::Pattern { source, .. } => Some(source),
        }
    }

    /// Evidence line when the name does not satisfy the rule
    pub fn check(&self, device_name: Option<&str>) -> Option<String> {
        let NamingRule::Pattern { source, regex } = self else {
            return None;
        };
        match device_name {
            None => Some("no device name to check against naming pattern".to_string()),
            Some(name) if !regex.is_match(name) => Some(format!(
                "device name '{name}' does not match naming pattern '{source}'"
            )),
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_rule_is_silent() {
        let rule = NamingRule::from_option(Some("  ")).unwrap();
        assert!(rule.source().is_none());
        assert_eq!(rule.check(None), None);
        assert_eq!(rule.check(Some("anything")), None);
    }

    #[test]
    fn pattern_is_anchored_at_start() {
        let rule = NamingRule::pattern("sw[0-9]+").unwrap();
        assert_eq!(rule.check(Some("sw12")), None);
        assert_eq!(rule.check(Some("sw12-extra")), None);
        assert!(rule.check(Some("core-sw12")).unwrap().contains("core-sw12"));
        assert!(rule.check(None).is_some());
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(NamingRule::pattern("sw[").is_err());
    }
}
