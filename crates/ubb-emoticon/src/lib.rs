use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::trace;

/// Built-in emoticon rules, in matching order.
///
/// Each entry is `(pattern, url template, group label)`.
///
/// The generic two letters rule must stay behind the `ac` and `em` ones, otherwise `ac01` and
/// `em11` would resolve as generic emoticons.
const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    (
        r"ac([0-9]{2,4})",
        "ms-appx:///Assets/Emoji/ac-white/ac${1}.png",
        "ac-avatar",
    ),
    (
        r"em([0-9]{2})",
        "ms-appx:///Assets/Emoji/em/em${1}.gif",
        "classic",
    ),
    (
        r"([a-zA-Z]{2})([0-9]{2})",
        "ms-appx:///Assets/Emoji/${1}/${1}${2}.png",
        "generic",
    ),
    (
        r"cc98([0-9]{2})",
        "ms-appx:///Assets/Emoji/CC98/CC98${1}.png",
        "site",
    ),
];

/// Shared built-in rule set.
static BUILTIN: OnceLock<EmoticonRuleSet> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum EmoticonError {
    /// Rule pattern is not a valid regular expression.
    ///
    /// * 0: the pattern text.
    /// * 1: the underlying regex error.
    #[error("invalid emoticon pattern {0:?}: {1}")]
    InvalidPattern(String, regex::Error),

    /// Rule table document is not valid toml or misses fields.
    #[error("invalid emoticon rule config: {0}")]
    InvalidConfig(#[from] toml::de::Error),
}

/// One rule in the rule table, as written in config.
#[derive(Clone, Debug, Deserialize)]
pub struct RuleConfig {
    /// Pattern matching the whole tag name, case insensitive.
    ///
    /// Anchors are added automatically, do not write `^` or `$`.
    pub pattern: String,

    /// Url template.
    ///
    /// Use `${1}`, `${2}` to refer to captured groups in `pattern`.
    pub template: String,

    /// Name of the emoticon group.
    pub label: String,
}

/// Rule table document.
///
/// ```toml
/// [[rule]]
/// pattern = "ac([0-9]{2,4})"
/// template = "https://example.com/ac/ac${1}.png"
/// label = "ac-avatar"
/// ```
#[derive(Clone, Debug, Deserialize)]
struct RuleSetConfig {
    #[serde(rename = "rule", default)]
    rules: Vec<RuleConfig>,
}

/// A compiled emoticon rule.
#[derive(Clone, Debug)]
pub struct EmoticonRule {
    pattern: Regex,
    template: String,
    label: String,
}

impl EmoticonRule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// When `pattern` is not a valid regular expression.
    pub fn new(
        pattern: &str,
        template: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, EmoticonError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = RegexBuilder::new(anchored.as_str())
            .case_insensitive(true)
            .build()
            .map_err(|e| EmoticonError::InvalidPattern(pattern.to_string(), e))?;
        Ok(Self {
            pattern: regex,
            template: template.into(),
            label: label.into(),
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Expand the url template with groups captured from `name`.
    ///
    /// Return `None` if the rule does not match.
    pub fn url(&self, name: &str) -> Option<String> {
        let captures = self.pattern.captures(name)?;
        let mut url = String::new();
        captures.expand(self.template.as_str(), &mut url);
        Some(url)
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn template(&self) -> &str {
        self.template.as_str()
    }
}

/// Ordered emoticon rules.
///
/// Rules are tried from first to last and the first matching one wins.
///
/// The set is immutable once built and can be shared across threads.
#[derive(Clone, Debug)]
pub struct EmoticonRuleSet {
    rules: Vec<EmoticonRule>,
}

impl EmoticonRuleSet {
    /// Build from already compiled rules, keeping the order.
    pub fn new(rules: Vec<EmoticonRule>) -> Self {
        Self { rules }
    }

    /// The built-in rules, compiled once per process.
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(Self::default)
    }

    /// Load a rule table from toml text.
    ///
    /// # Errors
    ///
    /// When the document is malformed or any pattern fails to compile.
    pub fn from_toml_str(data: &str) -> Result<Self, EmoticonError> {
        let config: RuleSetConfig = toml::from_str(data)?;
        Self::from_configs(config.rules)
    }

    /// Compile a list of rule configs, keeping the order.
    ///
    /// # Errors
    ///
    /// When any pattern fails to compile.
    pub fn from_configs(configs: Vec<RuleConfig>) -> Result<Self, EmoticonError> {
        let rules = configs
            .into_iter()
            .map(|x| EmoticonRule::new(x.pattern.as_str(), x.template, x.label))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// Check `name` is an emoticon code or not.
    ///
    /// Names holding whitespace are never emoticons.
    pub fn is_emoticon(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Resolve `name` into the emoticon url and the label of the group it belongs to.
    pub fn resolve(&self, name: &str) -> Option<(String, &str)> {
        let rule = self.find(name)?;
        let url = rule.url(name)?;
        trace!("emoticon {name:?} resolved by {:?} rule", rule.label);
        Some((url, rule.label()))
    }

    pub fn rules(&self) -> &[EmoticonRule] {
        self.rules.as_slice()
    }

    fn find(&self, name: &str) -> Option<&EmoticonRule> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return None;
        }
        self.rules.iter().find(|x| x.is_match(name))
    }
}

impl Default for EmoticonRuleSet {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(pattern, template, label)| {
                EmoticonRule::new(pattern, *template, *label)
                    .expect("built-in emoticon patterns are valid")
            })
            .collect();
        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_codes() {
        let rules = EmoticonRuleSet::builtin();
        for name in ["ac01", "ac1234", "em11", "cc9801", "tb01", "MS02", "AC01"] {
            assert!(rules.is_emoticon(name), "{name} should be an emoticon");
        }
        for name in ["", "b", "ac1", "ac12345", "em1", "hr", "ac 01", "abc01", "cc981"] {
            assert!(!rules.is_emoticon(name), "{name} should not be an emoticon");
        }
    }

    #[test]
    fn test_specific_rules_win() {
        let rules = EmoticonRuleSet::builtin();

        let (url, label) = rules.resolve("ac01").unwrap();
        assert_eq!(url, "ms-appx:///Assets/Emoji/ac-white/ac01.png");
        assert_eq!(label, "ac-avatar");

        let (url, label) = rules.resolve("em11").unwrap();
        assert_eq!(url, "ms-appx:///Assets/Emoji/em/em11.gif");
        assert_eq!(label, "classic");

        let (url, label) = rules.resolve("cc9801").unwrap();
        assert_eq!(url, "ms-appx:///Assets/Emoji/CC98/CC9801.png");
        assert_eq!(label, "site");

        let (url, label) = rules.resolve("tb01").unwrap();
        assert_eq!(url, "ms-appx:///Assets/Emoji/tb/tb01.png");
        assert_eq!(label, "generic");
    }

    #[test]
    fn test_order_is_first_match() {
        let rules = EmoticonRuleSet::from_configs(vec![
            RuleConfig {
                pattern: r"([a-z]{2})([0-9]{2})".to_string(),
                template: "generic/${1}${2}".to_string(),
                label: "generic".to_string(),
            },
            RuleConfig {
                pattern: r"ac([0-9]{2,4})".to_string(),
                template: "ac/${1}".to_string(),
                label: "ac".to_string(),
            },
        ])
        .unwrap();

        assert_eq!(
            rules.resolve("ac01"),
            Some(("generic/ac01".to_string(), "generic"))
        );
        assert_eq!(rules.resolve("ac123"), Some(("ac/123".to_string(), "ac")));
    }

    #[test]
    fn test_load_from_toml() {
        let data = r#"
[[rule]]
pattern = "qq([0-9]{3})"
template = "https://example.com/qq/${1}.gif"
label = "qq"
"#;
        let rules = EmoticonRuleSet::from_toml_str(data).unwrap();
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.rules()[0].template(), "https://example.com/qq/${1}.gif");
        assert_eq!(
            rules.resolve("QQ123"),
            Some(("https://example.com/qq/123.gif".to_string(), "qq"))
        );
        assert!(!rules.is_emoticon("ac01"));
    }

    #[test]
    fn test_invalid_config() {
        let bad_pattern = r#"
[[rule]]
pattern = "ac(["
template = "x"
label = "x"
"#;
        assert!(matches!(
            EmoticonRuleSet::from_toml_str(bad_pattern),
            Err(EmoticonError::InvalidPattern(..))
        ));

        let missing_field = r#"
[[rule]]
pattern = "ac"
"#;
        assert!(matches!(
            EmoticonRuleSet::from_toml_str(missing_field),
            Err(EmoticonError::InvalidConfig(..))
        ));
    }

    #[test]
    fn test_shared_across_threads() {
        let handles = (0..4)
            .map(|_| std::thread::spawn(|| EmoticonRuleSet::builtin().is_emoticon("ac01")))
            .collect::<Vec<_>>();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
