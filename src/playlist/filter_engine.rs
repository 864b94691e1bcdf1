use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

use crate::models::{FilterRule, FilterRuleKind, Stream};

/// Decides, for one candidate stream, whether it belongs in an export.
///
/// Rules are evaluated in a fixed precedence:
/// 1. If any include-name-regex rules exist and none match the display name,
///    the stream is excluded (include rules form an allow-list).
/// 2. Any matching exclude-name literal (case-insensitive substring on the
///    display name) excludes.
/// 3. Any matching exclude-name regex (display name) excludes.
/// 4. Any matching exclude-stream regex (stream URL) excludes.
/// 5. Any matching exclude-group regex (TVG group) excludes.
/// 6. Otherwise the stream is included.
///
/// A provider that opted out of filtering (`should_filter == false`) bypasses
/// all rules. Evaluation has no side effects.
pub struct FilterEngine {
    // Cache compiled regexes, including failed compiles, so a bad pattern
    // is logged once and then treated as never matching
    regex_cache: HashMap<String, Option<Regex>>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self {
            regex_cache: HashMap::new(),
        }
    }

    /// Returns true when the stream should appear in the export
    pub fn evaluate(&mut self, stream: &Stream, rules: &[FilterRule], should_filter: bool) -> bool {
        if !should_filter {
            return true;
        }

        let active: Vec<&FilterRule> = rules.iter().filter(|r| r.is_active).collect();

        // Include rules act as an allow-list when any are present
        let include_rules: Vec<&&FilterRule> = active
            .iter()
            .filter(|r| r.kind == FilterRuleKind::IncludeNameRegex)
            .collect();
        if !include_rules.is_empty()
            && !include_rules
                .iter()
                .any(|r| self.regex_matches(&r.pattern, &stream.name))
        {
            return false;
        }

        let group = stream.tvg_group.as_deref().unwrap_or("");
        for rule in &active {
            let excluded = match rule.kind {
                FilterRuleKind::IncludeNameRegex => false,
                FilterRuleKind::ExcludeName => stream
                    .name
                    .to_lowercase()
                    .contains(&rule.pattern.to_lowercase()),
                FilterRuleKind::ExcludeNameRegex => {
                    self.regex_matches(&rule.pattern, &stream.name)
                }
                FilterRuleKind::ExcludeStreamRegex => {
                    self.regex_matches(&rule.pattern, &stream.stream_url)
                }
                FilterRuleKind::ExcludeGroupRegex => self.regex_matches(&rule.pattern, group),
            };
            if excluded {
                return false;
            }
        }

        true
    }

    fn regex_matches(&mut self, pattern: &str, value: &str) -> bool {
        let compiled = self
            .regex_cache
            .entry(pattern.to_string())
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!("Invalid filter rule pattern '{}': {}", pattern, e);
                    None
                }
            });

        match compiled {
            Some(regex) => regex.is_match(value),
            // Fail open: a broken rule never matches anything
            None => false,
        }
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn stream(name: &str, url: &str, group: Option<&str>) -> Stream {
        Stream {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider_id: None,
            stream_type: crate::models::StreamType::Live,
            is_active: true,
            category: crate::models::StreamCategory::Main,
            channel_number: String::new(),
            name: name.to_string(),
            original_name: name.to_string(),
            stream_url: url.to_string(),
            tvg_id: None,
            tvg_group: group.map(|g| g.to_string()),
            tvg_logo: None,
            extras: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rule(kind: FilterRuleKind, pattern: &str) -> FilterRule {
        FilterRule {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            is_active: true,
            kind,
            pattern: pattern.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn should_filter_false_bypasses_all_rules() {
        let mut engine = FilterEngine::new();
        let rules = vec![
            rule(FilterRuleKind::ExcludeName, "News"),
            rule(FilterRuleKind::IncludeNameRegex, "^Nothing"),
        ];
        let s = stream("News 24", "http://x/2", Some("News"));

        assert!(engine.evaluate(&s, &rules, false));
    }

    #[test]
    fn empty_rule_list_includes_everything() {
        let mut engine = FilterEngine::new();
        let s = stream("News 24", "http://x/2", Some("News"));

        assert!(engine.evaluate(&s, &[], true));
    }

    #[test]
    fn include_rules_form_an_allow_list() {
        let mut engine = FilterEngine::new();
        let rules = vec![rule(FilterRuleKind::IncludeNameRegex, "^Sports")];

        assert!(engine.evaluate(&stream("Sports One", "http://x/1", None), &rules, true));
        assert!(!engine.evaluate(&stream("News 24", "http://x/2", None), &rules, true));
    }

    #[test]
    fn any_matching_include_rule_is_enough() {
        let mut engine = FilterEngine::new();
        let rules = vec![
            rule(FilterRuleKind::IncludeNameRegex, "^Sports"),
            rule(FilterRuleKind::IncludeNameRegex, "News"),
        ];

        assert!(engine.evaluate(&stream("News 24", "http://x/2", None), &rules, true));
    }

    #[test]
    fn exclude_name_is_case_insensitive_substring() {
        let mut engine = FilterEngine::new();
        let rules = vec![rule(FilterRuleKind::ExcludeName, "Adult")];

        assert!(!engine.evaluate(
            &stream("Adult Channel", "http://x/1", Some("XXX")),
            &rules,
            true
        ));
        assert!(!engine.evaluate(&stream("the ADULT one", "http://x/1", None), &rules, true));
        assert!(engine.evaluate(&stream("News 24", "http://x/2", None), &rules, true));
    }

    #[test]
    fn exclude_name_regex_matches_display_name() {
        let mut engine = FilterEngine::new();
        let rules = vec![rule(FilterRuleKind::ExcludeNameRegex, r"\d+ HD$")];

        assert!(!engine.evaluate(&stream("Channel 5 HD", "http://x/5", None), &rules, true));
        assert!(engine.evaluate(&stream("Channel 5", "http://x/5", None), &rules, true));
    }

    #[test]
    fn exclude_stream_regex_matches_url() {
        let mut engine = FilterEngine::new();
        let rules = vec![rule(FilterRuleKind::ExcludeStreamRegex, r"//bad\.host/")];

        assert!(!engine.evaluate(
            &stream("Anything", "http://bad.host/stream/1", None),
            &rules,
            true
        ));
        assert!(engine.evaluate(
            &stream("Anything", "http://good.host/stream/1", None),
            &rules,
            true
        ));
    }

    #[test]
    fn exclude_group_regex_matches_tvg_group() {
        let mut engine = FilterEngine::new();
        let rules = vec![rule(FilterRuleKind::ExcludeGroupRegex, "^XXX$")];

        assert!(!engine.evaluate(&stream("Late Night", "http://x/9", Some("XXX")), &rules, true));
        assert!(engine.evaluate(&stream("News 24", "http://x/2", Some("News")), &rules, true));
        // A stream with no group tag cannot match a group rule requiring content
        assert!(engine.evaluate(&stream("No Group", "http://x/3", None), &rules, true));
    }

    #[test]
    fn invalid_regex_never_matches_and_never_panics() {
        let mut engine = FilterEngine::new();
        let rules = vec![
            rule(FilterRuleKind::ExcludeNameRegex, "([unclosed"),
            rule(FilterRuleKind::ExcludeName, "Adult"),
        ];

        // The broken rule is skipped; the remaining rules still apply
        assert!(engine.evaluate(&stream("News 24", "http://x/2", None), &rules, true));
        assert!(!engine.evaluate(&stream("Adult Channel", "http://x/1", None), &rules, true));
    }

    #[test]
    fn invalid_include_regex_excludes_everything() {
        // An allow-list consisting only of a broken pattern matches nothing
        let mut engine = FilterEngine::new();
        let rules = vec![rule(FilterRuleKind::IncludeNameRegex, "([unclosed")];

        assert!(!engine.evaluate(&stream("News 24", "http://x/2", None), &rules, true));
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let mut engine = FilterEngine::new();
        let mut excluded = rule(FilterRuleKind::ExcludeName, "News");
        excluded.is_active = false;

        assert!(engine.evaluate(&stream("News 24", "http://x/2", None), &[excluded], true));
    }
}
