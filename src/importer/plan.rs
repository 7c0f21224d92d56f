//! Store-free batch planning
//!
//! Everything here is a pure function of its inputs so the ordering,
//! de-duplication and reselection rules can be checked in isolation.

use std::collections::HashSet;

use log::{debug, warn};
use regex::Regex;

use crate::models::{ProfileItem, SubscriptionItem};
use crate::parser::explode;

/// Remarks filter of the owning subscription
#[derive(Debug, Clone, Default)]
pub enum RemarksFilter {
    #[default]
    None,
    Pattern(Regex),
    /// The configured pattern does not compile; every line is rejected
    Invalid,
}

impl RemarksFilter {
    pub fn for_subscription(subscription: Option<&SubscriptionItem>) -> Self {
        let Some(subscription) = subscription else {
            return RemarksFilter::None;
        };
        match subscription.compiled_filter() {
            Ok(Some(regex)) => RemarksFilter::Pattern(regex),
            Ok(None) => RemarksFilter::None,
            Err(e) => {
                warn!(
                    "Invalid filter {:?} on subscription '{}': {}",
                    subscription.filter, subscription.remarks, e
                );
                RemarksFilter::Invalid
            }
        }
    }

    /// Profiles without remarks always pass a valid pattern.
    pub fn accepts(&self, remarks: &str) -> bool {
        match self {
            RemarksFilter::None => true,
            RemarksFilter::Pattern(_) if remarks.is_empty() => true,
            RemarksFilter::Pattern(regex) => regex.is_match(remarks),
            RemarksFilter::Invalid => false,
        }
    }
}

/// Non-blank lines with exact duplicates removed, first occurrence wins.
///
/// Lines are compared as written and trimmed only afterwards, so `" a"` and
/// `"a"` are both kept.
pub fn distinct_lines(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    text.lines()
        .filter(|line| seen.insert(*line))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Decode a descriptor batch into the profiles that would be stored.
///
/// Lines are de-duplicated then walked in reverse, so the returned list is in
/// insertion order. Lines that fail to decode or are rejected by `filter` are
/// skipped. Every returned profile is tagged with `sub_id`.
pub fn plan_batch(text: &str, sub_id: &str, filter: &RemarksFilter) -> Vec<ProfileItem> {
    let mut planned = Vec::new();

    for line in distinct_lines(text).into_iter().rev() {
        let mut profile = match explode(line) {
            Ok(profile) => profile,
            Err(e) => {
                debug!("Skipping line: {}", e);
                continue;
            }
        };

        if !filter.accepts(&profile.remarks) {
            debug!("Filtered out '{}'", profile.remarks);
            continue;
        }

        profile.subscription_id = sub_id.to_string();
        planned.push(profile);
    }

    planned
}

/// Pick the stored profile that takes over a removed selection.
///
/// The last stored profile on the same `(server, server_port)` as `previous`
/// wins.
pub fn reselect<'a>(
    previous: Option<&ProfileItem>,
    stored: &'a [(String, ProfileItem)],
) -> Option<&'a str> {
    let previous = previous?;
    stored
        .iter()
        .rev()
        .find(|(_, profile)| profile.same_endpoint(previous))
        .map(|(id, _)| id.as_str())
}

/// True when `text` should go through the custom JSON or WireGuard INI path.
pub fn is_custom_or_wireguard(text: &str) -> bool {
    is_custom_config(text) || is_wireguard_conf(text)
}

pub(crate) fn is_custom_config(text: &str) -> bool {
    text.contains("inbounds") && text.contains("outbounds") && text.contains("routing")
}

pub(crate) fn is_wireguard_conf(text: &str) -> bool {
    text.trim_start().starts_with("[Interface]") && text.contains("[Peer]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfigType;

    fn with_filter(pattern: &str) -> RemarksFilter {
        let mut sub = SubscriptionItem::new("S", "https://s.example");
        sub.filter = Some(pattern.to_string());
        RemarksFilter::for_subscription(Some(&sub))
    }

    #[test]
    fn test_distinct_lines() {
        assert_eq!(
            distinct_lines("a\r\nb\n\n  a \nc\nb\na"),
            vec!["a", "b", "a", "c"]
        );
    }

    #[test]
    fn test_plan_batch_reverses_and_tags() {
        let text = "trojan://p@a.example:443#A\nnot a link\ntrojan://p@b.example:443#B\ntrojan://p@a.example:443#A";
        let planned = plan_batch(text, "sub", &RemarksFilter::None);

        let remarks: Vec<&str> = planned.iter().map(|p| p.remarks.as_str()).collect();
        assert_eq!(remarks, vec!["B", "A"]);
        assert!(planned.iter().all(|p| p.subscription_id == "sub"));
    }

    #[test]
    fn test_filter_semantics() {
        let filter = with_filter("^US-");
        assert!(filter.accepts("US-East"));
        assert!(!filter.accepts("EU-West"));
        assert!(filter.accepts(""));

        // search, not full match
        assert!(with_filter("East").accepts("US-East-1"));

        let invalid = with_filter("(unclosed");
        assert!(matches!(invalid, RemarksFilter::Invalid));
        assert!(!invalid.accepts("US-East"));
        assert!(!invalid.accepts(""));

        assert!(matches!(with_filter(""), RemarksFilter::None));
    }

    #[test]
    fn test_reselect_prefers_last_stored_match() {
        let mut previous = ProfileItem::new(ConfigType::Trojan);
        previous.server = "a.example".to_string();
        previous.server_port = "443".to_string();

        let stored = vec![
            ("1".to_string(), previous.clone()),
            ("2".to_string(), ProfileItem::new(ConfigType::Vless)),
            ("3".to_string(), previous.clone()),
        ];
        assert_eq!(reselect(Some(&previous), &stored), Some("3"));
        assert_eq!(reselect(None, &stored), None);
        assert_eq!(reselect(Some(&previous), &stored[1..2]), None);
    }

    #[test]
    fn test_content_detection() {
        assert!(is_custom_or_wireguard(r#"{"inbounds":[],"outbounds":[],"routing":{}}"#));
        assert!(is_custom_or_wireguard("[Interface]\nPrivateKey = k\n[Peer]\n"));
        assert!(!is_custom_or_wireguard("[Interface]\nPrivateKey = k\n"));
        assert!(!is_custom_or_wireguard("vless://id@h:443"));
    }
}
