//! robots.txt parsing and the per-run robots cache.
//!
//! Rules come from the groups naming this crawler (matched as a
//! case-insensitive substring of the User-Agent) or, when none does, from the
//! `*` group. The longest matching `Allow`/`Disallow` pattern decides; on a
//! tie `Allow` wins. `*` wildcards and a trailing `$` anchor are supported.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct PathRule {
    allow: bool,
    /// Pattern length, used to pick the most specific rule
    specificity: usize,
    matcher: PathMatcher,
}

#[derive(Debug, Clone)]
enum PathMatcher {
    Prefix(String),
    Pattern(Regex),
}

impl PathMatcher {
    fn new(pattern: &str) -> Option<Self> {
        if !pattern.contains('*') && !pattern.ends_with('$') {
            return Some(PathMatcher::Prefix(pattern.to_string()));
        }
        let (body, anchored) = match pattern.strip_suffix('$') {
            Some(body) => (body, true),
            None => (pattern, false),
        };
        let escaped: Vec<String> = body.split('*').map(regex::escape).collect();
        let mut source = format!("^{}", escaped.join(".*"));
        if anchored {
            source.push('$');
        }
        Regex::new(&source).ok().map(PathMatcher::Pattern)
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathMatcher::Pattern(re) => re.is_match(path),
        }
    }
}

/// Crawl rules for one origin.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    rules: Vec<PathRule>,
    deny_all: bool,
}

impl RobotsRules {
    /// No restrictions (robots.txt absent).
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Everything forbidden (robots.txt unreadable).
    pub fn deny_all() -> Self {
        Self {
            rules: Vec::new(),
            deny_all: true,
        }
    }

    /// Parses a robots.txt body for the given User-Agent.
    pub fn parse(body: &str, user_agent: &str) -> Self {
        let user_agent = user_agent.to_lowercase();
        let mut specific: Vec<PathRule> = Vec::new();
        let mut wildcard: Vec<PathRule> = Vec::new();
        let mut saw_specific = false;

        let mut group_agents: Vec<String> = Vec::new();
        let mut in_rules = false;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let field = field.trim().to_lowercase();
            let value = value.trim();

            match field.as_str() {
                "user-agent" => {
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "allow" | "disallow" => {
                    in_rules = true;
                    if value.is_empty() {
                        continue;
                    }
                    let Some(matcher) = PathMatcher::new(value) else {
                        continue;
                    };
                    let rule = PathRule {
                        allow: field == "allow",
                        specificity: value.len(),
                        matcher,
                    };
                    let names_us = group_agents
                        .iter()
                        .any(|agent| agent != "*" && user_agent.contains(agent.as_str()));
                    if names_us {
                        saw_specific = true;
                        specific.push(rule);
                    } else if group_agents.iter().any(|agent| agent == "*") {
                        wildcard.push(rule);
                    }
                }
                _ => {}
            }
        }

        Self {
            rules: if saw_specific { specific } else { wildcard },
            deny_all: false,
        }
    }

    /// Whether `path` (path plus optional query) may be fetched.
    pub fn is_allowed(&self, path: &str) -> bool {
        if self.deny_all {
            return false;
        }
        if path == "/robots.txt" {
            return true;
        }
        self.rules
            .iter()
            .filter(|rule| rule.matcher.matches(path))
            .max_by_key(|rule| (rule.specificity, rule.allow))
            .map_or(true, |rule| rule.allow)
    }
}

/// robots.txt rules per origin, fetched at most once per run.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Arc<RobotsRules>>>,
}

impl RobotsCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rules for an origin, if already fetched.
    pub async fn get(&self, origin: &str) -> Option<Arc<RobotsRules>> {
        self.entries.lock().await.get(origin).cloned()
    }

    /// Stores the rules for an origin.
    pub async fn insert(&self, origin: &str, rules: RobotsRules) -> Arc<RobotsRules> {
        let rules = Arc::new(rules);
        self.entries
            .lock()
            .await
            .insert(origin.to_string(), Arc::clone(&rules));
        rules
    }

    /// Number of origins cached.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// True when nothing has been cached yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "Mozilla/5.0 (compatible; school_contacts/0.1)";

    #[test]
    fn test_wildcard_group() {
        let rules = RobotsRules::parse("User-agent: *\nDisallow: /private\n", UA);
        assert!(!rules.is_allowed("/private/staff"));
        assert!(rules.is_allowed("/contact"));
    }

    #[test]
    fn test_specific_group_overrides_wildcard() {
        let body = "User-agent: *\nDisallow: /\n\nUser-agent: school_contacts\nDisallow: /admin\n";
        let rules = RobotsRules::parse(body, UA);
        assert!(rules.is_allowed("/contact"));
        assert!(!rules.is_allowed("/admin/login"));
    }

    #[test]
    fn test_other_agents_ignored() {
        let body = "User-agent: Googlebot\nDisallow: /\n";
        let rules = RobotsRules::parse(body, UA);
        assert!(rules.is_allowed("/anything"));
    }

    #[test]
    fn test_longest_match_and_allow_tie() {
        let body = "User-agent: *\nDisallow: /about\nAllow: /about/contact\nDisallow: /x\nAllow: /x\n";
        let rules = RobotsRules::parse(body, UA);
        assert!(!rules.is_allowed("/about/history"));
        assert!(rules.is_allowed("/about/contact"));
        assert!(rules.is_allowed("/x/y"));
    }

    #[test]
    fn test_wildcards_and_anchor() {
        let body = "User-agent: *\nDisallow: /*.pdf$\nDisallow: /search*q=\n";
        let rules = RobotsRules::parse(body, UA);
        assert!(!rules.is_allowed("/docs/enrol.pdf"));
        assert!(rules.is_allowed("/docs/enrol.pdf?v=2"));
        assert!(!rules.is_allowed("/search?q=maths"));
    }

    #[test]
    fn test_multiple_agents_per_group_and_comments() {
        let body = "# site rules\nUser-agent: foo\nUser-agent: *\nDisallow: /tmp # scratch\nDisallow:\n";
        let rules = RobotsRules::parse(body, UA);
        assert!(!rules.is_allowed("/tmp/file"));
        assert!(rules.is_allowed("/"));
    }

    #[test]
    fn test_allow_all_and_deny_all() {
        assert!(RobotsRules::allow_all().is_allowed("/anything"));
        assert!(!RobotsRules::deny_all().is_allowed("/"));
    }

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let cache = RobotsCache::new();
        assert!(cache.is_empty().await);
        cache.insert("https://school.edu.au", RobotsRules::deny_all()).await;
        let rules = cache.get("https://school.edu.au").await;
        assert!(rules.is_some_and(|r| !r.is_allowed("/")));
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("https://other.edu.au").await.is_none());
    }
}
