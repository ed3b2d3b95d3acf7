//! Boot image ranking: pure selection over an already-listed candidate set.

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;

/// A boot image as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: String,
    pub name: String,
    /// Missing timestamps rank as the Unix epoch.
    pub created_at: Option<DateTime<Utc>>,
    pub deprecated_at: Option<DateTime<Utc>>,
}

impl Image {
    fn rank_time(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn is_deprecated(&self, now: DateTime<Utc>) -> bool {
        self.deprecated_at.is_some_and(|t| t <= now)
    }
}

/// Image name pattern using provider wildcard syntax: `*` matches any run of
/// characters, `?` exactly one. Anchored at both ends.
#[derive(Debug, Clone)]
pub struct NamePattern(Regex);

impl NamePattern {
    /// # Errors
    ///
    /// Returns an error if the translated pattern does not compile (it always
    /// should, every literal character is escaped).
    pub fn new(pattern: &str) -> Result<Self> {
        let mut re = String::with_capacity(pattern.len() + 2);
        re.push('^');
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                other => re.push_str(&regex::escape(&other.to_string())),
            }
        }
        re.push('$');
        Ok(Self(Regex::new(&re)?))
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.0.is_match(name)
    }
}

/// Pick the most recently created image that passes the name pattern and is
/// not deprecated at `now`.
///
/// Ties on creation time are broken by the greater image id so the result is
/// stable for a fixed candidate set.
#[must_use]
pub fn pick_newest(
    candidates: &[Image],
    pattern: Option<&NamePattern>,
    now: DateTime<Utc>,
) -> Option<Image> {
    candidates
        .iter()
        .filter(|img| pattern.is_none_or(|p| p.matches(&img.name)))
        .filter(|img| !img.is_deprecated(now))
        .max_by(|a, b| {
            a.rank_time()
                .cmp(&b.rank_time())
                .then_with(|| a.id.cmp(&b.id))
        })
        .cloned()
}
