//! The tracked interval and its token classification.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::types::IntervalId;

/// Prefix marking a tag token (`+cli`).
pub const TAG_PREFIX: &str = "+";
/// Short prefix for the project token (`proj:gott`).
pub const PROJECT_PREFIX_SHORT: &str = "proj:";
/// Long prefix for the project token (`project:gott`).
pub const PROJECT_PREFIX: &str = "project:";
/// Prefix for an external reference (`ref:GH-12`).
pub const REF_PREFIX: &str = "ref:";

type Extractor = fn(&mut Interval, &str);

fn push_tag(interval: &mut Interval, value: &str) {
    interval.tags.push(value.to_string());
}

fn set_project(interval: &mut Interval, value: &str) {
    interval.project = Some(value.to_string());
}

fn set_reference(interval: &mut Interval, value: &str) {
    interval.reference = Some(value.to_string());
}

/// Token classification rules, evaluated in order; the first matching
/// prefix wins. Tokens matching no rule become annotation words.
const TOKEN_RULES: [(&str, Extractor); 4] = [
    (TAG_PREFIX, push_tag),
    (PROJECT_PREFIX_SHORT, set_project),
    (PROJECT_PREFIX, set_project),
    (REF_PREFIX, set_reference),
];

/// One tracked span of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Store-assigned identifier; `None` until the interval is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IntervalId>,
    /// When the activity started; filled by the store if left unset.
    #[serde(default)]
    pub begin: Option<DateTime<Local>>,
    /// When the activity ended; `None` while the interval is running.
    #[serde(default)]
    pub end: Option<DateTime<Local>>,
    /// Elapsed time for entries without meaningful begin/end times.
    #[serde(
        rename = "duration_ms",
        with = "crate::duration::millis",
        default = "Duration::zero"
    )]
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub annotation: String,
    /// The token string the interval was built from, replayed by `continue`.
    #[serde(default)]
    pub raw: String,
}

impl Default for Interval {
    fn default() -> Self {
        Self {
            id: None,
            begin: None,
            end: None,
            duration: Duration::zero(),
            project: None,
            tags: Vec::new(),
            reference: None,
            annotation: String::new(),
            raw: String::new(),
        }
    }
}

impl Interval {
    /// Builds an interval from command-line style tokens.
    ///
    /// ```
    /// use gott_core::Interval;
    ///
    /// let interval = Interval::from_tokens(["proj:gott", "+cli", "fix", "bug"]);
    /// assert_eq!(interval.project.as_deref(), Some("gott"));
    /// assert_eq!(interval.tags, vec!["cli"]);
    /// assert_eq!(interval.annotation, "fix bug");
    /// ```
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        let mut interval = Self::default();
        interval.classify(&tokens);
        interval.raw = join_tokens(&tokens);
        interval
    }

    /// Re-annotates an existing interval.
    ///
    /// The annotation is replaced, tags accumulate, and project/ref are
    /// overwritten only when a token names them. `raw` is rewritten to the
    /// canonical tokens so replaying it reproduces the combined metadata.
    pub fn reclassify<S: AsRef<str>>(&mut self, tokens: &[S]) {
        self.classify(tokens);
        self.raw = self.tokens().join(" ");
    }

    fn classify<S: AsRef<str>>(&mut self, tokens: &[S]) {
        self.annotation.clear();
        for token in tokens {
            let token = token.as_ref();
            let rule = TOKEN_RULES
                .iter()
                .find_map(|(prefix, extract)| token.strip_prefix(*prefix).map(|v| (*extract, v)));
            match rule {
                Some((extract, value)) => extract(self, value),
                None if token.is_empty() => {}
                None => {
                    if !self.annotation.is_empty() {
                        self.annotation.push(' ');
                    }
                    self.annotation.push_str(token);
                }
            }
        }
    }

    /// Canonical token rendering: annotation words, project, tags, ref.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .annotation
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if let Some(project) = &self.project {
            tokens.push(format!("{PROJECT_PREFIX_SHORT}{project}"));
        }
        tokens.extend(self.tags.iter().map(|tag| format!("{TAG_PREFIX}{tag}")));
        if let Some(reference) = &self.reference {
            tokens.push(format!("{REF_PREFIX}{reference}"));
        }
        tokens
    }

    /// Tokens to replay this interval: `raw` split on whitespace, or the
    /// canonical tokens when `raw` is empty.
    pub fn replay_tokens(&self) -> Vec<String> {
        if self.raw.trim().is_empty() {
            self.tokens()
        } else {
            self.raw.split_whitespace().map(str::to_string).collect()
        }
    }

    /// Whether this interval is still running.
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Elapsed time of the interval as of `now`.
    ///
    /// An explicit span (end set and different from begin) wins; otherwise
    /// the stored duration is used; a running interval without a duration
    /// counts up to `now`.
    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        match (self.begin, self.end) {
            (Some(begin), Some(end)) if end != begin => end - begin,
            _ if self.duration != Duration::zero() => self.duration,
            (Some(begin), None) => now - begin,
            _ => Duration::zero(),
        }
    }

    /// Returns the ID as a string slice, empty when not yet persisted.
    pub fn id_str(&self) -> &str {
        self.id.as_ref().map_or("", IntervalId::as_str)
    }
}

fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| token.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
    }

    #[test]
    fn from_tokens_classifies_each_token() {
        let interval = Interval::from_tokens(["proj:gott", "+cli", "fix", "bug"]);
        assert_eq!(interval.project.as_deref(), Some("gott"));
        assert_eq!(interval.tags, vec!["cli"]);
        assert_eq!(interval.reference, None);
        assert_eq!(interval.annotation, "fix bug");
        assert_eq!(interval.raw, "proj:gott +cli fix bug");
        assert!(interval.id.is_none());
    }

    #[test]
    fn from_tokens_partitions_every_token_once() {
        let tokens = [
            "write",
            "+docs",
            "project:site",
            "the",
            "ref:GH-12",
            "+docs",
            "intro",
        ];
        let interval = Interval::from_tokens(tokens);

        assert_eq!(interval.tags, vec!["docs", "docs"]);
        assert_eq!(interval.project.as_deref(), Some("site"));
        assert_eq!(interval.reference.as_deref(), Some("GH-12"));
        assert_eq!(interval.annotation, "write the intro");

        let classified = interval.tags.len()
            + usize::from(interval.project.is_some())
            + usize::from(interval.reference.is_some())
            + interval.annotation.split(' ').count();
        assert_eq!(classified, tokens.len());
    }

    #[test]
    fn first_matching_rule_wins() {
        // "+proj:x" is a tag, not a project.
        let interval = Interval::from_tokens(["+proj:x", "proj:ref:y"]);
        assert_eq!(interval.tags, vec!["proj:x"]);
        assert_eq!(interval.project.as_deref(), Some("ref:y"));
        assert_eq!(interval.reference, None);
    }

    #[test]
    fn later_project_token_overrides_earlier() {
        let interval = Interval::from_tokens(["proj:a", "project:b"]);
        assert_eq!(interval.project.as_deref(), Some("b"));
    }

    #[test]
    fn empty_tokens_do_not_pad_annotation() {
        let interval = Interval::from_tokens(["", "a", "", "b"]);
        assert_eq!(interval.annotation, "a b");
    }

    #[test]
    fn reclassify_resets_annotation_and_keeps_tags() {
        let mut interval = Interval::from_tokens(["old", "words", "+cli", "proj:gott"]);
        interval.reclassify(&["new", "text", "+review"]);

        assert_eq!(interval.annotation, "new text");
        assert_eq!(interval.tags, vec!["cli", "review"]);
        assert_eq!(interval.project.as_deref(), Some("gott"));
        assert_eq!(interval.raw, "new text proj:gott +cli +review");
    }

    #[test]
    fn reclassify_is_deterministic() {
        let mut a = Interval::from_tokens(["x"]);
        let mut b = a.clone();
        a.reclassify(&["y", "ref:1"]);
        b.reclassify(&["y", "ref:1"]);
        assert_eq!(a, b);
    }

    #[test]
    fn tokens_round_trip_through_from_tokens() {
        let interval = Interval::from_tokens(["ref:9", "+a", "hello", "proj:p", "+b", "world"]);
        let rebuilt = Interval::from_tokens(interval.tokens());
        assert_eq!(rebuilt.annotation, interval.annotation);
        assert_eq!(rebuilt.tags, interval.tags);
        assert_eq!(rebuilt.project, interval.project);
        assert_eq!(rebuilt.reference, interval.reference);
    }

    #[test]
    fn replay_tokens_fall_back_to_canonical_tokens() {
        let mut interval = Interval::from_tokens(["a", "+b"]);
        assert_eq!(interval.replay_tokens(), vec!["a", "+b"]);
        interval.raw.clear();
        assert_eq!(interval.replay_tokens(), vec!["a", "+b"]);
    }

    #[test]
    fn elapsed_prefers_explicit_span() {
        let interval = Interval {
            begin: Some(at(9, 0)),
            end: Some(at(10, 30)),
            duration: Duration::hours(5),
            ..Interval::default()
        };
        assert_eq!(interval.elapsed(at(12, 0)), Duration::minutes(90));
    }

    #[test]
    fn elapsed_uses_duration_for_day_entries() {
        let day = Local.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let interval = Interval {
            begin: Some(day),
            end: Some(day),
            duration: Duration::minutes(45),
            ..Interval::default()
        };
        assert_eq!(interval.elapsed(at(12, 0)), Duration::minutes(45));
    }

    #[test]
    fn elapsed_counts_up_for_running_interval() {
        let interval = Interval {
            begin: Some(at(9, 0)),
            ..Interval::default()
        };
        assert!(interval.is_open());
        assert_eq!(interval.elapsed(at(9, 20)), Duration::minutes(20));
    }

    #[test]
    fn elapsed_is_zero_for_closed_empty_entry() {
        let interval = Interval {
            begin: Some(at(9, 0)),
            end: Some(at(9, 0)),
            ..Interval::default()
        };
        assert_eq!(interval.elapsed(at(12, 0)), Duration::zero());
    }

    #[test]
    fn serde_uses_compact_field_names() {
        let interval = Interval {
            id: Some(IntervalId::new("abc12345").unwrap()),
            begin: Some(at(9, 0)),
            end: Some(at(10, 0)),
            reference: Some("GH-1".to_string()),
            duration: Duration::minutes(1),
            ..Interval::default()
        };
        let value = serde_json::to_value(&interval).unwrap();
        assert_eq!(value["id"], "abc12345");
        assert_eq!(value["ref"], "GH-1");
        assert_eq!(value["duration_ms"], 60_000);
        assert!(value.get("project").is_none());

        let parsed: Interval = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, interval);
    }
}
