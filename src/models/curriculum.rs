//! Curriculum sessions and their lookup by trimester.
//!
//! Each group pulls its daily session from the curriculum bucket of its
//! trimester. Lookups fall back from the trimester bucket to the whole
//! curriculum, and from an empty curriculum to a fixed placeholder, so
//! every scheduled cell always gets a session.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{clock, not_available};

/// Session length used when the curriculum gives no usable duration.
pub const DEFAULT_HOURS_PER_SESSION: u32 = 4;

/// Subject name of the placeholder session.
pub const PLACEHOLDER_SUBJECT: &str = "Sin asignatura";

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Normalized trimester label.
///
/// Inputs arrive as free text or numbers. Normalization maps empty text
/// to `"1"`, integral numbers to their integer form (`"3,0"` → `"3"`),
/// other numbers to decimal form (`"2,5"` → `"2.5"`), and keeps any
/// other text trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TrimesterKey(String);

impl TrimesterKey {
    /// Normalizes a raw trimester value.
    pub fn normalize(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("nan") {
            return Self::default();
        }
        match text.replace(',', ".").parse::<f64>() {
            Ok(num) if num.is_finite() && num.fract() == 0.0 => Self(format!("{}", num as i64)),
            Ok(num) if num.is_finite() => Self(format!("{num}")),
            _ => Self(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TrimesterKey {
    fn default() -> Self {
        Self("1".to_string())
    }
}

impl fmt::Display for TrimesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrimesterKey {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl From<String> for TrimesterKey {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<TrimesterKey> for String {
    fn from(key: TrimesterKey) -> Self {
        key.0
    }
}

impl From<i64> for TrimesterKey {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// One curriculum entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumSession {
    /// Subject title.
    pub subject: String,
    /// Competency the session develops.
    #[serde(default = "not_available")]
    pub competency: String,
    /// Expected learning outcome.
    #[serde(default = "not_available")]
    pub learning_outcome: String,
    /// Nominal start time.
    #[serde(default = "default_start")]
    pub start: NaiveTime,
    /// Nominal end time.
    #[serde(default = "default_end")]
    pub end: NaiveTime,
    /// Explicit duration in hours, when the input gives one.
    #[serde(default)]
    pub duration_hours: Option<f64>,
    /// Trimester bucket.
    #[serde(default)]
    pub trimester: TrimesterKey,
}

fn default_start() -> NaiveTime {
    clock(8, 0)
}

fn default_end() -> NaiveTime {
    clock(12, 0)
}

impl CurriculumSession {
    /// Creates a session with default 08:00-12:00 times in trimester `"1"`.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            competency: not_available(),
            learning_outcome: not_available(),
            start: default_start(),
            end: default_end(),
            duration_hours: None,
            trimester: TrimesterKey::default(),
        }
    }

    /// The session used when no curriculum is loaded.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_SUBJECT)
    }

    pub fn with_competency(mut self, competency: impl Into<String>) -> Self {
        self.competency = competency.into();
        self
    }

    pub fn with_learning_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.learning_outcome = outcome.into();
        self
    }

    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = Some(hours);
        self
    }

    pub fn with_trimester(mut self, trimester: impl Into<TrimesterKey>) -> Self {
        self.trimester = trimester.into();
        self
    }

    /// Explicit duration rounded half-to-even, at least 1.
    fn explicit_hours(&self) -> Option<u32> {
        let hours = self.duration_hours.filter(|h| h.is_finite())?;
        Some(hours.round_ties_even().max(1.0).min(f64::from(u32::MAX)) as u32)
    }

    /// Whole hours between start and end; an end before start wraps past midnight.
    fn span_hours(&self) -> u32 {
        let secs = (self.end - self.start).num_seconds().rem_euclid(SECONDS_PER_DAY);
        (secs / SECONDS_PER_HOUR) as u32
    }
}

/// Hours per session derived from the curriculum.
///
/// The first session with an explicit duration wins. Otherwise the first
/// session whose start/end span is at least one hour gives the floor of
/// that span. Otherwise [`DEFAULT_HOURS_PER_SESSION`].
pub fn derive_hours_per_session(sessions: &[CurriculumSession]) -> u32 {
    sessions
        .iter()
        .find_map(CurriculumSession::explicit_hours)
        .or_else(|| {
            sessions
                .iter()
                .map(CurriculumSession::span_hours)
                .find(|&h| h >= 1)
        })
        .unwrap_or(DEFAULT_HOURS_PER_SESSION)
}

/// Curriculum grouped by trimester.
#[derive(Debug, Clone)]
pub struct CurriculumIndex {
    all: Vec<CurriculumSession>,
    by_trimester: BTreeMap<TrimesterKey, Vec<CurriculumSession>>,
    placeholder: CurriculumSession,
}

impl CurriculumIndex {
    /// Buckets sessions by trimester, keeping input order within each bucket.
    pub fn new(sessions: Vec<CurriculumSession>) -> Self {
        let mut by_trimester: BTreeMap<TrimesterKey, Vec<CurriculumSession>> = BTreeMap::new();
        for session in &sessions {
            by_trimester
                .entry(session.trimester.clone())
                .or_default()
                .push(session.clone());
        }
        Self {
            all: sessions,
            by_trimester,
            placeholder: CurriculumSession::placeholder(),
        }
    }

    /// All sessions in input order.
    pub fn sessions(&self) -> &[CurriculumSession] {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Number of sessions per trimester bucket.
    pub fn bucket_sizes(&self) -> impl Iterator<Item = (&TrimesterKey, usize)> {
        self.by_trimester.iter().map(|(k, v)| (k, v.len()))
    }

    /// Candidate sessions for a trimester; never empty.
    pub fn resolve(&self, trimester: &TrimesterKey) -> &[CurriculumSession] {
        match self.by_trimester.get(trimester) {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ if !self.all.is_empty() => &self.all,
            _ => std::slice::from_ref(&self.placeholder),
        }
    }

    /// Session at `rotation` (modulo the candidate count) for a trimester.
    pub fn session_for(&self, trimester: &TrimesterKey, rotation: usize) -> &CurriculumSession {
        let candidates = self.resolve(trimester);
        &candidates[rotation % candidates.len()]
    }

    /// Hours per session implied by this curriculum.
    pub fn hours_per_session(&self) -> u32 {
        derive_hours_per_session(&self.all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimester_normalize() {
        assert_eq!(TrimesterKey::normalize("").as_str(), "1");
        assert_eq!(TrimesterKey::normalize("   ").as_str(), "1");
        assert_eq!(TrimesterKey::normalize("3").as_str(), "3");
        assert_eq!(TrimesterKey::normalize("3,0").as_str(), "3");
        assert_eq!(TrimesterKey::normalize("2,5").as_str(), "2.5");
        assert_eq!(TrimesterKey::normalize(" 4.0 ").as_str(), "4");
        assert_eq!(TrimesterKey::normalize(" Cuarto ").as_str(), "Cuarto");
        assert_eq!(TrimesterKey::from(2).as_str(), "2");
    }

    #[test]
    fn test_trimester_deserialize_normalizes() {
        let key: TrimesterKey = serde_json::from_str("\"3,0\"").unwrap();
        assert_eq!(key.as_str(), "3");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"3\"");
    }

    #[test]
    fn test_explicit_duration_wins() {
        let sessions = vec![
            CurriculumSession::new("A").with_times(clock(7, 0), clock(13, 0)),
            CurriculumSession::new("B").with_duration_hours(2.6),
        ];
        assert_eq!(derive_hours_per_session(&sessions), 3);
    }

    #[test]
    fn test_explicit_duration_rounds_half_even_and_floors_at_one() {
        let half = vec![CurriculumSession::new("A").with_duration_hours(2.5)];
        assert_eq!(derive_hours_per_session(&half), 2);
        let tiny = vec![CurriculumSession::new("A").with_duration_hours(0.2)];
        assert_eq!(derive_hours_per_session(&tiny), 1);
    }

    #[test]
    fn test_span_duration() {
        let sessions = vec![
            CurriculumSession::new("A").with_times(clock(8, 0), clock(8, 30)),
            CurriculumSession::new("B").with_times(clock(14, 0), clock(17, 45)),
        ];
        assert_eq!(derive_hours_per_session(&sessions), 3);
    }

    #[test]
    fn test_span_wraps_midnight() {
        let sessions = vec![CurriculumSession::new("A").with_times(clock(22, 0), clock(2, 0))];
        assert_eq!(derive_hours_per_session(&sessions), 4);
        let night = vec![CurriculumSession::new("A").with_times(clock(20, 0), clock(1, 0))];
        assert_eq!(derive_hours_per_session(&night), 5);
    }

    #[test]
    fn test_default_hours() {
        assert_eq!(derive_hours_per_session(&[]), DEFAULT_HOURS_PER_SESSION);
        let zero = vec![CurriculumSession::new("A").with_times(clock(9, 0), clock(9, 0))];
        assert_eq!(derive_hours_per_session(&zero), DEFAULT_HOURS_PER_SESSION);
    }

    #[test]
    fn test_resolve_fallbacks() {
        let index = CurriculumIndex::new(vec![
            CurriculumSession::new("Math").with_trimester("1"),
            CurriculumSession::new("Physics").with_trimester("2"),
            CurriculumSession::new("Chemistry").with_trimester("2"),
        ]);
        let second = index.resolve(&TrimesterKey::from(2));
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].subject, "Chemistry");

        // Unknown trimester falls back to the whole curriculum.
        assert_eq!(index.resolve(&TrimesterKey::from(7)).len(), 3);
        assert_eq!(index.session_for(&TrimesterKey::from(7), 4).subject, "Physics");
    }

    #[test]
    fn test_empty_curriculum_uses_placeholder() {
        let index = CurriculumIndex::new(Vec::new());
        let session = index.session_for(&TrimesterKey::default(), 11);
        assert_eq!(session.subject, PLACEHOLDER_SUBJECT);
        assert_eq!(session.competency, "N/A");
        assert_eq!(session.start, clock(8, 0));
        assert_eq!(session.end, clock(12, 0));
        assert_eq!(index.hours_per_session(), DEFAULT_HOURS_PER_SESSION);
    }

    #[test]
    fn test_bucket_sizes() {
        let index = CurriculumIndex::new(vec![
            CurriculumSession::new("A").with_trimester("1"),
            CurriculumSession::new("B").with_trimester("1"),
            CurriculumSession::new("C").with_trimester("3,0"),
        ]);
        let sizes: Vec<(String, usize)> = index
            .bucket_sizes()
            .map(|(k, n)| (k.to_string(), n))
            .collect();
        assert_eq!(sizes, vec![("1".to_string(), 2), ("3".to_string(), 1)]);
    }
}
