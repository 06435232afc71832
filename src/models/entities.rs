//! Instructors, groups, and environments.
//!
//! These are the three axes of the timetable. The solver only sees
//! their positions in the input lists; the descriptive fields travel
//! through to the materialized rows untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::curriculum::TrimesterKey;
use super::not_available;

/// A person who can be assigned to teach a group on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    /// Display name; also the identity in output rows.
    pub name: String,
    /// Preferred shift (free text, informational only).
    #[serde(default = "not_available")]
    pub shift_preference: String,
    /// Exclusion notes (free text, informational only).
    #[serde(default = "not_available")]
    pub exclusions: String,
    /// Home location.
    #[serde(default = "not_available")]
    pub location: String,
    /// Extra attributes carried by the input.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Instructor {
    /// Creates an instructor with descriptive fields set to `"N/A"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shift_preference: not_available(),
            exclusions: not_available(),
            location: not_available(),
            attributes: HashMap::new(),
        }
    }

    /// Sets the preferred shift.
    pub fn with_shift_preference(mut self, shift: impl Into<String>) -> Self {
        self.shift_preference = shift.into();
        self
    }

    /// Sets the exclusion notes.
    pub fn with_exclusions(mut self, exclusions: impl Into<String>) -> Self {
        self.exclusions = exclusions.into();
        self
    }

    /// Sets the home location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A cohort of students that must be covered every working day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier (cohort code).
    pub id: String,
    /// Program of study.
    #[serde(default = "not_available")]
    pub program: String,
    /// Trimester the group is in; selects its curriculum bucket.
    #[serde(default)]
    pub trimester: TrimesterKey,
    /// Where the group meets.
    #[serde(default = "not_available")]
    pub location: String,
    /// Group shift (free text).
    #[serde(default = "not_available")]
    pub shift: String,
}

impl Group {
    /// Creates a group in trimester `"1"`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            program: not_available(),
            trimester: TrimesterKey::default(),
            location: not_available(),
            shift: not_available(),
        }
    }

    /// Sets the program of study.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the trimester.
    pub fn with_trimester(mut self, trimester: impl Into<TrimesterKey>) -> Self {
        self.trimester = trimester.into();
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the group shift.
    pub fn with_shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = shift.into();
        self
    }
}

/// A room or learning space, assigned by rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    /// Environment identifier.
    pub id: String,
}

impl Environment {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<&str> for Environment {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Environment {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;

    #[test]
    fn test_instructor_defaults() {
        let inst = Instructor::new("Ana");
        assert_eq!(inst.name, "Ana");
        assert_eq!(inst.shift_preference, NOT_AVAILABLE);
        assert_eq!(inst.exclusions, NOT_AVAILABLE);
        assert!(inst.attributes.is_empty());
    }

    #[test]
    fn test_instructor_builder() {
        let inst = Instructor::new("Luis")
            .with_shift_preference("Mañana")
            .with_location("Sede Norte")
            .with_attribute("area", "TIC");
        assert_eq!(inst.shift_preference, "Mañana");
        assert_eq!(inst.location, "Sede Norte");
        assert_eq!(inst.attributes.get("area"), Some(&"TIC".to_string()));
    }

    #[test]
    fn test_group_builder() {
        let group = Group::new("2758193")
            .with_program("ADSO")
            .with_trimester(TrimesterKey::normalize("3,0"));
        assert_eq!(group.trimester.as_str(), "3");
        assert_eq!(group.program, "ADSO");
        assert_eq!(group.shift, NOT_AVAILABLE);
    }

    #[test]
    fn test_group_deserialize_defaults() {
        let group: Group = serde_json::from_str(r#"{"id": "G1"}"#).unwrap();
        assert_eq!(group.trimester, TrimesterKey::default());
        assert_eq!(group.location, NOT_AVAILABLE);
    }

    #[test]
    fn test_environment_transparent() {
        let env = Environment::from("Lab 1");
        assert_eq!(serde_json::to_string(&env).unwrap(), "\"Lab 1\"");
    }
}
