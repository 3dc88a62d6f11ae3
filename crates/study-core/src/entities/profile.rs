//! Study profile attributes used for partner matching

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::value_objects::UserId;

/// Academic level of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AcademicLevel {
    #[serde(rename = "ZJC")]
    Zjc,
    #[serde(rename = "O-Level")]
    OLevel,
    #[serde(rename = "A-Level")]
    ALevel,
    #[serde(rename = "Undergraduate")]
    Undergraduate,
    #[serde(rename = "Postgraduate")]
    Postgraduate,
}

impl AcademicLevel {
    /// All levels in ascending order
    pub const ALL: [Self; 5] = [
        Self::Zjc,
        Self::OLevel,
        Self::ALevel,
        Self::Undergraduate,
        Self::Postgraduate,
    ];

    /// Display label (also the stored form)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Zjc => "ZJC",
            Self::OLevel => "O-Level",
            Self::ALevel => "A-Level",
            Self::Undergraduate => "Undergraduate",
            Self::Postgraduate => "Postgraduate",
        }
    }
}

impl fmt::Display for AcademicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AcademicLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.label() == s)
            .ok_or_else(|| format!("unknown academic level: {s}"))
    }
}

/// Profile attributes of a student, as stored in the `users` collection
///
/// Every attribute may be absent; absent sets are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub subjects: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub methods: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub preferences: BTreeSet<String>,
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub academic_level: Option<AcademicLevel>,
}

impl UserProfile {
    /// Create an empty profile
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            display_name: None,
            subjects: BTreeSet::new(),
            methods: BTreeSet::new(),
            preferences: BTreeSet::new(),
            academic_level: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferences<I, S>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences = preferences.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_academic_level(mut self, level: AcademicLevel) -> Self {
        self.academic_level = Some(level);
        self
    }
}

// `null` and missing lists both mean "no entries".
fn lenient_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .collect())
}

// Unknown labels are treated as "no level" rather than rejecting the profile.
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<AcademicLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.parse().ok()))
}
