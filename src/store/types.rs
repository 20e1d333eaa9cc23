//! Persistence entities owned by the knowledge store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CHAT_EMPTY_SENTINEL, DOCUMENT_EMPTY_SENTINEL, PLACEHOLDER_NO_CHAT_SUMMARY,
    PLACEHOLDER_NO_DOC_SUMMARY,
};

/// The two independent knowledge streams accumulated per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStream {
    Document,
    Chat,
}

impl SummaryStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Chat => "chat",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "document" => Some(Self::Document),
            "chat" => Some(Self::Chat),
            _ => None,
        }
    }

    /// Fixed text the rolling summary holds when nothing has been merged.
    pub fn empty_sentinel(&self) -> &'static str {
        match self {
            Self::Document => DOCUMENT_EMPTY_SENTINEL,
            Self::Chat => CHAT_EMPTY_SENTINEL,
        }
    }

    /// Placeholder substituted into the overall-synthesis prompt when this
    /// stream has no real content.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Document => PLACEHOLDER_NO_DOC_SUMMARY,
            Self::Chat => PLACEHOLDER_NO_CHAT_SUMMARY,
        }
    }
}

impl fmt::Display for SummaryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The running free-text narrative for one (user, stream) pair.
///
/// Never empty once any delta has merged; holds the stream's empty
/// sentinel before that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingSummary {
    pub text: String,
    pub last_updated: DateTime<Utc>,
}

/// Cached overall-synthesis artifact for one user. Overwritten wholesale
/// on each regeneration, never partially patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// Read-only profile view assembled fresh on every synthesizer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfileSnapshot {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub existing_conditions: Vec<String>,
    pub allergies: Vec<String>,
}

impl UserProfileSnapshot {
    /// Body mass index derived from height and weight; never stored.
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height_cm? / 100.0;
        let weight = self.weight_kg?;
        if height_m <= 0.0 || weight <= 0.0 {
            return None;
        }
        Some((weight / (height_m * height_m) * 10.0).round() / 10.0)
    }

    /// True when the profile carries nothing worth synthesizing over:
    /// no name, age, gender, conditions, or allergies.
    pub fn is_effectively_empty(&self) -> bool {
        !self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && self.age.is_none()
            && !self.gender.as_deref().is_some_and(|g| !g.trim().is_empty())
            && self.existing_conditions.is_empty()
            && self.allergies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_round_trips_through_str() {
        for stream in [SummaryStream::Document, SummaryStream::Chat] {
            assert_eq!(SummaryStream::from_str(stream.as_str()), Some(stream));
        }
        assert_eq!(SummaryStream::from_str("profile"), None);
    }

    #[test]
    fn bmi_derived_and_rounded() {
        let profile = UserProfileSnapshot {
            height_cm: Some(170.0),
            weight_kg: Some(65.0),
            ..Default::default()
        };
        assert_eq!(profile.bmi(), Some(22.5));
    }

    #[test]
    fn bmi_absent_without_both_measurements() {
        let profile = UserProfileSnapshot { height_cm: Some(170.0), ..Default::default() };
        assert_eq!(profile.bmi(), None);
    }

    #[test]
    fn empty_profile_detected() {
        assert!(UserProfileSnapshot::default().is_effectively_empty());

        let with_condition = UserProfileSnapshot {
            existing_conditions: vec!["asthma".into()],
            ..Default::default()
        };
        assert!(!with_condition.is_effectively_empty());
    }

    #[test]
    fn height_and_weight_alone_still_count_as_empty() {
        // Bail-out looks at identity and history fields only.
        let profile = UserProfileSnapshot {
            height_cm: Some(180.0),
            weight_kg: Some(80.0),
            ..Default::default()
        };
        assert!(profile.is_effectively_empty());
    }
}
