use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::view::Encouragement;

/// One of the three fixed identities tracked by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantId {
    Xiaolu,
    Jingfang,
    Jingyi,
}

impl ParticipantId {
    pub const ALL: [ParticipantId; 3] = [
        ParticipantId::Xiaolu,
        ParticipantId::Jingfang,
        ParticipantId::Jingyi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantId::Xiaolu => "xiaolu",
            ParticipantId::Jingfang => "jingfang",
            ParticipantId::Jingyi => "jingyi",
        }
    }

    /// Case-insensitive lookup; anything unrecognized is `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "xiaolu" => Some(ParticipantId::Xiaolu),
            "jingfang" => Some(ParticipantId::Jingfang),
            "jingyi" => Some(ParticipantId::Jingyi),
            _ => None,
        }
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display configuration for a participant. The roster is fixed at
/// compile time; see `participants::ROSTER`.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: &'static str,
    pub accent: &'static str,
}

/// Persisted per-date record: one completion flag per participant.
/// Flags absent from an on-disk document default to false, so a record
/// written by one participant reads as "not done" for the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    #[serde(default)]
    pub xiaolu: bool,
    #[serde(default)]
    pub jingfang: bool,
    #[serde(default)]
    pub jingyi: bool,
}

impl DailyRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            xiaolu: false,
            jingfang: false,
            jingyi: false,
        }
    }

    pub fn flag(&self, id: ParticipantId) -> bool {
        match id {
            ParticipantId::Xiaolu => self.xiaolu,
            ParticipantId::Jingfang => self.jingfang,
            ParticipantId::Jingyi => self.jingyi,
        }
    }

    pub fn set_flag(&mut self, id: ParticipantId, value: bool) {
        match id {
            ParticipantId::Xiaolu => self.xiaolu = value,
            ParticipantId::Jingfang => self.jingfang = value,
            ParticipantId::Jingyi => self.jingyi = value,
        }
    }
}

/// The whole shared history, keyed by `YYYY-MM-DD`.
pub type ProgressData = BTreeMap<String, DailyRecord>;

#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub p: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub date: String,
    pub participant: ParticipantId,
    pub current_status: bool,
}

#[derive(Debug, Serialize)]
pub struct ParticipantStatus {
    pub id: ParticipantId,
    pub name: &'static str,
    pub accent: &'static str,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: String,
    pub day_index: u32,
    pub total_days: u32,
    pub demo_mode: bool,
    pub date_display: String,
    pub participant: Participant,
    pub checked_in: bool,
    pub all_checked_in: bool,
    pub statuses: Vec<ParticipantStatus>,
    pub message: Encouragement,
}
