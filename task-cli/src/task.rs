use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
pub struct Task {
    id: u32,
    description: String,
    status: Status,
    #[serde(deserialize_with = "timestamp::deserialize")]
    created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    updated_at: DateTime<Utc>,
}

/// The fixed set of states a task can be in.
///
/// Files written by the Spanish-language predecessor of this tool used
/// `pendiente`, `en_progreso` and `terminada`; those are accepted when reading
/// a backing file but never written.
#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "en_progreso")]
    InProgress,
    #[serde(alias = "terminada")]
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StoreError::InvalidStatus(s.to_string()))
    }
}

impl Task {
    pub(crate) fn new(id: u32, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            description,
            status: Status::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the description of the task.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current status of the task.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Only used to repair duplicate IDs in older files; timestamps are kept.
    pub(crate) fn reassign_id(&mut self, id: u32) {
        self.id = id;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
        self.touch();
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
        self.touch();
    }

    // updated_at must move strictly forward even when the clock has not ticked
    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }
}

/// Timestamps are written as RFC 3339. Older files carry naive ISO-8601
/// local times without an offset; those are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
