use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity plus point in time of a commit's author or committer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp_ms: i64,
    /// Offset of the local time zone from UTC, in milliseconds.
    pub tz_offset_ms: i32,
}

impl Person {
    /// Identity stamped at `timestamp_ms`, with the zone offset in milliseconds.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        timestamp_ms: i64,
        tz_offset_ms: i32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp_ms,
            tz_offset_ms,
        }
    }

    /// Same identity, different point in time.
    pub fn at(&self, timestamp_ms: i64, tz_offset_ms: i32) -> Self {
        Self {
            timestamp_ms,
            tz_offset_ms,
            ..self.clone()
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
