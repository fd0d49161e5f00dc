//! The response envelope returned by `GET /status`.
//!
//! A success carries the metadata reported by the dependency; a failure carries
//! only a message. Being an enum, an envelope can never hold both or neither.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProbeError;
use crate::probe::ProbeReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Ok {
        /// Database name as reported by the dependency
        database: String,
        /// Dependency clock at the time of the probe
        #[serde(rename = "serverTime", with = "rfc3339_z")]
        server_time: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Ok { .. })
    }
}

impl From<ProbeReport> for Envelope {
    fn from(report: ProbeReport) -> Self {
        Envelope::Ok {
            database: report.database,
            server_time: report.server_time,
        }
    }
}

impl From<&ProbeError> for Envelope {
    fn from(err: &ProbeError) -> Self {
        Envelope::Error {
            message: err.to_string(),
        }
    }
}

/// RFC 3339 with a `Z` suffix, sub-second digits only when present.
mod rfc3339_z {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
