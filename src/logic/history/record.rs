use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::{HealthError, HealthResult};
use crate::logic::features::{ActivityLevel, VitalSample};
use crate::logic::model::AnomalyVerdict;

/// Column order of every history log
pub const HISTORY_COLUMNS: &[&str] = &[
    "subject_id",
    "timestamp",
    "heart_rate",
    "blood_oxygen",
    "temperature",
    "respiration_rate",
    "activity_level",
    "anomaly",
];

/// A sample plus its verdict, as persisted in the subject's log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub sample: VitalSample,
    pub verdict: AnomalyVerdict,
}

impl HistoryRecord {
    pub fn new(sample: VitalSample, verdict: AnomalyVerdict) -> Self {
        Self { sample, verdict }
    }

    pub fn subject_id(&self) -> &str {
        &self.sample.subject_id
    }
}

/// One CSV row of a history log.
///
/// Kept loosely typed so logs written by older tools still load: `user_id`
/// is accepted for `subject_id`, the `anomaly` column may be missing or empty,
/// and activity may be stored as its 0/1/2 encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(default, alias = "user_id")]
    pub subject_id: String,
    #[serde(default)]
    pub timestamp: String,
    pub heart_rate: f64,
    pub blood_oxygen: f64,
    pub temperature: f64,
    pub respiration_rate: f64,
    #[serde(default)]
    pub activity_level: String,
    #[serde(default)]
    pub anomaly: Option<String>,
}

impl HistoryRow {
    /// Legacy rows without a verdict count as Normal
    pub fn verdict(&self) -> AnomalyVerdict {
        match self.anomaly.as_deref().map(str::trim) {
            Some("Anomaly") => AnomalyVerdict::Anomaly,
            _ => AnomalyVerdict::Normal,
        }
    }
}

impl HistoryRow {
    /// Cell value for a header column; unknown columns are left empty
    pub fn field(&self, column: &str) -> String {
        match column.trim() {
            "subject_id" | "user_id" => self.subject_id.clone(),
            "timestamp" => self.timestamp.clone(),
            "heart_rate" => self.heart_rate.to_string(),
            "blood_oxygen" => self.blood_oxygen.to_string(),
            "temperature" => self.temperature.to_string(),
            "respiration_rate" => self.respiration_rate.to_string(),
            "activity_level" => self.activity_level.clone(),
            "anomaly" => self.anomaly.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(record: &HistoryRecord) -> Self {
        let s = &record.sample;
        Self {
            subject_id: s.subject_id.clone(),
            timestamp: s.timestamp.to_rfc3339(),
            heart_rate: s.heart_rate,
            blood_oxygen: s.blood_oxygen,
            temperature: s.temperature,
            respiration_rate: s.respiration_rate,
            activity_level: s.activity_level.as_str().to_string(),
            anomaly: Some(record.verdict.as_str().to_string()),
        }
    }
}

impl TryFrom<HistoryRow> for HistoryRecord {
    type Error = HealthError;

    fn try_from(row: HistoryRow) -> HealthResult<Self> {
        let verdict = row.verdict();
        let sample = VitalSample {
            timestamp: parse_timestamp(&row.timestamp)?,
            activity_level: parse_activity(&row.activity_level)?,
            subject_id: row.subject_id,
            heart_rate: row.heart_rate,
            blood_oxygen: row.blood_oxygen,
            temperature: row.temperature,
            respiration_rate: row.respiration_rate,
        };
        Ok(Self { sample, verdict })
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS[.f]` taken as UTC
pub fn parse_timestamp(raw: &str) -> HealthResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| HealthError::validation(format!("unreadable timestamp '{}'", raw)))
}

fn parse_activity(raw: &str) -> HealthResult<ActivityLevel> {
    match raw.trim() {
        "0" => Ok(ActivityLevel::Low),
        "1" => Ok(ActivityLevel::Moderate),
        "2" => Ok(ActivityLevel::High),
        other => other.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_legacy_timestamp_and_activity() {
        let ts = parse_timestamp("2024-05-01 10:15:00.250000").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap() + chrono::Duration::milliseconds(250));
        assert_eq!(parse_activity("2").unwrap(), ActivityLevel::High);
        assert_eq!(parse_activity("moderate").unwrap(), ActivityLevel::Moderate);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_field_follows_header_names() {
        let row = HistoryRow {
            subject_id: "user_1".to_string(),
            timestamp: "2024-05-01T10:15:00Z".to_string(),
            heart_rate: 80.5,
            blood_oxygen: 96.0,
            temperature: 36.5,
            respiration_rate: 15.0,
            activity_level: "low".to_string(),
            anomaly: Some("Anomaly".to_string()),
        };
        assert_eq!(row.field("user_id"), "user_1");
        assert_eq!(row.field("heart_rate"), "80.5");
        assert_eq!(row.field(" anomaly "), "Anomaly");
        assert_eq!(row.field("recommendations"), "");
    }

    #[test]
    fn test_missing_verdict_is_normal() {
        let row = HistoryRow {
            subject_id: "user_1".to_string(),
            timestamp: "2024-05-01T10:15:00Z".to_string(),
            heart_rate: 80.0,
            blood_oxygen: 96.0,
            temperature: 36.5,
            respiration_rate: 15.0,
            activity_level: "low".to_string(),
            anomaly: None,
        };
        assert_eq!(row.verdict(), AnomalyVerdict::Normal);

        let record = HistoryRecord::try_from(row).unwrap();
        assert_eq!(record.verdict, AnomalyVerdict::Normal);
        assert_eq!(record.sample.activity_level, ActivityLevel::Low);
    }
}
