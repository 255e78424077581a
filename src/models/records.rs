//! Persistence data models
//!
//! Stored record shapes, their client-facing views, and the inbound save requests

use crate::utils::error::{helpers::missing_fields_error, helpers::validation_error, AppResult};
use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection names
pub const QUIZ_PROGRESS_COLLECTION: &str = "quiz_progress";
pub const PROGRESS_COLLECTION: &str = "progress";
pub const ASSIGNMENTS_COLLECTION: &str = "assignments";

// ====== Stored records ======

/// One finished quiz, as first saved by the quiz screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub language: String,
    pub score: f64,
    pub total: f64,
    pub date: String,
}

/// Progress snapshot with opaque quiz data, stamped by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub language: String,
    pub quiz_data: Value,
    #[serde(with = "stored_datetime")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    #[serde(with = "stored_datetime")]
    pub due_date: DateTime<Utc>,
}

/// BSON dates on write; on read also accepts the date strings older clients stored
mod stored_datetime {
    use super::{chrono_datetime_as_bson_datetime, parse_due_date};
    use bson::Bson;
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        chrono_datetime_as_bson_datetime::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::DateTime(value) => Ok(value.to_chrono()),
            Bson::String(raw) => {
                parse_due_date(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized date '{}'", raw)))
            }
            other => Err(D::Error::custom(format!("expected a date, found {:?}", other.element_type()))),
        }
    }
}

/// The two assignments seeded into an empty collection
pub fn sample_assignments() -> Vec<Assignment> {
    vec![
        Assignment {
            id: None,
            title: "Practice Greetings in Arabic".to_string(),
            description: "Learn and practice 5 common greetings in Arabic.".to_string(),
            due_date: utc_midnight(2025, 6, 5),
        },
        Assignment {
            id: None,
            title: "Urdu Vocabulary Quiz".to_string(),
            description: "Complete a quiz on 10 Urdu vocabulary words.".to_string(),
            due_date: utc_midnight(2025, 6, 10),
        },
    ]
}

fn utc_midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Parse a due date given either as RFC 3339 or as a plain `YYYY-MM-DD` day
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
}

fn hex_id(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

// ====== Client-facing views ======

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgressView {
    pub id: String,
    pub user_id: String,
    pub language: String,
    pub score: f64,
    pub total: f64,
    pub date: String,
}

impl From<QuizProgress> for QuizProgressView {
    fn from(record: QuizProgress) -> Self {
        Self {
            id: hex_id(record.id),
            user_id: record.user_id,
            language: record.language,
            score: record.score,
            total: record.total,
            date: record.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub id: String,
    pub user_id: String,
    pub language: String,
    pub quiz_data: Value,
    pub timestamp: DateTime<Utc>,
}

impl From<Progress> for ProgressView {
    fn from(record: Progress) -> Self {
        Self {
            id: hex_id(record.id),
            user_id: record.user_id,
            language: record.language,
            quiz_data: record.quiz_data,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

impl From<Assignment> for AssignmentView {
    fn from(record: Assignment) -> Self {
        Self {
            id: hex_id(record.id),
            title: record.title,
            description: record.description,
            due_date: record.due_date,
        }
    }
}

// ====== Save requests ======

/// Collects the names of absent required fields, in declaration order
#[derive(Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn text(&mut self, name: &'static str, value: Option<String>) -> String {
        match value {
            Some(value) if !value.is_empty() => value,
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn number(&mut self, name: &'static str, value: Option<f64>) -> f64 {
        value.unwrap_or_else(|| {
            self.missing.push(name);
            0.0
        })
    }

    fn json(&mut self, name: &'static str, value: Option<Value>) -> Value {
        match value {
            Some(value) if !value.is_null() => value,
            _ => {
                self.missing.push(name);
                Value::Null
            }
        }
    }

    fn finish(self) -> AppResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(missing_fields_error(&self.missing))
        }
    }
}

/// `POST /api/saveQuizProgress` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizProgressRequest {
    pub user_id: Option<String>,
    pub language: Option<String>,
    pub score: Option<f64>,
    pub total: Option<f64>,
    pub date: Option<String>,
}

impl SaveQuizProgressRequest {
    pub fn validate(self) -> AppResult<QuizProgress> {
        let mut required = Required::default();
        let record = QuizProgress {
            id: None,
            user_id: required.text("userId", self.user_id),
            language: required.text("language", self.language),
            score: required.number("score", self.score),
            total: required.number("total", self.total),
            date: required.text("date", self.date),
        };
        required.finish()?;
        Ok(record)
    }
}

/// `POST /api/progress` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressRequest {
    pub user_id: Option<String>,
    pub language: Option<String>,
    pub quiz_data: Option<Value>,
}

impl SaveProgressRequest {
    /// Validate and stamp with `now`
    pub fn validate(self, now: DateTime<Utc>) -> AppResult<Progress> {
        let mut required = Required::default();
        let record = Progress {
            id: None,
            user_id: required.text("userId", self.user_id),
            language: required.text("language", self.language),
            quiz_data: required.json("quizData", self.quiz_data),
            timestamp: now,
        };
        required.finish()?;
        Ok(record)
    }
}

/// `POST /api/saveAssignment` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

impl SaveAssignmentRequest {
    pub fn validate(self) -> AppResult<Assignment> {
        let mut required = Required::default();
        let title = required.text("title", self.title);
        let description = required.text("description", self.description);
        let due_date = required.text("dueDate", self.due_date);
        required.finish()?;

        let due_date = parse_due_date(&due_date).ok_or_else(|| {
            validation_error(format!(
                "Invalid dueDate '{}', expected YYYY-MM-DD or an RFC 3339 timestamp",
                due_date
            ))
        })?;

        Ok(Assignment {
            id: None,
            title,
            description,
            due_date,
        })
    }
}
