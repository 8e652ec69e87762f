use serde::{Deserialize, Serialize};

use crate::db::models::NewRecord;
use crate::server::config::ServerConfig;
use crate::web::error::AppError;

/// Body of a submit call. Accepts both the school variant
/// (`school`, `record`, `diff`) and the school-less variant (`name`, `time`).
#[derive(Deserialize, Debug, Default)]
pub struct SubmitRecordRequest {
    pub name: Option<String>,
    pub school: Option<String>,
    #[serde(alias = "time", alias = "record")]
    pub record_time: Option<f64>,
    #[serde(alias = "diff")]
    pub deviation: Option<f64>,
}

/// What a valid submit call asks for.
#[derive(Debug, PartialEq)]
pub enum Submission {
    Record(NewRecord),
    /// The name was the reset keyword; wipe the leaderboard instead.
    Reset,
}

fn missing(field: &str) -> AppError {
    AppError::InvalidInput(format!("Missing or empty field: {field}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SubmitRecordRequest {
    /// Checks required fields for the configured variant. Nothing here touches
    /// storage, so a rejected request never leaves partial state behind.
    pub fn validate(self, config: &ServerConfig) -> Result<Submission, AppError> {
        let name = non_empty(self.name).ok_or_else(|| missing("name"))?;

        let school = match non_empty(self.school) {
            Some(school) => school,
            None if config.require_school => return Err(missing("school")),
            None => String::new(),
        };

        let record_time = self.record_time.ok_or_else(|| missing("record_time"))?;

        let deviation = match self.deviation {
            Some(deviation) => deviation,
            None if config.require_deviation => return Err(missing("deviation")),
            None => (record_time - config.target_time).abs(),
        };

        if name == config.reset_keyword.trim() {
            return Ok(Submission::Reset);
        }

        Ok(Submission::Record(NewRecord {
            school,
            name,
            record_time,
            deviation,
        }))
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AckResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl AckResponse {
    pub fn saved(id: i32) -> Self {
        Self {
            status: "success",
            message: "saved",
            id: Some(id),
        }
    }

    pub fn cleared() -> Self {
        Self {
            status: "success",
            message: "cleared",
            id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> SubmitRecordRequest {
        serde_json::from_str(body).unwrap()
    }

    fn schoolless() -> ServerConfig {
        ServerConfig {
            require_school: false,
            require_deviation: false,
            ..ServerConfig::default()
        }
    }

    fn assert_invalid(result: Result<Submission, AppError>, field: &str) {
        match result {
            Err(AppError::InvalidInput(msg)) => assert!(msg.ends_with(field), "{msg}"),
            other => panic!("expected InvalidInput for {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_school_variant_accepts_short_field_names() {
        let submission = parse(r#"{"school":" A ","name":" X ","record":9.987,"diff":0.013}"#)
            .validate(&ServerConfig::default())
            .unwrap();

        assert_eq!(
            submission,
            Submission::Record(NewRecord {
                school: "A".to_string(),
                name: "X".to_string(),
                record_time: 9.987,
                deviation: 0.013,
            })
        );
    }

    #[test]
    fn test_missing_name_rejected() {
        let config = ServerConfig::default();
        assert_invalid(parse(r#"{"school":"A","record_time":9.9,"deviation":0.1}"#).validate(&config), "name");
        assert_invalid(
            parse(r#"{"name":"   ","school":"A","record_time":9.9,"deviation":0.1}"#).validate(&config),
            "name",
        );
    }

    #[test]
    fn test_missing_time_rejected() {
        assert_invalid(
            parse(r#"{"name":"X","school":"A","deviation":0.1}"#).validate(&ServerConfig::default()),
            "record_time",
        );
        assert_invalid(parse(r#"{"name":"X"}"#).validate(&schoolless()), "record_time");
    }

    #[test]
    fn test_school_required_in_school_variant() {
        assert_invalid(
            parse(r#"{"name":"X","record_time":9.9,"deviation":0.1}"#).validate(&ServerConfig::default()),
            "school",
        );
        assert_invalid(
            parse(r#"{"name":"X","school":"","record_time":9.9,"deviation":0.1}"#)
                .validate(&ServerConfig::default()),
            "school",
        );
    }

    #[test]
    fn test_deviation_required_in_school_variant() {
        assert_invalid(
            parse(r#"{"name":"X","school":"A","record_time":9.9}"#).validate(&ServerConfig::default()),
            "deviation",
        );
    }

    #[test]
    fn test_schoolless_variant_defaults() {
        let submission = parse(r#"{"name":"X","time":10.25}"#).validate(&schoolless()).unwrap();

        let Submission::Record(record) = submission else {
            panic!("expected a record");
        };
        assert_eq!(record.school, "");
        assert_eq!(record.record_time, 10.25);
        assert!((record.deviation - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_deviation_kept_when_optional() {
        let submission = parse(r#"{"name":"X","time":10.25,"diff":-0.25}"#).validate(&schoolless()).unwrap();
        let Submission::Record(record) = submission else {
            panic!("expected a record");
        };
        assert_eq!(record.deviation, -0.25);
    }

    #[test]
    fn test_zero_time_accepted() {
        let submission = parse(r#"{"name":"X","time":0}"#).validate(&schoolless()).unwrap();
        assert!(matches!(submission, Submission::Record(_)));
    }

    #[test]
    fn test_reset_keyword_intercepted_after_trim() {
        let config = ServerConfig::default();
        let submission = parse(r#"{"name":"  초기화 ","school":"A","record_time":9.9,"deviation":0.1}"#)
            .validate(&config)
            .unwrap();
        assert_eq!(submission, Submission::Reset);

        let submission = parse(r#"{"name":"초기화!","school":"A","record_time":9.9,"deviation":0.1}"#)
            .validate(&config)
            .unwrap();
        assert!(matches!(submission, Submission::Record(_)));
    }

    #[test]
    fn test_wrong_json_type_fails_to_parse() {
        assert!(serde_json::from_str::<SubmitRecordRequest>(r#"{"name":"X","time":"fast"}"#).is_err());
    }

    #[test]
    fn test_ack_shapes() {
        assert_eq!(
            serde_json::to_value(AckResponse::saved(7)).unwrap(),
            serde_json::json!({ "status": "success", "message": "saved", "id": 7 })
        );
        assert_eq!(
            serde_json::to_value(AckResponse::cleared()).unwrap(),
            serde_json::json!({ "status": "success", "message": "cleared" })
        );
    }
}
