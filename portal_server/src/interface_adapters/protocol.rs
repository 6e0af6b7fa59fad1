use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_path_to_error::{Path, Segment};

use crate::domain::result::{NON_FIELD_ERRORS, Rejection};

// Request payload for the operations endpoint.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub input: Value,
}

/// Every operation the portal endpoint dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CreateSchool,
    UpdateSchool,
    FindSchool,
    AddAdministrator,
    PublishNews,
    CreateCalendarEvent,
    CreateStaff,
    CreateGrade,
    CreateRepository,
    CreateOfficeHour,
    RegisterUser,
    UpdateUser,
    SetUserActive,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::CreateSchool,
        Operation::UpdateSchool,
        Operation::FindSchool,
        Operation::AddAdministrator,
        Operation::PublishNews,
        Operation::CreateCalendarEvent,
        Operation::CreateStaff,
        Operation::CreateGrade,
        Operation::CreateRepository,
        Operation::CreateOfficeHour,
        Operation::RegisterUser,
        Operation::UpdateUser,
        Operation::SetUserActive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateSchool => "create_school",
            Operation::UpdateSchool => "update_school",
            Operation::FindSchool => "find_school",
            Operation::AddAdministrator => "add_administrator",
            Operation::PublishNews => "publish_news",
            Operation::CreateCalendarEvent => "create_calendar_event",
            Operation::CreateStaff => "create_staff",
            Operation::CreateGrade => "create_grade",
            Operation::CreateRepository => "create_repository",
            Operation::CreateOfficeHour => "create_office_hour",
            Operation::RegisterUser => "register_user",
            Operation::UpdateUser => "update_user",
            Operation::SetUserActive => "set_user_active",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Decodes an operation's input object.
///
/// Shape errors become a 400 rejection on the offending member: the name
/// serde reports for missing and unknown fields, otherwise the last key of
/// the path where decoding stopped. Inputs with no recoverable member (a
/// non-object body, say) report on `non_field_errors`.
pub fn decode_input<I: DeserializeOwned>(input: Value) -> Result<I, Rejection> {
    serde_path_to_error::deserialize(input).map_err(|err| {
        let message = err.inner().to_string();
        let field = named_member(&message)
            .or_else(|| last_key(err.path()))
            .unwrap_or_else(|| NON_FIELD_ERRORS.to_string());
        Rejection::bad_request(field, without_position(&message))
    })
}

fn named_member(message: &str) -> Option<String> {
    ["missing field `", "unknown field `"]
        .into_iter()
        .find_map(|marker| {
            let start = message.find(marker)? + marker.len();
            let len = message[start..].find('`')?;
            Some(message[start..start + len].to_string())
        })
}

fn last_key(path: &Path) -> Option<String> {
    path.iter().rev().find_map(|segment| match segment {
        Segment::Map { key } => Some(key.clone()),
        _ => None,
    })
}

// serde_json appends " at line N column M" when it has a position.
fn without_position(message: &str) -> &str {
    match message.rfind(" at line ") {
        Some(idx) if message[idx..].contains(" column ") => &message[..idx],
        _ => message,
    }
}

// Body returned when the bearer token cannot be decoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorPayload {
    pub data: Option<Value>,
    pub errors: Vec<AuthErrorMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorMessage {
    pub message: String,
}

impl AuthErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![AuthErrorMessage {
                message: message.into(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
