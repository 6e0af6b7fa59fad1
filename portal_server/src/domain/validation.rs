use std::fmt;

use url::Url;

use crate::domain::entities::Id;
use crate::domain::result::MessageError;

// Upper bound for stored email addresses.
const MAX_EMAIL_LEN: usize = 254;

/// Non-empty list of field errors produced by input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<MessageError>,
}

impl ValidationErrors {
    pub fn single(error: MessageError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    // Returns `None` for an empty list; an empty error set is not a failure.
    pub fn from_vec(errors: Vec<MessageError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn as_slice(&self) -> &[MessageError] {
        &self.errors
    }

    pub fn into_vec(self) -> Vec<MessageError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Typed command input that can check itself before a command runs.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates field errors so every problem in an input is reported at once.
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<MessageError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: MessageError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.push(MessageError::new(field, message));
        }
        self
    }

    /// Length bounds in characters, with blank and padded values rejected.
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            return self.push(MessageError::new(field, "this field may not be blank"));
        }
        if value.trim() != value {
            return self.push(MessageError::new(
                field,
                "this field may not start or end with whitespace",
            ));
        }

        let len = value.chars().count();
        if len < min {
            self.push(
                MessageError::new(
                    field,
                    format!("ensure this field has at least {min} characters"),
                )
                .with_detail("min_length", min.to_string())
                .with_detail("length", len.to_string()),
            );
        } else if len > max {
            self.push(
                MessageError::new(
                    field,
                    format!("ensure this field has no more than {max} characters"),
                )
                .with_detail("max_length", max.to_string())
                .with_detail("length", len.to_string()),
            );
        }
        self
    }

    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> &mut Self {
        match value {
            Some(value) => self.text(field, value, min, max),
            None => self,
        }
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_email(value) {
            self.push(MessageError::new(field, "enter a valid email address"));
        }
        self
    }

    pub fn optional_email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => self.email(field, value),
            None => self,
        }
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        let Some(value) = value else {
            return self;
        };
        let digits = value.chars().filter(char::is_ascii_digit).count();
        let charset_ok = value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
        if !charset_ok || !(7..=15).contains(&digits) {
            self.push(MessageError::new(field, "enter a valid phone number"));
        }
        self
    }

    /// Absolute http(s) URL with a host.
    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        let ok = Url::parse(value).is_ok_and(|url| {
            matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
        });
        if !ok {
            self.push(MessageError::new(field, "enter a valid URL"));
        }
        self
    }

    pub fn id(&mut self, field: &str, value: Id) -> &mut Self {
        if value <= 0 {
            self.push(MessageError::new(field, "must be a positive id"));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        match ValidationErrors::from_vec(std::mem::take(&mut self.errors)) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_LEN || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Domain needs at least one dot with non-empty labels on both sides.
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
