use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::dto::{LoginRequest, RegisterRequest, UpdateRequest};
use crate::error::{ApiError, FieldError};

pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID: &str = "Invalid value";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Validated registration input.
#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Validated profile update. Only non-empty values are carried; `None` keeps
/// the stored field.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Default)]
struct Errors(Vec<FieldError>);

impl Errors {
    fn required(&mut self, path: &str, v: &Option<Value>) -> Option<String> {
        match v {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.0.push(FieldError::body(path, INVALID));
                None
            }
            None => {
                self.0.push(FieldError::body(path, format!("{path} is required")));
                None
            }
        }
    }

    fn optional(&mut self, path: &str, v: &Option<Value>) -> Option<String> {
        match v {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.0.push(FieldError::body(path, INVALID));
                None
            }
            None => None,
        }
    }

    fn non_empty(&mut self, path: &str, v: Option<String>) -> Option<String> {
        match v {
            Some(s) if s.is_empty() => {
                self.0.push(FieldError::body(path, format!("{path} must not be empty")));
                None
            }
            other => other,
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ApiError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

pub fn registration(req: &RegisterRequest) -> Result<Registration, ApiError> {
    let mut errs = Errors::default();
    let email = errs.required("email", &req.email);
    let email = errs.non_empty("email", email);
    if let Some(e) = &email {
        if !is_valid_email(e) {
            errs.0.push(FieldError::body("email", "Invalid email"));
        }
    }
    let first_name = errs.required("firstName", &req.first_name);
    let last_name = errs.required("lastName", &req.last_name);
    let password = errs.required("password", &req.password);
    let password = errs.non_empty("password", password);

    errs.finish(|| Registration {
        email: email.unwrap_or_default(),
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

pub fn credentials(req: &LoginRequest) -> Result<Credentials, ApiError> {
    let mut errs = Errors::default();
    let email = errs.required("email", &req.email);
    let email = errs.non_empty("email", email);
    let password = errs.required("password", &req.password);
    let password = errs.non_empty("password", password);

    errs.finish(|| Credentials {
        email: email.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

pub fn profile_changes(req: &UpdateRequest) -> Result<ProfileChanges, ApiError> {
    let mut errs = Errors::default();
    let first_name = errs.optional("firstName", &req.first_name);
    let last_name = errs.optional("lastName", &req.last_name);
    let password = errs.optional("password", &req.password);
    if let Some(p) = &password {
        if p.chars().count() < MIN_PASSWORD_LEN {
            errs.0.push(FieldError::body(
                "password",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
    }

    errs.finish(|| ProfileChanges {
        first_name: first_name.filter(|s| !s.is_empty()),
        last_name: last_name.filter(|s| !s.is_empty()),
        password,
    })
}
