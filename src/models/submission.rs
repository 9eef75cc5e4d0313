use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ValidationError;

/// The raw contact form as it arrives on the wire. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A validated contact-form record. Only obtainable through [`Submission::from_form`].
#[derive(Debug, Clone)]
pub struct Submission {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    subject: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl Submission {
    pub fn from_form(form: ContactForm) -> Result<Self, ValidationError> {
        Ok(Submission {
            name: required("name", form.name)?,
            email: required("email", form.email)?,
            phone: required("phone", form.phone)?,
            subject: required("subject", form.subject)?,
            message: required("message", form.message)?,
            id: Uuid::now_v7(),
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}
