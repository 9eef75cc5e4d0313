use crate::error::ValidationError;
use crate::models::ContactForm;

/// Parse a contact body based on its Content-Type. JSON is assumed when none is given.
pub fn parse_form(content_type: Option<&str>, body: Option<&str>) -> Result<ContactForm, ValidationError> {
    let body = body
        .filter(|b| !b.trim().is_empty())
        .ok_or_else(|| ValidationError::Unreadable("empty body".to_string()))?;

    let ct = content_type.unwrap_or("application/json").to_ascii_lowercase();

    if ct.contains("application/x-www-form-urlencoded") {
        Ok(parse_form_urlencoded(body))
    } else if ct.contains("multipart/form-data") {
        Err(ValidationError::Unreadable(
            "multipart bodies are not accepted".to_string(),
        ))
    } else {
        parse_json(body)
    }
}

fn parse_json(body: &str) -> Result<ContactForm, ValidationError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ValidationError::Unreadable(format!("Invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(ValidationError::Unreadable(
            "JSON body must be an object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ValidationError::Unreadable(format!("Invalid JSON: {e}")))
}

fn parse_form_urlencoded(body: &str) -> ContactForm {
    let mut form = ContactForm::default();
    for (key, value) in form_urlencoded::parse(body.as_bytes()) {
        let slot = match key.as_ref() {
            "name" => &mut form.name,
            "email" => &mut form.email,
            "phone" => &mut form.phone,
            "subject" => &mut form.subject,
            "message" => &mut form.message,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    form
}
