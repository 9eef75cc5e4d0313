use askama::Template;

use crate::models::Submission;

#[derive(Template)]
#[template(path = "email/contact_notification.html")]
struct ContactNotificationHtml<'a> {
    site_name: &'a str,
    fields: [(&'static str, &'a str); 4],
    email: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact_notification.txt")]
struct ContactNotificationText<'a> {
    site_name: &'a str,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    subject: &'a str,
    message: &'a str,
}

pub fn render_contact_html(submission: &Submission, site_name: &str) -> askama::Result<String> {
    ContactNotificationHtml {
        site_name,
        fields: [
            ("Name", submission.name()),
            ("Email", submission.email()),
            ("Phone", submission.phone()),
            ("Subject", submission.subject()),
        ],
        email: submission.email(),
        message: submission.message(),
    }
    .render()
}

pub fn render_contact_text(submission: &Submission, site_name: &str) -> askama::Result<String> {
    ContactNotificationText {
        site_name,
        name: submission.name(),
        email: submission.email(),
        phone: submission.phone(),
        subject: submission.subject(),
        message: submission.message(),
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactForm;

    fn submission(message: &str) -> Submission {
        Submission::from_form(ContactForm {
            name: Some("Ann".into()),
            email: Some("ann@x.com".into()),
            phone: Some("555".into()),
            subject: Some("Info".into()),
            message: Some(message.into()),
        })
        .unwrap()
    }

    #[test]
    fn html_contains_every_field() {
        let html = render_contact_html(&submission("Hi"), "Cove").unwrap();
        for needle in ["Ann", "ann@x.com", "555", "Info", "Hi", "mailto:ann@x.com", "Cove"] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn html_escapes_submitter_input() {
        let html = render_contact_html(&submission("<script>alert(1)</script>"), "Cove").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("alert(1)"));
    }

    #[test]
    fn text_body_is_not_escaped() {
        let text = render_contact_text(&submission("a < b & c"), "Cove").unwrap();
        assert!(text.contains("Message:\na < b & c"));
        assert!(text.contains("Phone: 555"));
    }
}
