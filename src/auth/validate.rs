use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// A single field-level validation failure, returned to the client verbatim.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str, out: &mut Vec<FieldViolation>) {
    if email.is_empty() {
        out.push(FieldViolation::new("email", "must be provided"));
    } else if !is_valid_email(email) {
        out.push(FieldViolation::new("email", "must be a valid email address"));
    }
}

fn check_password(password: &str, out: &mut Vec<FieldViolation>) {
    if password.is_empty() {
        out.push(FieldViolation::new("password", "must be provided"));
    } else if password.len() < 8 {
        out.push(FieldViolation::new("password", "must be at least 8 bytes long"));
    } else if password.len() > 72 {
        out.push(FieldViolation::new("password", "must not be more than 72 bytes long"));
    }
}

/// Shape checks for registration. Empty result means valid.
pub fn validate_register(name: &str, email: &str, password: &str) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    if name.is_empty() {
        out.push(FieldViolation::new("name", "must be provided"));
    } else if name.len() > 500 {
        out.push(FieldViolation::new("name", "must not be more than 500 bytes long"));
    }
    check_email(email, &mut out);
    check_password(password, &mut out);
    out
}

/// Shape checks for authentication.
pub fn validate_credentials(email: &str, password: &str) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    check_email(email, &mut out);
    check_password(password, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_registration() {
        assert!(validate_register("Alice", "alice@example.com", "password1").is_empty());
    }

    #[test]
    fn rejects_missing_fields() {
        let violations = validate_register("", "", "");
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
        assert!(violations.iter().all(|v| v.message == "must be provided"));
    }

    #[test]
    fn rejects_malformed_email() {
        let violations = validate_register("Alice", "not-an-email", "password1");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "email");
    }

    #[test]
    fn enforces_password_bounds() {
        assert_eq!(
            validate_credentials("a@x.com", "short")[0].field,
            "password"
        );
        let long = "x".repeat(73);
        assert_eq!(validate_credentials("a@x.com", &long)[0].field, "password");
        assert!(validate_credentials("a@x.com", &"x".repeat(72)).is_empty());
    }

    #[test]
    fn rejects_overlong_name() {
        let violations = validate_register(&"n".repeat(501), "a@x.com", "password1");
        assert_eq!(violations[0].field, "name");
    }
}
