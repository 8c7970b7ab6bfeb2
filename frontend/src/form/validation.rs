use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Other,
}

impl FieldKind {
    pub fn from_type_attr(ty: Option<&str>) -> Self {
        match ty.map(str::to_ascii_lowercase).as_deref() {
            None | Some("text") => FieldKind::Text,
            Some("email") => FieldKind::Email,
            Some(_) => FieldKind::Other,
        }
    }
}

/// The parts of a form control that validation looks at.
#[derive(Clone, Debug)]
pub struct FieldSnapshot {
    pub required: bool,
    pub kind: FieldKind,
    pub value: String,
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn validate(field: &FieldSnapshot) -> Result<(), FieldError> {
    let value = field.value.trim();
    if value.is_empty() {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }
    if field.kind == FieldKind::Email && !is_valid_email(value) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field(required: bool, kind: FieldKind, value: &str) -> FieldSnapshot {
        FieldSnapshot {
            required,
            kind,
            value: value.to_string(),
        }
    }

    #[test]
    fn messages_match_what_the_page_shows() {
        assert_eq!(FieldError::Required.to_string(), "This field is required");
        assert_eq!(
            FieldError::InvalidEmail.to_string(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn optional_empty_fields_pass() {
        assert_eq!(validate(&field(false, FieldKind::Email, "  ")), Ok(()));
        assert_eq!(validate(&field(false, FieldKind::Text, "")), Ok(()));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jane@studio.io"));
        assert!(is_valid_email("a.b+c@sub.domain.co"));
        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("no-tld@domain"));
        assert!(!is_valid_email("two@@signs.com"));
        assert!(!is_valid_email("sp ace@domain.com"));
        assert!(!is_valid_email("@domain.com"));
    }

    #[test]
    fn email_is_checked_on_the_trimmed_value() {
        assert_eq!(
            validate(&field(true, FieldKind::Email, "  jane@studio.io \n")),
            Ok(())
        );
    }

    #[test]
    fn type_attribute_maps_to_kind() {
        assert_eq!(FieldKind::from_type_attr(Some("EMAIL")), FieldKind::Email);
        assert_eq!(FieldKind::from_type_attr(None), FieldKind::Text);
        assert_eq!(FieldKind::from_type_attr(Some("tel")), FieldKind::Other);
    }

    proptest! {
        #[test]
        fn required_blank_always_fails(ws in "[ \t\r\n]{0,8}", email in any::<bool>()) {
            let kind = if email { FieldKind::Email } else { FieldKind::Text };
            prop_assert_eq!(validate(&field(true, kind, &ws)), Err(FieldError::Required));
        }

        #[test]
        fn well_formed_addresses_pass(
            local in "[a-z0-9._+-]{1,12}",
            domain in "[a-z0-9-]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let addr = format!("{}@{}.{}", local, domain, tld);
            prop_assert_eq!(validate(&field(true, FieldKind::Email, &addr)), Ok(()));
        }

        #[test]
        fn strings_without_an_at_sign_fail(s in "[a-z0-9.]{1,20}") {
            prop_assert_eq!(
                validate(&field(true, FieldKind::Email, &s)),
                Err(FieldError::InvalidEmail)
            );
        }

        #[test]
        fn embedded_whitespace_fails(
            left in "[a-z]{1,6}",
            right in "[a-z]{1,6}",
        ) {
            let addr = format!("{} {}@studio.io", left, right);
            prop_assert_eq!(
                validate(&field(true, FieldKind::Email, &addr)),
                Err(FieldError::InvalidEmail)
            );
        }
    }
}
