use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The full automation payload handed over on stdin by the controlling
/// process: the fields to fill, the login credentials, and the site layout.
#[derive(Debug, Clone, Deserialize)]
pub struct RunInput {
    pub fields: Vec<FieldSpec>,
    pub credentials: Credentials,
    pub website_config: SiteConfig,
}

impl RunInput {
    /// Parse and validate a payload from its JSON wire form. A payload that
    /// is valid JSON but missing required keys is a configuration problem,
    /// not a parse problem.
    pub fn from_json(raw: &str) -> Result<Self> {
        let input: RunInput = serde_json::from_str(raw).map_err(|e| {
            if e.classify() == serde_json::error::Category::Data {
                Error::ConfigurationError(e.to_string())
            } else {
                Error::PayloadError(e)
            }
        })?;
        input.validate()?;
        Ok(input)
    }

    /// Reject payloads that would make the run fail in confusing ways later:
    /// blank URLs or selectors on the site, fields without a name or selector.
    pub fn validate(&self) -> Result<()> {
        self.website_config.validate()?;
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(Error::ConfigurationError(
                    "field with an empty name".into(),
                ));
            }
            if field.selector.trim().is_empty() {
                return Err(Error::ConfigurationError(format!(
                    "field '{}' has an empty selector",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

/// Where to log in, where the form lives, and which selectors address the
/// login controls. Fixed for the whole run.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
    pub login_url: String,
    pub form_url: String,
    pub username_selector: String,
    pub password_selector: String,
    pub submit_selector: String,
}

impl SiteConfig {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("url", &self.url),
            ("login_url", &self.login_url),
            ("form_url", &self.form_url),
            ("username_selector", &self.username_selector),
            ("password_selector", &self.password_selector),
            ("submit_selector", &self.submit_selector),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::ConfigurationError(format!(
                    "website_config.{key} is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Login credentials. The Debug form never shows the password, so these can
/// be logged without leaking it.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One form field to fill: where it is, what goes in, and how to put it there.
///
/// The wire form also carries controller-side extras (dropdown option lists
/// for its editing UI); unknown keys are ignored here.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub selector: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "field_type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub is_required: bool,
}

/// How a field takes its value. `SingleChoice` picks an option from a
/// `<select>`; the other two overwrite the current text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldKind {
    #[default]
    PlainText,
    MultilineText,
    SingleChoice,
}

impl FieldKind {
    /// Map a wire `field_type` string to a kind. The controller's richer
    /// vocabulary (Text, Email, Number) all types into the element the same
    /// way, so anything unrecognized lands on `PlainText`.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "Select" => FieldKind::SingleChoice,
            "Textarea" => FieldKind::MultilineText,
            _ => FieldKind::PlainText,
        }
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldKind::from_wire(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> &'static str {
        r##"{
            "fields": [
                {"name": "Project Name", "selector": "#project_name", "value": "Apollo", "field_type": "Text", "is_required": true},
                {"name": "Department", "selector": "#department", "value": "Engineering", "field_type": "Select", "is_required": false, "dropdown_options": ["Engineering", "Sales"]},
                {"name": "Description", "selector": "#description", "value": "Long text", "field_type": "Textarea", "is_required": false}
            ],
            "credentials": {"username": "jdoe", "password": "hunter2"},
            "website_config": {
                "name": "Company Portal",
                "url": "https://portal.example.com",
                "login_url": "https://portal.example.com/login",
                "form_url": "https://portal.example.com/form",
                "username_selector": "#username",
                "password_selector": "#password",
                "submit_selector": "#submit"
            }
        }"##
    }

    #[test]
    fn test_parse_full_payload() {
        let input = RunInput::from_json(payload()).expect("payload should parse");
        assert_eq!(input.fields.len(), 3);
        assert_eq!(input.fields[0].name, "Project Name");
        assert_eq!(input.fields[0].kind, FieldKind::PlainText);
        assert!(input.fields[0].is_required);
        assert_eq!(input.fields[1].kind, FieldKind::SingleChoice);
        assert_eq!(input.fields[2].kind, FieldKind::MultilineText);
        assert_eq!(input.credentials.username, "jdoe");
        assert_eq!(input.website_config.submit_selector, "#submit");
    }

    #[test]
    fn test_unknown_payload_keys_are_ignored() {
        // The second field carries dropdown_options, which only the
        // controller's editor cares about.
        let input = RunInput::from_json(payload()).expect("payload should parse");
        assert_eq!(input.fields[1].value, "Engineering");
    }

    #[test]
    fn test_field_kind_wire_mapping() {
        assert_eq!(FieldKind::from_wire("Select"), FieldKind::SingleChoice);
        assert_eq!(FieldKind::from_wire("Textarea"), FieldKind::MultilineText);
        assert_eq!(FieldKind::from_wire("Text"), FieldKind::PlainText);
        assert_eq!(FieldKind::from_wire("Email"), FieldKind::PlainText);
        assert_eq!(FieldKind::from_wire("Number"), FieldKind::PlainText);
        assert_eq!(FieldKind::from_wire("whatever"), FieldKind::PlainText);
    }

    #[test]
    fn test_missing_field_type_defaults_to_plain_text() {
        let raw = r##"{"name": "A", "selector": "#a", "value": "x", "is_required": false}"##;
        let field: FieldSpec = serde_json::from_str(raw).expect("field should parse");
        assert_eq!(field.kind, FieldKind::PlainText);
    }

    #[test]
    fn test_missing_required_key_is_rejected() {
        let raw = r#"{"fields": [], "credentials": {"username": "u", "password": "p"}}"#;
        let err = RunInput::from_json(raw).expect_err("missing website_config must fail");
        match err {
            Error::ConfigurationError(msg) => assert!(msg.contains("website_config")),
            other => panic!("Expected configuration error, got: {other}"),
        }
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = RunInput::from_json("{not json").expect_err("malformed JSON must fail");
        assert!(matches!(err, Error::PayloadError(_)));
    }

    #[test]
    fn test_blank_selector_is_rejected() {
        let raw = payload().replace("\"#username\"", "\"  \"");
        let err = RunInput::from_json(&raw).expect_err("blank selector must fail");
        match err {
            Error::ConfigurationError(msg) => assert!(msg.contains("username_selector")),
            other => panic!("Expected configuration error, got: {other}"),
        }
    }

    #[test]
    fn test_blank_field_name_is_rejected() {
        let raw = payload().replace("\"Project Name\"", "\"\"");
        let err = RunInput::from_json(&raw).expect_err("blank field name must fail");
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_debug_never_prints_password() {
        let creds = Credentials {
            username: "jdoe".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("jdoe"));
        assert!(!printed.contains("hunter2"));
    }
}
