//! Runtime validation of untrusted JSON values against a [`Schema`].
//!
//! Validation is total: it never panics and it reports every offending field
//! rather than stopping at the first one.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::field::{FieldKind, FieldSpec, Schema};

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The value being validated is not a JSON object.
    NotAnObject { found: &'static str },
    /// A required field is absent or null.
    Missing,
    /// The value has the wrong JSON type.
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
    /// Text shorter than the declared minimum (in characters).
    TooShort { min: usize, actual: usize },
    /// Text that does not parse as an absolute URL.
    NotAUrl,
    /// Text outside the declared set of values.
    NotInEnum { allowed: Vec<String> },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::NotAnObject { found } => write!(f, "expected an object, found {}", found),
            IssueKind::Missing => f.write_str("is required"),
            IssueKind::WrongKind { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            IssueKind::TooShort { min, actual } => write!(
                f,
                "must be at least {} characters (got {})",
                min, actual
            ),
            IssueKind::NotAUrl => f.write_str("must be a valid URL"),
            IssueKind::NotInEnum { allowed } => {
                write!(f, "must be one of: {}", allowed.join(", "))
            }
        }
    }
}

/// One rejected field, addressed by path (`comments[1].author`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.field, self.kind)
        }
    }
}

/// Every problem found while validating one value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Paths of all rejected fields, in discovery order.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    /// The issue reported for `field`, if any.
    pub fn issue_for(&self, field: &str) -> Option<&IssueKind> {
        self.issues
            .iter()
            .find(|i| i.field == field)
            .map(|i| &i.kind)
    }
}

/// A JSON value proven to conform to a schema.
///
/// Only [`validate`] constructs one; the prompt renderer relies on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated(Value);

impl Validated {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Field lookup on the validated object.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Check `value` against `schema`.
///
/// The value is returned untouched on success; unknown fields are tolerated
/// and kept.
pub fn validate(schema: &Schema, value: Value) -> Result<Validated, ValidationError> {
    let mut issues = Vec::new();
    match value.as_object() {
        Some(object) => check_object(schema, object, "", &mut issues),
        None => issues.push(FieldIssue {
            field: String::new(),
            kind: IssueKind::NotAnObject {
                found: json_kind(&value),
            },
        }),
    }

    if issues.is_empty() {
        Ok(Validated(value))
    } else {
        Err(ValidationError { issues })
    }
}

fn check_object(
    schema: &Schema,
    object: &Map<String, Value>,
    prefix: &str,
    issues: &mut Vec<FieldIssue>,
) {
    for spec in schema.fields() {
        let path = format!("{}{}", prefix, spec.name);
        match object.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    issues.push(FieldIssue {
                        field: path,
                        kind: IssueKind::Missing,
                    });
                }
            }
            Some(value) => check_field(spec, value, path, issues),
        }
    }
}

fn check_field(spec: &FieldSpec, value: &Value, path: String, issues: &mut Vec<FieldIssue>) {
    match &spec.kind {
        FieldKind::Text => match value.as_str() {
            Some(text) => check_text(spec, text, path, issues),
            None => issues.push(wrong_kind(path, "text", value)),
        },
        FieldKind::Enum { values } => match value.as_str() {
            Some(text) if values.iter().any(|v| v == text) => {}
            Some(_) => issues.push(FieldIssue {
                field: path,
                kind: IssueKind::NotInEnum {
                    allowed: values.clone(),
                },
            }),
            None => issues.push(wrong_kind(path, "text", value)),
        },
        FieldKind::TextList => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        issues.push(wrong_kind(format!("{}[{}]", path, i), "text", item));
                    }
                }
            }
            None => issues.push(wrong_kind(path, "list", value)),
        },
        FieldKind::RecordList { fields } => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    match item.as_object() {
                        Some(record) => {
                            check_object(fields, record, &format!("{}.", item_path), issues)
                        }
                        None => issues.push(wrong_kind(item_path, "object", item)),
                    }
                }
            }
            None => issues.push(wrong_kind(path, "list", value)),
        },
    }
}

fn check_text(spec: &FieldSpec, text: &str, path: String, issues: &mut Vec<FieldIssue>) {
    if let Some(min) = spec.constraints.min_length {
        let actual = text.chars().count();
        if actual < min {
            issues.push(FieldIssue {
                field: path.clone(),
                kind: IssueKind::TooShort { min, actual },
            });
        }
    }
    if spec.constraints.url && Url::parse(text).is_err() {
        issues.push(FieldIssue {
            field: path,
            kind: IssueKind::NotAUrl,
        });
    }
}

fn wrong_kind(field: String, expected: &'static str, found: &Value) -> FieldIssue {
    FieldIssue {
        field,
        kind: IssueKind::WrongKind {
            expected,
            found: json_kind(found),
        },
    }
}

/// JSON type name of a value, for messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::define_schema;
    use serde_json::json;

    fn comments_schema() -> Schema {
        define_schema([
            FieldSpec::text("videoUrl", "The URL of the YouTube video to analyze.").url(),
            FieldSpec::record_list(
                "comments",
                "Array of user comments from the YouTube video.",
                define_schema([FieldSpec::text("author", ""), FieldSpec::text("text", "")]),
            ),
        ])
    }

    #[test]
    fn test_valid_value_passes_through_unchanged() {
        let value = json!({
            "videoUrl": "https://youtube.com/watch?v=abc",
            "comments": [{"author": "user", "text": "Great video"}],
            "extra": 42,
        });
        let validated = validate(&comments_schema(), value.clone()).unwrap();
        assert_eq!(validated.as_value(), &value);
    }

    #[test]
    fn test_reports_every_issue() {
        let value = json!({
            "videoUrl": "not-a-url",
            "comments": [{"author": "user"}, "oops", {"author": 3, "text": "x"}],
        });
        let err = validate(&comments_schema(), value).unwrap_err();
        assert_eq!(
            err.fields(),
            vec![
                "videoUrl",
                "comments[0].text",
                "comments[1]",
                "comments[2].author"
            ]
        );
        assert_eq!(err.issue_for("videoUrl"), Some(&IssueKind::NotAUrl));
        assert_eq!(err.issue_for("comments[0].text"), Some(&IssueKind::Missing));
        assert_eq!(
            err.issue_for("comments[1]"),
            Some(&IssueKind::WrongKind {
                expected: "object",
                found: "string"
            })
        );
    }

    #[test]
    fn test_missing_and_null_are_equivalent() {
        let schema = define_schema([FieldSpec::text("summary", "")]);
        let missing = validate(&schema, json!({})).unwrap_err();
        let null = validate(&schema, json!({"summary": null})).unwrap_err();
        assert_eq!(missing, null);
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let schema = define_schema([FieldSpec::text("note", "").optional()]);
        assert!(validate(&schema, json!({})).is_ok());
        assert!(validate(&schema, json!({"note": null})).is_ok());
        assert!(validate(&schema, json!({"note": 1})).is_err());
    }

    #[test]
    fn test_min_length_counts_characters() {
        let schema = define_schema([FieldSpec::text("videoScript", "").min_length(5)]);
        assert!(validate(&schema, json!({"videoScript": "ééééé"})).is_ok());
        let err = validate(&schema, json!({"videoScript": "shrt"})).unwrap_err();
        assert_eq!(
            err.issue_for("videoScript"),
            Some(&IssueKind::TooShort { min: 5, actual: 4 })
        );
    }

    #[test]
    fn test_text_list_elements() {
        let schema = define_schema([FieldSpec::text_list("sources", "")]);
        assert!(validate(&schema, json!({"sources": []})).is_ok());
        let err = validate(&schema, json!({"sources": ["Reuters", 7]})).unwrap_err();
        assert_eq!(err.fields(), vec!["sources[1]"]);
        let err = validate(&schema, json!({"sources": "Reuters"})).unwrap_err();
        assert_eq!(
            err.issue_for("sources"),
            Some(&IssueKind::WrongKind {
                expected: "list",
                found: "string"
            })
        );
    }

    #[test]
    fn test_enum_membership() {
        let schema = define_schema([FieldSpec::one_of("tone", "", ["positive", "negative"])]);
        assert!(validate(&schema, json!({"tone": "positive"})).is_ok());
        let err = validate(&schema, json!({"tone": "meh"})).unwrap_err();
        assert!(err.to_string().contains("must be one of: positive, negative"));
    }

    #[test]
    fn test_non_object_root() {
        let schema = define_schema([FieldSpec::text("summary", "")]);
        let err = validate(&schema, json!("just text")).unwrap_err();
        assert_eq!(
            err.issues[0].kind,
            IssueKind::NotAnObject { found: "string" }
        );
        assert_eq!(err.to_string(), "expected an object, found string");
    }
}
