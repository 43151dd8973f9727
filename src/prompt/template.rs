//! Prompt templates: parsing text into segments and checking them against
//! the input schema they will be rendered with.
//!
//! Syntax:
//!
//! - `{field}` substitutes a text field;
//! - `{field|join:SEP}` joins a list of text with `SEP`;
//! - `{#each field}BODY{/each}` renders `BODY` once per list element, one
//!   line per element. Inside `BODY`, `{sub}` addresses a sub-field of a
//!   record element and `{this}` the element of a list of text.
//!
//! Any other brace (JSON snippets, `{ }`) is kept as literal text.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{FieldKind, Schema};

/// Name that addresses the current element of a list of text.
pub const THIS: &str = "this";

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\{(?:#each\s+(?P<each>[A-Za-z_][A-Za-z0-9_]*)|(?P<end>/each)|(?P<field>[A-Za-z_][A-Za-z0-9_]*)(?:\|join:(?P<sep>[^}]*))?)\}",
    )
    .expect("token pattern is valid")
});

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text passed through verbatim.
    Literal(String),
    /// The text form of one field.
    Field(String),
    /// A list of text joined with a separator.
    Join { field: String, separator: String },
    /// One rendered `body` per list element, separated by newlines.
    Each { field: String, body: Vec<Segment> },
}

/// Errors from parsing a template or checking it against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("`{{#each {field}}}` is never closed")]
    UnclosedEach { field: String },

    #[error("`{{/each}}` at byte {offset} has no matching `{{#each}}`")]
    StrayEnd { offset: usize },

    #[error("template references `{field}`, which the input schema does not declare")]
    UnknownField { field: String },

    #[error("`{{{field}}}` substitutes a single value but the field is {kind}")]
    NotText { field: String, kind: String },

    #[error("`{{{field}|join:...}}` requires a list of text, but the field is {kind}")]
    NotJoinable { field: String, kind: String },

    #[error("`{{#each {field}}}` requires a list field, but the field is {kind}")]
    NotIterable { field: String, kind: String },

    #[error("`{{this}}` is only meaningful inside `{{#each}}` over a list of text")]
    MisplacedThis,
}

/// A parsed prompt template.
///
/// Serializes as its source text so capability definitions can carry the
/// template inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateSpec {
    source: String,
    segments: Vec<Segment>,
}

impl TemplateSpec {
    /// Parse template text into segments.
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let segments = parse_segments(&source)?;
        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Verify every reference resolves in `schema` with a compatible kind.
    ///
    /// A template that passes this check renders without failure for any
    /// request validated against the same schema.
    pub fn check(&self, schema: &Schema) -> Result<(), TemplateError> {
        check_segments(&self.segments, Scope::Record(schema))
    }

    /// Top-level field names referenced by the template, in order of first use.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            let name = match segment {
                Segment::Literal(_) => continue,
                Segment::Field(field)
                | Segment::Join { field, .. }
                | Segment::Each { field, .. } => field.as_str(),
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl TryFrom<String> for TemplateSpec {
    type Error = TemplateError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(source)
    }
}

impl From<TemplateSpec> for String {
    fn from(template: TemplateSpec) -> Self {
        template.source
    }
}

impl fmt::Display for TemplateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(source: &str) -> Result<Vec<Segment>, TemplateError> {
    // Stack of open blocks: (field, segments collected so far). The bottom
    // entry is the template root.
    let mut stack: Vec<(Option<String>, Vec<Segment>)> = vec![(None, Vec::new())];
    let mut cursor = 0;

    for caps in TOKEN_PATTERN.captures_iter(source) {
        let whole = caps.get(0).expect("group 0 always matches");
        if whole.start() > cursor {
            push_literal(&mut stack, &source[cursor..whole.start()]);
        }
        cursor = whole.end();

        if let Some(field) = caps.name("each") {
            stack.push((Some(field.as_str().to_string()), Vec::new()));
        } else if caps.name("end").is_some() {
            if stack.len() == 1 {
                return Err(TemplateError::StrayEnd {
                    offset: whole.start(),
                });
            }
            let (field, body) = stack.pop().expect("stack holds an open block");
            let field = field.expect("only the root has no field");
            current(&mut stack).push(Segment::Each { field, body });
        } else if let Some(field) = caps.name("field") {
            let field = field.as_str().to_string();
            let segment = match caps.name("sep") {
                Some(sep) => Segment::Join {
                    field,
                    separator: sep.as_str().to_string(),
                },
                None => Segment::Field(field),
            };
            current(&mut stack).push(segment);
        }
    }

    if cursor < source.len() {
        push_literal(&mut stack, &source[cursor..]);
    }

    if stack.len() > 1 {
        let (field, _) = stack.pop().expect("stack holds an open block");
        return Err(TemplateError::UnclosedEach {
            field: field.unwrap_or_default(),
        });
    }

    Ok(stack.pop().map(|(_, segments)| segments).unwrap_or_default())
}

fn current(stack: &mut [(Option<String>, Vec<Segment>)]) -> &mut Vec<Segment> {
    &mut stack.last_mut().expect("root block is never popped").1
}

fn push_literal(stack: &mut [(Option<String>, Vec<Segment>)], text: &str) {
    let segments = current(stack);
    if let Some(Segment::Literal(prev)) = segments.last_mut() {
        prev.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}

#[derive(Clone, Copy)]
enum Scope<'a> {
    Record(&'a Schema),
    TextItem,
}

fn check_segments(segments: &[Segment], scope: Scope<'_>) -> Result<(), TemplateError> {
    for segment in segments {
        match segment {
            Segment::Literal(_) => {}
            Segment::Field(field) => match resolve(field, scope)? {
                None | Some(FieldKind::Text) | Some(FieldKind::Enum { .. }) => {}
                Some(kind) => {
                    return Err(TemplateError::NotText {
                        field: field.clone(),
                        kind: kind.label().to_string(),
                    })
                }
            },
            Segment::Join { field, .. } => match resolve(field, scope)? {
                Some(FieldKind::TextList) => {}
                other => {
                    return Err(TemplateError::NotJoinable {
                        field: field.clone(),
                        kind: other.map_or("a list element", FieldKind::label).to_string(),
                    })
                }
            },
            Segment::Each { field, body } => match resolve(field, scope)? {
                Some(FieldKind::TextList) => check_segments(body, Scope::TextItem)?,
                Some(FieldKind::RecordList { fields }) => {
                    check_segments(body, Scope::Record(fields))?
                }
                other => {
                    return Err(TemplateError::NotIterable {
                        field: field.clone(),
                        kind: other.map_or("a list element", FieldKind::label).to_string(),
                    })
                }
            },
        }
    }
    Ok(())
}

/// Resolve a name in scope. `Ok(None)` means `{this}` inside a text list.
fn resolve<'a>(field: &str, scope: Scope<'a>) -> Result<Option<&'a FieldKind>, TemplateError> {
    match scope {
        Scope::TextItem if field == THIS => Ok(None),
        Scope::TextItem => Err(TemplateError::UnknownField {
            field: field.to_string(),
        }),
        Scope::Record(_) if field == THIS => Err(TemplateError::MisplacedThis),
        Scope::Record(schema) => schema
            .get(field)
            .map(|spec| Some(&spec.kind))
            .ok_or_else(|| TemplateError::UnknownField {
                field: field.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{define_schema, FieldSpec};

    fn comments_schema() -> Schema {
        define_schema([
            FieldSpec::text("videoUrl", "").url(),
            FieldSpec::record_list(
                "comments",
                "",
                define_schema([FieldSpec::text("author", ""), FieldSpec::text("text", "")]),
            ),
            FieldSpec::text_list("tags", ""),
        ])
    }

    #[test]
    fn test_parse_segments() {
        let template = TemplateSpec::parse(
            "Video: {videoUrl}\n{#each comments}- {author}: {text}{/each}\nTags: {tags|join:, }",
        )
        .unwrap();

        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("Video: ".into()),
                Segment::Field("videoUrl".into()),
                Segment::Literal("\n".into()),
                Segment::Each {
                    field: "comments".into(),
                    body: vec![
                        Segment::Literal("- ".into()),
                        Segment::Field("author".into()),
                        Segment::Literal(": ".into()),
                        Segment::Field("text".into()),
                    ],
                },
                Segment::Literal("\nTags: ".into()),
                Segment::Join {
                    field: "tags".into(),
                    separator: ", ".into(),
                },
            ]
        );
        assert_eq!(template.referenced_fields(), vec!["videoUrl", "comments", "tags"]);
        template.check(&comments_schema()).unwrap();
    }

    #[test]
    fn test_non_placeholder_braces_are_literal() {
        let template = TemplateSpec::parse(r#"Answer as {"summary": "..."} for {topic}"#).unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal(r#"Answer as {"summary": "..."} for "#.into()),
                Segment::Field("topic".into()),
            ]
        );
    }

    #[test]
    fn test_unbalanced_blocks() {
        assert_eq!(
            TemplateSpec::parse("{#each comments}- {text}").unwrap_err(),
            TemplateError::UnclosedEach {
                field: "comments".into()
            }
        );
        assert_eq!(
            TemplateSpec::parse("abc{/each}").unwrap_err(),
            TemplateError::StrayEnd { offset: 3 }
        );
    }

    #[test]
    fn test_check_rejects_unknown_field() {
        let template = TemplateSpec::parse("Summarize {sources|join:, }").unwrap();
        assert_eq!(
            template.check(&comments_schema()).unwrap_err(),
            TemplateError::UnknownField {
                field: "sources".into()
            }
        );
    }

    #[test]
    fn test_check_rejects_kind_mismatch() {
        let schema = comments_schema();
        let err = TemplateSpec::parse("{comments}").unwrap().check(&schema).unwrap_err();
        assert!(matches!(err, TemplateError::NotText { .. }));

        let err = TemplateSpec::parse("{videoUrl|join:,}")
            .unwrap()
            .check(&schema)
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotJoinable { .. }));

        let err = TemplateSpec::parse("{#each videoUrl}x{/each}")
            .unwrap()
            .check(&schema)
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotIterable { .. }));
    }

    #[test]
    fn test_check_scopes_inside_each() {
        let schema = comments_schema();
        TemplateSpec::parse("{#each tags}#{this}{/each}")
            .unwrap()
            .check(&schema)
            .unwrap();

        let err = TemplateSpec::parse("{#each comments}{videoUrl}{/each}")
            .unwrap()
            .check(&schema)
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownField {
                field: "videoUrl".into()
            }
        );

        let err = TemplateSpec::parse("{this}").unwrap().check(&schema).unwrap_err();
        assert_eq!(err, TemplateError::MisplacedThis);
    }

    #[test]
    fn test_serde_as_source_text() {
        let template: TemplateSpec = serde_json::from_str(r#""Hello {name}""#).unwrap();
        assert_eq!(template.referenced_fields(), vec!["name"]);
        assert_eq!(serde_json::to_string(&template).unwrap(), r#""Hello {name}""#);
        assert!(serde_json::from_str::<TemplateSpec>(r#""{#each x}""#).is_err());
    }
}
