//! Deterministic prompt rendering.

use serde_json::Value;

use super::template::{Segment, TemplateSpec, THIS};
use crate::schema::Validated;

/// Bind a validated request into `template`, producing the exact prompt text.
///
/// The template must have passed [`TemplateSpec::check`] against the schema
/// `request` was validated with. Under that precondition rendering cannot
/// fail; a reference that still does not resolve is a catalog defect and
/// panics.
pub fn render(template: &TemplateSpec, request: &Validated) -> String {
    let mut out = String::new();
    render_segments(template.segments(), request.as_value(), &mut out);
    out
}

fn render_segments(segments: &[Segment], scope: &Value, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Field(field) => push_text(out, lookup(scope, field)),
            Segment::Join { field, separator } => {
                let items = list(scope, field);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(separator);
                    }
                    push_text(out, Some(item));
                }
            }
            Segment::Each { field, body } => {
                let items = list(scope, field);
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    render_segments(body, item, out);
                }
            }
        }
    }
}

fn lookup<'a>(scope: &'a Value, field: &str) -> Option<&'a Value> {
    if field == THIS && !scope.is_object() {
        return Some(scope);
    }
    match scope {
        Value::Object(map) => map.get(field),
        _ => panic!(
            "template references `{}` on a {} value; the capability's template was not checked against its schema",
            field,
            crate::schema::json_kind(scope)
        ),
    }
}

fn list<'a>(scope: &'a Value, field: &str) -> &'a [Value] {
    match lookup(scope, field) {
        Some(Value::Array(items)) => items.as_slice(),
        None | Some(Value::Null) => &[],
        Some(other) => panic!(
            "template iterates `{}` but the request holds a {}; the capability's template was not checked against its schema",
            field,
            crate::schema::json_kind(other)
        ),
    }
}

fn push_text(out: &mut String, value: Option<&Value>) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) => out.push_str(text),
        Some(other) => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{define_schema, validate, FieldSpec, Schema};
    use serde_json::json;

    fn schema() -> Schema {
        define_schema([
            FieldSpec::text("videoUrl", "").url(),
            FieldSpec::record_list(
                "comments",
                "",
                define_schema([FieldSpec::text("author", ""), FieldSpec::text("text", "")]),
            ),
            FieldSpec::text_list("sources", ""),
            FieldSpec::text("note", "").optional(),
        ])
    }

    fn render_with(source: &str, request: Value) -> String {
        let schema = schema();
        let template = TemplateSpec::parse(source).unwrap();
        template.check(&schema).unwrap();
        render(&template, &validate(&schema, request).unwrap())
    }

    fn request() -> Value {
        json!({
            "videoUrl": "https://youtu.be/x",
            "comments": [
                {"author": "ana", "text": "Loved it"},
                {"author": "ben", "text": "Too long"},
            ],
            "sources": ["Reuters", "Bloomberg"],
        })
    }

    #[test]
    fn test_join_uses_separator_between_elements_only() {
        let prompt = render_with("News Sources: {sources|join:, }", request());
        assert_eq!(prompt, "News Sources: Reuters, Bloomberg");
    }

    #[test]
    fn test_each_emits_one_line_per_element() {
        let prompt = render_with(
            "Comments from {videoUrl}:\n{#each comments}- Author: {author}, Comment: {text}{/each}\nEnd",
            request(),
        );
        assert_eq!(
            prompt,
            "Comments from https://youtu.be/x:\n- Author: ana, Comment: Loved it\n- Author: ben, Comment: Too long\nEnd"
        );
    }

    #[test]
    fn test_each_over_text_list() {
        let prompt = render_with("{#each sources}* {this}{/each}", request());
        assert_eq!(prompt, "* Reuters\n* Bloomberg");
    }

    #[test]
    fn test_empty_lists_and_absent_optional_render_nothing() {
        let prompt = render_with(
            "[{sources|join:, }][{#each comments}{text}{/each}][{note}]",
            json!({"videoUrl": "https://a.b", "comments": [], "sources": []}),
        );
        assert_eq!(prompt, "[][][]");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let source = "{videoUrl} {sources|join: / }";
        assert_eq!(render_with(source, request()), render_with(source, request()));
    }
}
