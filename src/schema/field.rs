//! Field declarations: kinds, constraints, and the ordered `Schema` container.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The primitive kind a field's value must have.
///
/// Serialized with a `type` tag so YAML definitions read naturally:
///
/// ```yaml
/// - name: comments
///   type: record_list
///   fields:
///     - { name: author, type: text }
///     - { name: text, type: text }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// A single string.
    Text,
    /// An array of strings.
    TextList,
    /// An array of objects, each conforming to the nested schema.
    RecordList { fields: Schema },
    /// A string restricted to a fixed set of values.
    Enum { values: Vec<String> },
}

impl FieldKind {
    /// Short name used in validation messages and JSON-schema export.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::TextList => "list of text",
            FieldKind::RecordList { .. } => "list of records",
            FieldKind::Enum { .. } => "enumerated text",
        }
    }

    /// Keys this kind reads from a field declaration besides `type`.
    fn own_keys(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Text | FieldKind::TextList => &[],
            FieldKind::RecordList { .. } => &["fields"],
            FieldKind::Enum { .. } => &["values"],
        }
    }

    /// Whether values of this kind are arrays.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::TextList | FieldKind::RecordList { .. })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Runtime constraints on text values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// Minimum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Value must parse as an absolute URL.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub url: bool,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none() && !self.url
    }
}

/// One named field of a schema.
///
/// Declarations with a key the field does not understand (a misspelt
/// `min_length`, say) are rejected rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldSpec")]
pub struct FieldSpec {
    /// Field name as it appears in the JSON object.
    pub name: String,

    #[serde(flatten)]
    pub kind: FieldKind,

    /// Free-text description. Sent to the model as guidance, never enforced.
    pub description: String,

    pub required: bool,

    #[serde(flatten)]
    pub constraints: Constraints,
}

/// Wire form of [`FieldSpec`]; `rest` collects every key nothing else took.
#[derive(Deserialize)]
struct RawFieldSpec {
    name: String,
    #[serde(flatten)]
    kind: FieldKind,
    #[serde(default)]
    description: String,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(flatten)]
    constraints: Constraints,
    #[serde(flatten)]
    rest: BTreeMap<String, serde::de::IgnoredAny>,
}

fn default_required() -> bool {
    true
}

impl TryFrom<RawFieldSpec> for FieldSpec {
    type Error = String;

    fn try_from(raw: RawFieldSpec) -> Result<Self, Self::Error> {
        let own = raw.kind.own_keys();
        if let Some(key) = raw
            .rest
            .keys()
            .find(|key| key.as_str() != "type" && !own.contains(&key.as_str()))
        {
            return Err(format!("unknown key `{}` in field `{}`", key, raw.name));
        }
        Ok(Self {
            name: raw.name,
            kind: raw.kind,
            description: raw.description,
            required: raw.required,
            constraints: raw.constraints,
        })
    }
}

impl FieldSpec {
    fn with_kind(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            constraints: Constraints::default(),
        }
    }

    /// A required text field.
    pub fn text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Text, description)
    }

    /// A required list-of-text field.
    pub fn text_list(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::TextList, description)
    }

    /// A required list of records, each shaped by `fields`.
    pub fn record_list(
        name: impl Into<String>,
        description: impl Into<String>,
        fields: Schema,
    ) -> Self {
        Self::with_kind(name, FieldKind::RecordList { fields }, description)
    }

    /// A required text field restricted to `values`.
    pub fn one_of<I, S>(name: impl Into<String>, description: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::with_kind(name, FieldKind::Enum { values }, description)
    }

    /// Require at least `min` characters.
    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    /// Require a syntactically valid absolute URL.
    pub fn url(mut self) -> Self {
        self.constraints.url = true;
        self
    }

    /// Allow the field to be absent or null.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// An ordered set of field declarations describing one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declaration.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names declared more than once, at any nesting depth.
    ///
    /// Nested names are reported as `parent.child`.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for spec in &self.fields {
            if !seen.insert(spec.name.as_str()) {
                duplicates.push(spec.name.clone());
            }
            if let FieldKind::RecordList { fields } = &spec.kind {
                duplicates.extend(
                    fields
                        .duplicate_names()
                        .into_iter()
                        .map(|nested| format!("{}.{}", spec.name, nested)),
                );
            }
        }
        duplicates
    }
}

/// Build a schema from field specs, in order.
///
/// ```
/// use content_ops::schema::{define_schema, FieldSpec};
///
/// let schema = define_schema([
///     FieldSpec::text("youtubeVideoUrl", "The URL of the YouTube video to analyze.").url(),
/// ]);
/// assert!(schema.get("youtubeVideoUrl").is_some());
/// ```
pub fn define_schema(fields: impl IntoIterator<Item = FieldSpec>) -> Schema {
    fields.into_iter().fold(Schema::new(), Schema::field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_required() {
        let spec = FieldSpec::text("summary", "A summary");
        assert!(spec.required);
        assert!(spec.constraints.is_empty());
        assert!(!spec.clone().optional().required);
    }

    #[test]
    fn test_parse_schema_yaml() {
        let yaml = r#"
- name: videoUrl
  type: text
  description: "The URL of the YouTube video to analyze."
  url: true
- name: comments
  type: record_list
  fields:
    - { name: author, type: text }
    - { name: text, type: text, min_length: 1 }
- name: tone
  type: enum
  values: [positive, negative, neutral]
  required: false
"#;
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.len(), 3);

        let url = schema.get("videoUrl").unwrap();
        assert_eq!(url.kind, FieldKind::Text);
        assert!(url.constraints.url);
        assert!(url.required);

        let comments = schema.get("comments").unwrap();
        match &comments.kind {
            FieldKind::RecordList { fields } => {
                assert_eq!(fields.get("text").unwrap().constraints.min_length, Some(1));
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let tone = schema.get("tone").unwrap();
        assert!(!tone.required);
        assert_eq!(
            tone.kind,
            FieldKind::Enum {
                values: vec!["positive".into(), "negative".into(), "neutral".into()]
            }
        );
    }

    #[test]
    fn test_duplicate_names_nested() {
        let schema = define_schema([
            FieldSpec::text("a", ""),
            FieldSpec::text("a", ""),
            FieldSpec::record_list(
                "rows",
                "",
                define_schema([FieldSpec::text("x", ""), FieldSpec::text("x", "")]),
            ),
        ]);
        assert_eq!(schema.duplicate_names(), vec!["a", "rows.x"]);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = serde_yaml::from_str::<Schema>(
            "- { name: videoScript, type: text, min_lenght: 50 }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown key `min_lenght` in field `videoScript`"));

        let err = serde_yaml::from_str::<Schema>("- { name: videoUrl, type: text, ur1: true }\n")
            .unwrap_err();
        assert!(err.to_string().contains("`ur1`"));

        // A key that belongs to another kind is just as unknown.
        let err = serde_yaml::from_str::<Schema>(
            "- { name: tags, type: text_list, values: [a, b] }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown key `values` in field `tags`"));

        let err = serde_yaml::from_str::<Schema>(
            "- name: comments\n  type: record_list\n  fields:\n    - { name: text, type: text, url: true, minlength: 1 }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown key `minlength` in field `text`"));
    }
}
