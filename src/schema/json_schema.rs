//! JSON-schema export of a [`Schema`].
//!
//! The exported document tells the model what shape to answer in and is
//! served to callers of the HTTP host so they can build forms.

use serde_json::{json, Map, Value};

use super::field::{FieldKind, FieldSpec, Schema};

impl Schema {
    /// Render as a JSON-schema `object` with `properties` and `required`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for spec in self.fields() {
            properties.insert(spec.name.clone(), field_schema(spec));
            if spec.required {
                required.push(Value::String(spec.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn field_schema(spec: &FieldSpec) -> Value {
    let mut prop = match &spec.kind {
        FieldKind::Text => json!({ "type": "string" }),
        FieldKind::TextList => json!({ "type": "array", "items": { "type": "string" } }),
        FieldKind::RecordList { fields } => json!({
            "type": "array",
            "items": fields.to_json_schema(),
        }),
        FieldKind::Enum { values } => json!({ "type": "string", "enum": values }),
    };

    if let Some(obj) = prop.as_object_mut() {
        if !spec.description.is_empty() {
            obj.insert(
                "description".to_string(),
                Value::String(spec.description.clone()),
            );
        }
        if let Some(min) = spec.constraints.min_length {
            obj.insert("minLength".to_string(), json!(min));
        }
        if spec.constraints.url {
            obj.insert("format".to_string(), json!("uri"));
        }
    }
    prop
}
