// Turning per-key required markers into required name lists

use super::{AdditionalProperties, Schema, SchemaType};

impl Schema {
    /// Children of this node that are reached through composition keywords,
    /// `items`, `not` and a schema-valued `additionalProperties`.
    fn subschemas_mut(&mut self) -> impl Iterator<Item = &mut Schema> {
        let additional = match &mut self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema.as_mut()),
            _ => None,
        };
        self.then
            .as_deref_mut()
            .into_iter()
            .chain(self.if_schema.as_deref_mut())
            .chain(self.else_schema.as_deref_mut())
            .chain(self.items.as_deref_mut())
            .chain(self.any_of.iter_mut())
            .chain(self.all_of.iter_mut())
            .chain(self.one_of.iter_mut())
            .chain(additional)
            .chain(self.not.as_deref_mut())
    }

    /// Whether a conditional or composed branch lists required names.
    fn branch_requires_names(&self) -> bool {
        let conditional = [&self.then, &self.else_schema]
            .into_iter()
            .flatten()
            .any(|s| s.required.has_names());
        let composed = self
            .any_of
            .iter()
            .chain(&self.all_of)
            .chain(&self.one_of)
            .any(|s| s.required.has_names());
        conditional || composed
    }

    /// Rewrite `required: true` markers on properties into the parent's
    /// required list, recursively.
    ///
    /// Running it twice gives the same tree. When a then/else branch or a
    /// composition member requires names, this node's own list is cleared
    /// because required-ness is then conditional.
    pub fn normalize_required(&mut self) {
        let mut marked = Vec::new();
        for (name, property) in self.properties.iter_mut() {
            let marker = property.required.take_marker();
            property.normalize_required();
            if marker == Some(true) {
                marked.push(name.clone());
            }
        }
        for name in &marked {
            self.required.push_name(name);
        }
        if !self.properties.is_empty() && !self.schema_type.matches("object") {
            self.schema_type = SchemaType::single("object");
        }

        for child in self.subschemas_mut() {
            child.normalize_required();
        }

        if self.branch_requires_names() {
            self.required.clear_names();
        }
    }

    /// Remove every required list in the tree.
    pub fn disable_required_properties(&mut self) {
        self.required = Default::default();
        for property in self.properties.values_mut() {
            property.disable_required_properties();
        }
        for property in self.pattern_properties.values_mut() {
            property.disable_required_properties();
        }
        for child in self.subschemas_mut() {
            child.disable_required_properties();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Required;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_marker_moves_to_parent() {
        let mut schema = Schema::from_yaml_str(
            "properties:\n  a:\n    required: true\n  b:\n    required: false\n  c: {}\n",
        )
        .unwrap();
        schema.normalize_required();
        assert_eq!(schema.required.names(), ["a"]);
        assert_eq!(schema.schema_type.as_slice(), ["object"]);
        assert_eq!(schema.properties["a"].required, Required::Names(vec![]));
        assert_eq!(
            schema.to_json_value().unwrap(),
            json!({
                "type": "object",
                "properties": {"a": {}, "b": {}, "c": {}},
                "required": ["a"]
            })
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut schema = Schema::from_yaml_str(
            "required: [a]\nproperties:\n  a:\n    required: true\n  b:\n    properties:\n      c:\n        required: true\n",
        )
        .unwrap();
        schema.normalize_required();
        let once = schema.clone();
        schema.normalize_required();
        assert_eq!(schema, once);
        assert_eq!(schema.required.names(), ["a"]);
        assert_eq!(schema.properties["b"].required.names(), ["c"]);
    }

    #[test]
    fn test_conditional_branch_clears_own_list() {
        let mut schema = Schema::from_yaml_str(
            r#"
properties:
  kind:
    required: true
if:
  properties:
    kind:
      const: tls
then:
  required: [cert]
"#,
        )
        .unwrap();
        schema.normalize_required();
        assert!(schema.required.names().is_empty());
        assert_eq!(schema.then.as_ref().unwrap().required.names(), ["cert"]);
    }

    #[test]
    fn test_composition_member_clears_own_list() {
        let mut schema = Schema::from_yaml_str(
            "required: [x]\nanyOf:\n  - properties:\n      y:\n        required: true\n",
        )
        .unwrap();
        schema.normalize_required();
        assert_eq!(schema.any_of[0].required.names(), ["y"]);
        assert!(schema.required.names().is_empty());
    }

    #[test]
    fn test_markers_inside_nested_subschemas() {
        let mut schema = Schema::from_yaml_str(
            r#"
required: [top]
additionalProperties:
  properties:
    a:
      required: true
not:
  properties:
    a:
      required: true
if:
  properties:
    a:
      required: true
items:
  properties:
    a:
      required: true
"#,
        )
        .unwrap();
        schema.normalize_required();

        let additional = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(s)) => s,
            other => panic!("expected a schema, got {other:?}"),
        };
        for (keyword, child) in [
            ("additionalProperties", additional.as_ref()),
            ("not", schema.not.as_deref().unwrap()),
            ("if", schema.if_schema.as_deref().unwrap()),
            ("items", schema.items.as_deref().unwrap()),
        ] {
            assert_eq!(child.required.names(), ["a"], "{keyword}");
            assert_eq!(child.schema_type.as_slice(), ["object"], "{keyword}");
            assert!(!child.properties["a"].required.has_names(), "{keyword}");
        }
        // none of these keywords make the parent's list conditional
        assert_eq!(schema.required.names(), ["top"]);
    }

    #[test]
    fn test_one_of_and_all_of_members_clear_own_list() {
        for keyword in ["oneOf", "allOf"] {
            let mut schema = Schema::from_yaml_str(&format!(
                "required: [x]\n{keyword}:\n  - properties:\n      y:\n        required: true\n  - {{}}\n"
            ))
            .unwrap();
            schema.normalize_required();
            let members = if keyword == "oneOf" {
                &schema.one_of
            } else {
                &schema.all_of
            };
            assert_eq!(members[0].required.names(), ["y"], "{keyword}");
            assert!(!members[1].required.has_names(), "{keyword}");
            assert!(schema.required.names().is_empty(), "{keyword}");
        }
    }

    #[test]
    fn test_disable_required_properties() {
        let mut schema = Schema::from_yaml_str(
            r#"
required: [a]
properties:
  a:
    required: [b]
items:
  required: [c]
oneOf:
  - required: [d]
"#,
        )
        .unwrap();
        schema.disable_required_properties();
        assert!(!schema.required.has_names());
        assert!(!schema.properties["a"].required.has_names());
        assert!(!schema.items.as_ref().unwrap().required.has_names());
        assert!(!schema.one_of[0].required.has_names());
    }
}
