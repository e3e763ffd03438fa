//! Integration test: parse a realistic chart values file.

use pretty_assertions::assert_eq;
use serde_json::json;
use values_yaml::{parse_file, tags};

const VALUES: &str = r#"# Default values for demo.
# This is a YAML-formatted file.

# -- number of replicas
replicaCount: 3

image:
  # @schema
  # pattern: ^[a-z/]+$
  # @schema
  repository: nginx
  # -- Overrides the image tag.
  tag: ""
  pullPolicy: IfNotPresent

ports:
  - 80
  - "443"

resources: {}
nodeSelector: ~
createdAt: 2024-01-31
ratio: 0.5
"#;

#[test]
fn test_values_file_shape_and_tags() {
    let root = parse_file(VALUES, "values.yaml").unwrap();
    assert!(root.is_mapping());
    assert_eq!(root.len(), 7);

    assert_eq!(root.get("replicaCount").unwrap().tag, tags::INT);
    assert_eq!(root.get("image").unwrap().tag, tags::MAP);
    assert_eq!(root.get("resources").unwrap().tag, tags::MAP);
    assert_eq!(root.get("nodeSelector").unwrap().tag, tags::NULL);
    assert_eq!(root.get("createdAt").unwrap().tag, tags::TIMESTAMP);
    assert_eq!(root.get("ratio").unwrap().tag, tags::FLOAT);

    let ports = root.get("ports").unwrap().as_sequence().unwrap();
    assert_eq!(ports[0].tag, tags::INT);
    assert_eq!(ports[1].tag, tags::STR);

    let tag = root.get("image").unwrap().get("tag").unwrap();
    assert_eq!(tag.tag, tags::STR);
    assert_eq!(tag.as_scalar(), Some(""));
}

#[test]
fn test_values_file_comments() {
    let root = parse_file(VALUES, "values.yaml").unwrap();

    assert_eq!(
        root.get_entry("replicaCount").unwrap().head_comment,
        "# Default values for demo.\n# This is a YAML-formatted file.\n\n# -- number of replicas"
    );

    let image = root.get("image").unwrap();
    assert_eq!(
        image.get_entry("repository").unwrap().head_comment,
        "# @schema\n# pattern: ^[a-z/]+$\n# @schema"
    );
    assert_eq!(
        image.get_entry("tag").unwrap().head_comment,
        "# -- Overrides the image tag."
    );
    assert_eq!(image.get_entry("pullPolicy").unwrap().head_comment, "");
}

#[test]
fn test_values_file_to_json() {
    let root = parse_file(VALUES, "values.yaml").unwrap();
    assert_eq!(
        root.to_json(),
        json!({
            "replicaCount": 3,
            "image": {"repository": "nginx", "tag": "", "pullPolicy": "IfNotPresent"},
            "ports": [80, "443"],
            "resources": {},
            "nodeSelector": null,
            "createdAt": "2024-01-31",
            "ratio": 0.5
        })
    );
}
