use super::*;

#[test]
fn render_overwrites_only_name_and_attributes() {
    let bp = Blueprint::from_json_str(
        r#"{"description": "A fine collection", "image": "ipfs://<cid>", "name": "placeholder", "attributes": ["stale"]}"#,
    )
    .unwrap();

    let doc = bp
        .render("Alpha", &[Attribute::new("bg", "red")])
        .unwrap();
    assert_eq!(
        doc,
        serde_json::json!({
            "description": "A fine collection",
            "image": "ipfs://<cid>",
            "name": "Alpha",
            "attributes": [{"trait_type": "bg", "value": "red"}]
        })
    );

    assert_eq!(bp.template()["name"], "placeholder");
}

#[test]
fn template_key_order_is_preserved() {
    let bp = Blueprint::from_json_str(r#"{"zeta": 1, "alpha": 2}"#).unwrap();
    let doc = bp.render("x", &[]).unwrap();
    let keys: Vec<&str> = doc
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["zeta", "alpha", "name", "attributes"]);
}

#[test]
fn non_object_blueprints_are_config_errors() {
    for doc in ["[]", "3", "\"x\"", "null", "{"] {
        assert!(
            matches!(
                Blueprint::from_json_str(doc),
                Err(TraitStackError::Config(_))
            ),
            "{doc}"
        );
    }
}

#[test]
fn default_blueprint_renders_name_and_attributes_only() {
    let doc = Blueprint::default().render("Solo", &[]).unwrap();
    assert_eq!(doc, serde_json::json!({"name": "Solo", "attributes": []}));
}

#[test]
fn unreadable_blueprint_file_keeps_io_context() {
    let path = std::env::temp_dir().join(format!(
        "traitstack_no_such_blueprint_{}.json",
        std::process::id()
    ));
    let err = Blueprint::from_path(&path).unwrap_err();
    assert!(matches!(err, TraitStackError::Other(_)), "{err:?}");
    assert!(err.to_string().contains("open blueprint JSON"));
}
