use postkit_core::{CoolantMode, Param, PathNode, ToolPathDocument};

const DOCUMENT: &str = r#"{
    "name": "bracket.FCStd",
    "operations": [
        {
            "label": "Profile",
            "coolant": "Flood",
            "tool_controller": { "vertical_feed": 5.0, "horizontal_feed": 10.0, "spindle_speed": 12000 },
            "commands": [
                { "command": { "name": "M6", "params": { "T": 2 } } },
                { "group": [
                    { "command": { "name": "G0", "params": { "Z": 5.0, "X": 1.0 } } },
                    { "opaque": "Stock" },
                    { "command": { "name": "G1", "params": { "Z": -1.0, "F": 5.0 } } }
                ] }
            ]
        },
        { "label": "Fixture" },
        { "label": "Disabled", "active": false, "base": 0, "commands": [] }
    ]
}"#;

#[test]
fn test_document_from_json() {
    let doc: ToolPathDocument = serde_json::from_str(DOCUMENT).unwrap();

    assert_eq!(doc.name.as_deref(), Some("bracket.FCStd"));
    assert_eq!(doc.operations.len(), 3);

    let profile = &doc.operations[0];
    assert!(profile.active);
    assert!(!profile.block_delete);
    assert_eq!(profile.coolant, Some(CoolantMode::Flood));

    let names: Vec<&str> = profile.commands().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["M6", "G0", "G1"]);

    let rapid = profile.commands().nth(1).unwrap();
    assert_eq!(rapid.get(Param::X), Some(1.0));
    assert_eq!(rapid.get(Param::Z), Some(5.0));

    assert!(matches!(
        profile.commands.as_deref().unwrap()[1],
        PathNode::Group(_)
    ));
}

#[test]
fn test_member_without_commands_fails_validation() {
    let doc: ToolPathDocument = serde_json::from_str(DOCUMENT).unwrap();
    let err = doc.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "The object Fixture is not a path. Please select only paths and compounds."
    );
}

#[test]
fn test_unknown_parameter_letter_is_rejected() {
    let json = r#"{ "operations": [ { "label": "Bad", "commands": [
        { "command": { "name": "G1", "params": { "K": 1.0 } } }
    ] } ] }"#;
    assert!(serde_json::from_str::<ToolPathDocument>(json).is_err());
}
