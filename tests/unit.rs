//! Unit tests for core EmPath types.
mod common;
use empath::error::{Endpoint, Location};
use empath::model::{BoardKind, DocumentStatus};
use empath::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_location_display_only_shows_known_parts() {
    assert_eq!(Location::default().to_string(), "<unknown location>");

    let location = Location::in_file(Some("conversations/greeting.chatModule"));
    assert_eq!(location.to_string(), "file://conversations/greeting.chatModule");

    let location = location
        .with_board("b-1", "Main")
        .with_entity("n-1")
        .with_field("name");
    assert_eq!(
        location.to_string(),
        "file://conversations/greeting.chatModule, board 'Main' (b-1), uuid n-1, field 'name'"
    );
}

#[test]
fn test_error_display_includes_location() {
    let err = BuildError::DuplicateNodeName {
        name: "Greeting".to_string(),
        first_uuid: "n-1".to_string(),
        second_uuid: "n-2".to_string(),
        duplicates: 1,
        location: Location::in_file(Some("greeting.chatModule")).with_board("b-1", "Main"),
    };

    assert_eq!(
        err.to_string(),
        "Node name 'Greeting' is used by both 'n-1' and 'n-2' (1 duplicate name(s) found) (file://greeting.chatModule, board 'Main' (b-1))"
    );
    assert_eq!(err.kind(), ErrorKind::DuplicateNodeName);
    assert_eq!(err.location().and_then(|l| l.board_name.as_deref()), Some("Main"));
}

#[test]
fn test_unresolved_endpoint_display_names_the_endpoint() {
    let err = BuildError::UnresolvedConnectionEndpoint {
        uuid: "c-1".to_string(),
        endpoint: Endpoint::Destination,
        target: "n-9".to_string(),
        location: Location::default(),
    };
    assert_eq!(
        err.to_string(),
        "Connection 'c-1' has no resolved destination node 'n-9' (<unknown location>)"
    );
}

#[test]
fn test_io_errors_have_no_location() {
    let err = BuildError::Io {
        path: "missing.chatModule".to_string(),
        message: "not found".to_string(),
    };
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.location().is_none());
}

#[test]
fn test_kind_keys_round_trip() {
    for kind in ElementKind::ALL {
        assert_eq!(ElementKind::from_key(kind.key()), Some(*kind));
    }
    assert_eq!(ElementKind::from_key("moveOnOrExitElements"), Some(ElementKind::Exit));
    assert_eq!(ElementKind::from_key("unknownElements"), None);
    assert_eq!(ElementKind::Template.label(), "Template");

    assert_eq!(ConnectionKind::from_key("moveOnConnections"), Some(ConnectionKind::MoveOn));
    assert!(!ConnectionKind::MoveOn.is_listed_on_board());
    assert!(ConnectionKind::Standard.is_listed_on_board());
    assert_eq!(ConnectionKind::Standard.to_string(), "connections");
}

#[test]
fn test_exit_kind_parses_unknown_values_as_other() {
    let kind: ExitKind = serde_json::from_str("\"module\"").unwrap();
    assert_eq!(kind, ExitKind::Module);
    let kind: ExitKind = serde_json::from_str("\"somewhereElse\"").unwrap();
    assert_eq!(kind, ExitKind::Other);
    assert_eq!(ExitKind::default(), ExitKind::Conversation);
}

#[test]
fn test_document_status_defaults_to_finalized() {
    let document = common::create_simple_document().compile().unwrap();
    assert_eq!(document.status, DocumentStatus::Finalized);
    assert!(document.is_status_finalized());
    assert!(!document.is_excluded());

    let document = common::create_simple_document()
        .set("documentStatus", serde_json::json!("inDevelopment"))
        .compile()
        .unwrap();
    assert!(!document.is_status_finalized());
}

#[test]
fn test_board_kind_discriminator() {
    let document = common::create_simple_document()
        .function_board("b-fn", "Helper", 1)
        .compile()
        .unwrap();

    let board = document.board("b-fn").unwrap().board();
    assert_eq!(board.kind, BoardKind::Function);
    assert!(board.is_function_board());
    assert_eq!(board.content_id.as_deref(), Some("fn_1"));
    assert_eq!(document.board("b-main").unwrap().board().kind, BoardKind::Standard);
}

#[test]
fn test_board_info_accepts_list_or_object() {
    let document = common::create_simple_document()
        .set(
            "boards",
            serde_json::json!({
                "b-main": {
                    "name": "Main",
                    "info": [{"key": "Owner", "value": "design"}],
                    "elements": ["n-intro", "n-reply"],
                    "connections": ["c-1"]
                },
                "b-two": {"name": "Two", "order": 1, "info": {"Priority": 2}}
            }),
        )
        .compile()
        .unwrap();

    assert_eq!(document.board("b-main").unwrap().board().info.get("Owner"), Some("design"));
    assert_eq!(document.board("b-two").unwrap().board().info.get("Priority"), Some("2"));
}
