//! Common test utilities for building EmPath documents.
use empath::prelude::*;
use serde_json::{Value, json};

/// Incrementally builds the JSON of an EmPath document.
///
/// Every element or connection added to a board is written both to the board's
/// uuid list and to the matching document-level table, like the editor does.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct DocumentFixture {
    value: Value,
}

#[allow(dead_code)]
impl DocumentFixture {
    pub fn new(name: &str) -> Self {
        Self {
            value: json!({
                "name": name,
                "version": 3,
                "conversationID": "greeting_intro",
                "indices": "",
                "docInfo": [],
                "boards": {}
            }),
        }
    }

    /// Sets or replaces a top-level key.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.value[key] = value;
        self
    }

    /// Removes a top-level key.
    pub fn without(mut self, key: &str) -> Self {
        if let Some(object) = self.value.as_object_mut() {
            object.remove(key);
        }
        self
    }

    pub fn info(mut self, key: &str, value: &str) -> Self {
        self.value["docInfo"]
            .as_array_mut()
            .unwrap()
            .push(json!({"key": key, "value": value}));
        self
    }

    pub fn explicit_exits(self) -> Self {
        self.info("ConvertedToExplicitExits", "Yes")
    }

    pub fn board(mut self, uuid: &str, name: &str, order: i64) -> Self {
        self.value["boards"][uuid] = json!({"name": name, "order": order});
        self
    }

    pub fn excluded_board(mut self, uuid: &str, name: &str) -> Self {
        self.value["boards"][uuid] = json!({"name": name, "excluded": true});
        self
    }

    pub fn function_board(mut self, uuid: &str, name: &str, order: i64) -> Self {
        self.value["boards"][uuid] =
            json!({"name": name, "order": order, "boardType": "function", "contentId": "fn_1"});
        self
    }

    /// Lists `uuid` under `key` on a board without adding a table entry.
    pub fn list(mut self, board: &str, key: &str, uuid: &str) -> Self {
        let list = &mut self.value["boards"][board][key];
        if list.is_null() {
            *list = json!([]);
        }
        list.as_array_mut().unwrap().push(json!(uuid));
        self
    }

    /// Adds a table entry without listing it on any board.
    pub fn entry(mut self, key: &str, uuid: &str, payload: Value) -> Self {
        self.value[key][uuid] = payload;
        self
    }

    pub fn element(self, board: &str, key: &str, uuid: &str, payload: Value) -> Self {
        self.list(board, key, uuid).entry(key, uuid, payload)
    }

    pub fn node(self, board: &str, uuid: &str, name: &str) -> Self {
        self.element(board, "elements", uuid, json!({"name": name}))
    }

    pub fn intro(self, board: &str, uuid: &str, name: &str) -> Self {
        self.element(board, "elements", uuid, json!({"name": name, "isIntro": true}))
    }

    pub fn exit(self, board: &str, uuid: &str, name: &str, exit_type: &str) -> Self {
        self.element(
            board,
            "moveOnOrExitElements",
            uuid,
            json!({"name": name, "exitType": exit_type}),
        )
    }

    pub fn connection(self, board: &str, uuid: &str, source: &str, destination: &str) -> Self {
        self.element(
            board,
            "connections",
            uuid,
            json!({"source": source, "destination": destination}),
        )
    }

    /// Move-on connections only live in the document-level table.
    pub fn move_on(self, uuid: &str, source: &str, destination: &str, name: &str) -> Self {
        self.entry(
            "moveOnConnections",
            uuid,
            json!({"source": source, "destination": destination, "name": name}),
        )
    }

    pub fn to_json(&self) -> String {
        self.value.to_string()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn builder(&self) -> CompilerBuilder {
        Compiler::from_json_str(&self.to_json()).expect("fixture JSON should parse")
    }

    pub fn compile(&self) -> std::result::Result<Document, BuildError> {
        self.builder().build().compile()
    }
}

/// A single board whose intro greets the user and leads to one reply.
#[allow(dead_code)]
pub fn create_simple_document() -> DocumentFixture {
    DocumentFixture::new("Greeting")
        .board("b-main", "Main", 0)
        .intro("b-main", "n-intro", "Hello")
        .node("b-main", "n-reply", "Reply")
        .connection("b-main", "c-1", "n-intro", "n-reply")
}

/// Three active boards declared out of order, one excluded board and a move-on
/// connection crossing from the first board to the second.
///
/// Board orders: `b-late` 2, `b-start` 0, `b-topics` 1, `b-draft` excluded.
#[allow(dead_code)]
pub fn create_multi_board_document() -> DocumentFixture {
    DocumentFixture::new("Greeting")
        .board("b-late", "Late", 2)
        .board("b-start", "Start", 0)
        .board("b-topics", "Topics", 1)
        .excluded_board("b-draft", "Draft")
        // Start board: intro, a question and an exit.
        .intro("b-start", "n-hello", "Hello")
        .node("b-start", "n-ask", "Ask name")
        .exit("b-start", "n-bye", "Bye", "conversation")
        .connection("b-start", "c-hello-ask", "n-hello", "n-ask")
        .connection("b-start", "c-ask-bye", "n-ask", "n-bye")
        .element(
            "b-start",
            "templateElements",
            "n-tpl",
            json!({"name": "Weather", "templateUuid": "tpl-weather"}),
        )
        // Topics board: no intro, reached by the move-on connection.
        .node("b-topics", "n-topic", "Hobbies")
        .node("b-topics", "n-answer", "Answer")
        .connection("b-topics", "c-topic-answer", "n-topic", "n-answer")
        .element(
            "b-topics",
            "flexibleElements",
            "n-flex",
            json!({"name": "Choice", "subtype": "multipleChoice", "subtypeData": {"options": 2}}),
        )
        // Late board: its own intro and a board exit.
        .intro("b-late", "n-late", "Later")
        .exit("b-late", "n-late-exit", "Done", "board")
        .connection("b-late", "c-late", "n-late", "n-late-exit")
        // Excluded board content still appears in the document tables.
        .element("b-draft", "elements", "n-draft", json!({"name": "Draft node"}))
        .element(
            "b-draft",
            "connections",
            "c-draft",
            json!({"source": "n-draft", "destination": "n-hello"}),
        )
        .move_on("m-hobbies", "n-ask", "n-topic", "talk about hobbies")
}
