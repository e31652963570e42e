//! Graphviz export of a built document.
//!
//! The output is a `digraph` with one cluster per board and a nested cluster per
//! topic cluster. Nodes are keyed by uuid, so equally named nodes on different
//! boards never merge.

use crate::model::{BoardRef, Connection, Document, Node};
use crate::source::InfoMap;
use std::fmt::{self, Write};

const MOVE_NAME_SPLIT: usize = 25;
const LABEL_LIMIT: usize = 20;

/// Node roles, each with its own shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Intro,
    Exit,
    Topic,
    Response,
    Rejoinder,
}

/// Renders `doc` as a Graphviz DOT description.
pub fn to_dot(doc: &Document) -> String {
    let mut output = String::new();
    let _ = write_dot(doc, &mut output);
    output
}

/// Writes the DOT description of `doc` into any formatter sink.
pub fn write_dot(doc: &Document, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "digraph \"{}\" {{", escape(&doc.name))?;
    write_info(out, "document_info", "DocInfo", &doc.name, &doc.info, 1)?;

    for board in doc.boards() {
        write_board(out, board)?;
    }

    writeln!(out, "}}")
}

fn write_board(out: &mut impl Write, board: BoardRef<'_>) -> fmt::Result {
    let doc = board.document();
    let clusters = board.topic_clusters();

    writeln!(out, "  subgraph \"cluster_{}\" {{", escape(board.uuid()))?;
    writeln!(out, "    label=\"{}\";", escape(board.name()))?;
    write_info(
        out,
        &format!("board_info_{}", board.uuid()),
        "BoardInfo",
        board.name(),
        &board.board().info,
        2,
    )?;

    // Boards skipped by validation have no clusters, so every node is drawn here.
    for node in board.elements() {
        if clusters.cluster_of(&node.uuid).is_some() {
            continue;
        }
        let role = if node.is_intro {
            Role::Intro
        } else if node.is_exit() {
            Role::Exit
        } else {
            Role::Topic
        };
        write_node(out, board, node, role, 2)?;
    }

    for cluster in clusters.clusters() {
        writeln!(out, "    subgraph \"cluster_{}\" {{", escape(&cluster.topic))?;
        if let Some(topic) = doc.find_node(&cluster.topic) {
            let role = if topic.is_intro { Role::Intro } else { Role::Topic };
            write_node(out, board, topic, role, 3)?;
        }
        for response in cluster.responses.iter().filter_map(|uuid| doc.find_node(uuid)) {
            write_node(out, board, response, Role::Response, 3)?;
        }
        for rejoinder in cluster.rejoinders.iter().filter_map(|uuid| doc.find_node(uuid)) {
            write_node(out, board, rejoinder, Role::Rejoinder, 3)?;
        }
        writeln!(out, "    }}")?;
    }

    for connection in board.connections() {
        match (&connection.source, &connection.destination) {
            (Some(source), Some(destination)) => writeln!(
                out,
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                escape(source),
                escape(destination),
                escape(&edge_label(connection))
            )?,
            _ => tracing::warn!(
                "Source or destination of connection '{}' on board '{}' is not resolved",
                connection.uuid,
                board.name()
            ),
        }
    }

    writeln!(out, "  }}")
}

fn write_info(
    out: &mut impl Write,
    id: &str,
    title: &str,
    name: &str,
    info: &InfoMap,
    depth: usize,
) -> fmt::Result {
    let mut label = format!("{}:\\lName: {}", title, escape(name));
    for (key, value) in info.iter() {
        label.push_str(&format!("\\l{}: {}", escape(key), escape(value)));
    }
    writeln!(
        out,
        "{}\"{}\" [label=\"{}\\l\", shape=note];",
        indent(depth),
        escape(id),
        label
    )
}

fn write_node(
    out: &mut impl Write,
    board: BoardRef<'_>,
    node: &Node,
    role: Role,
    depth: usize,
) -> fmt::Result {
    let mut label = format!(
        "{}\\n({})\\n{}",
        escape(&node.name),
        escape(board.name()),
        node.short_uuid()
    );
    if node.has_code() {
        label.push_str("\\nuses code field");
    }

    let style = match role {
        Role::Intro if node.has_code() => {
            "shape=Msquare, color=green, fillcolor=yellow, style=filled"
        }
        Role::Intro => "shape=Msquare, color=green, fillcolor=green, style=filled",
        Role::Exit => "shape=Msquare, color=orange, fillcolor=orange, style=filled",
        Role::Topic if node.has_code() => "shape=Msquare, fillcolor=yellow, style=filled",
        Role::Topic => "shape=Msquare",
        Role::Response if node.has_code() => "shape=box, fillcolor=yellow, style=filled",
        Role::Response => "shape=box",
        Role::Rejoinder => "shape=doubleoctagon",
    };

    writeln!(
        out,
        "{}\"{}\" [label=\"{}\", {}];",
        indent(depth),
        escape(&node.uuid),
        label,
        style
    )
}

/// Move names are split over two lines when long; names and patterns are truncated.
fn edge_label(connection: &Connection) -> String {
    if connection.is_move_on() {
        let name = &connection.name;
        let chars = name.chars().count();
        if chars > MOVE_NAME_SPLIT {
            let split = name
                .char_indices()
                .nth(chars.div_ceil(2))
                .map_or(name.len(), |(i, _)| i);
            return format!("move name: '{}\n{}'", &name[..split], &name[split..]);
        }
        return format!("move name: '{}'", name);
    }

    let mut parts = Vec::new();
    if !connection.name.is_empty() {
        parts.push(format!("name: '{}'", truncate(&connection.name)));
    }
    if let Some(pattern) = &connection.pattern {
        parts.push(format!("pattern: '{}'", truncate(pattern)));
    }
    parts.join("\n")
}

fn truncate(text: &str) -> String {
    text.chars().take(LABEL_LIMIT).collect()
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use serde_json::json;

    fn build() -> Document {
        let doc = json!({
            "name": "Demo", "version": 1, "conversationID": "demo_1",
            "docInfo": [{"key": "Owner", "value": "design"}],
            "boards": {
                "a": {
                    "name": "Start",
                    "elements": ["intro", "yes"],
                    "connections": ["c1"]
                },
                "b": {"name": "Next", "elements": ["topic"]}
            },
            "elements": {
                "intro": {"name": "Hello", "isIntro": true, "code": "$x = 1"},
                "yes": {"name": "Yes"},
                "topic": {"name": "Topic"}
            },
            "connections": {
                "c1": {"source": "intro", "destination": "yes", "name": "agree", "pattern": "[yes yeah sure ok fine alright]"}
            },
            "moveOnConnections": {
                "m1": {"source": "yes", "destination": "topic", "name": "a rather long move name that wraps"}
            }
        });
        Compiler::from_json_str(&doc.to_string())
            .unwrap()
            .build()
            .compile()
            .unwrap()
    }

    #[test]
    fn renders_boards_nodes_and_edges() {
        let dot = to_dot(&build());

        assert!(dot.starts_with("digraph \"Demo\" {"));
        assert!(dot.contains("subgraph \"cluster_a\""));
        assert!(dot.contains("subgraph \"cluster_intro\""));
        assert!(dot.contains("Owner: design"));
        assert!(dot.contains("\"intro\" [label=\"Hello\\n(Start)\\nntro\\nuses code field\""));
        assert!(dot.contains("\"yes\" [label=\"Yes\\n(Start)\\nyes\", shape=box]"));
        assert!(dot.contains("\"intro\" -> \"yes\" [label=\"name: 'agree'\\npattern: '[yes yeah sure ok fi'\"]"));
        assert!(dot.contains("\"topic\" [label=\"Topic\\n(Next)\\nopic\", shape=Msquare]"));
        assert!(dot.contains("\"yes\" -> \"topic\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn long_move_names_are_split() {
        let doc = build();
        let connection = doc.find_connection("m1").unwrap();
        assert_eq!(
            edge_label(connection),
            "move name: 'a rather long mov\ne name that wraps'"
        );
    }
}
