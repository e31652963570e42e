use super::parsing::parse_node;
use crate::error::{BuildError, Endpoint};
use crate::model::{Connection, Document};
use crate::source::{ConnectionKind, ElementKind, RawConnection, RawDocument, parse_payload};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;

/// Second pass: fills every skeleton from the document-level tables.
///
/// Connections are filled first so that nodes can pick up their incoming and
/// outgoing connection lists from the index built along the way.
struct Resolver<'a> {
    raw: &'a RawDocument,
    doc: &'a mut Document,
    excluded_elements: AHashSet<String>,
    excluded_connections: AHashSet<String>,
    incoming: AHashMap<String, Vec<String>>,
    outgoing: AHashMap<String, Vec<String>>,
}

pub(super) fn resolve(raw: &RawDocument, doc: &mut Document) -> Result<(), BuildError> {
    let excluded_elements = doc
        .excluded_boards
        .iter()
        .flat_map(|b| b.element_uuids.iter().cloned())
        .collect();
    let excluded_connections = doc
        .excluded_boards
        .iter()
        .flat_map(|b| b.connection_uuids.iter().cloned())
        .collect();

    let mut resolver = Resolver {
        raw,
        doc,
        excluded_elements,
        excluded_connections,
        incoming: AHashMap::new(),
        outgoing: AHashMap::new(),
    };
    resolver.resolve_connections()?;
    resolver.resolve_nodes()
}

impl Resolver<'_> {
    fn resolve_connections(&mut self) -> Result<(), BuildError> {
        let raw = self.raw;
        for &kind in ConnectionKind::ALL {
            let Some(table) = raw.table(kind.key()) else {
                continue;
            };

            for (uuid, payload) in table {
                if self.excluded_connections.contains(uuid) {
                    continue;
                }
                match kind {
                    ConnectionKind::MoveOn => self.fill_move_on(uuid, payload)?,
                    ConnectionKind::Standard => self.fill_standard(kind, uuid, payload)?,
                }
            }
        }
        Ok(())
    }

    /// Standard connections always live on the board they are listed under, so
    /// their endpoints are looked up on that board only.
    fn fill_standard(
        &mut self,
        kind: ConnectionKind,
        uuid: &str,
        payload: &Value,
    ) -> Result<(), BuildError> {
        let Some(board_uuid) = self
            .doc
            .connections
            .get(uuid)
            .filter(|c| c.kind == kind)
            .map(|c| c.board.clone())
        else {
            return Err(BuildError::DanglingConnectionReference {
                uuid: uuid.to_string(),
                type_key: kind.key().to_string(),
                location: self.doc.location().with_entity(uuid),
            });
        };

        let location = self.doc.board_location(&board_uuid).with_entity(uuid);
        let raw: RawConnection = parse_payload(payload, uuid, kind.key(), &location)?;
        let on_board = |node: &Option<String>| {
            node.as_ref()
                .filter(|n| {
                    self.doc
                        .nodes
                        .get(n.as_str())
                        .is_some_and(|node| node.board == board_uuid)
                })
                .cloned()
        };
        let source = on_board(&raw.source);
        let destination = on_board(&raw.destination);
        if source.is_none() || destination.is_none() {
            tracing::debug!("Connection '{}' has an endpoint outside its board", uuid);
        }

        if let Some(connection) = self.doc.connections.get_mut(uuid) {
            connection.source = source;
            connection.destination = destination;
            connection.declared_source = raw.source;
            connection.declared_destination = raw.destination;
            connection.name = raw.name;
            connection.pattern = raw.pattern;
            connection.mark_filled();
        }
        self.index(uuid);
        Ok(())
    }

    /// Move-on connections are only serialized in the document table. They are
    /// created here and handed to the board of their source node.
    fn fill_move_on(&mut self, uuid: &str, payload: &Value) -> Result<(), BuildError> {
        let kind = ConnectionKind::MoveOn;
        let location = self.doc.location().with_entity(uuid);
        let raw: RawConnection = parse_payload(payload, uuid, kind.key(), &location)?;

        let declared_source = raw.source.clone().unwrap_or_default();
        if self.excluded_elements.contains(&declared_source) {
            tracing::debug!("Skipping moveOn connection '{}' from an excluded node", uuid);
            // Owned by the excluded board of its source, like any other connection there.
            if let Some(board) = self
                .doc
                .excluded_boards
                .iter_mut()
                .find(|b| b.element_uuids.contains(&declared_source))
            {
                board.connection_uuids.insert(uuid.to_string());
            }
            return Ok(());
        }
        let Some(board_uuid) = self
            .doc
            .nodes
            .get(&declared_source)
            .map(|node| node.board.clone())
        else {
            return Err(BuildError::UnresolvedConnectionEndpoint {
                uuid: uuid.to_string(),
                endpoint: Endpoint::Source,
                target: declared_source,
                location: location.with_field("source"),
            });
        };
        if let Some(existing) = self.doc.connections.get(uuid) {
            return Err(BuildError::DuplicateEntity {
                uuid: uuid.to_string(),
                first_board: existing.board.clone(),
                location: self.doc.board_location(&board_uuid).with_entity(uuid),
            });
        }

        tracing::debug!("    Setting moveOn topic connection '{}' to source node's board", uuid);
        let mut connection = Connection::skeleton(kind, uuid, &board_uuid);
        connection.source = Some(declared_source);
        connection.destination = raw
            .destination
            .clone()
            .filter(|d| self.doc.nodes.contains_key(d.as_str()));
        connection.declared_source = raw.source;
        connection.declared_destination = raw.destination;
        connection.name = raw.name;
        connection.pattern = raw.pattern;
        connection.mark_filled();

        if let Some(board) = self.doc.boards.iter_mut().find(|b| b.uuid == board_uuid) {
            board.connections.push(uuid.to_string());
        }
        self.doc.connections.insert(uuid.to_string(), connection);
        self.index(uuid);
        Ok(())
    }

    fn index(&mut self, uuid: &str) {
        let Some(connection) = self.doc.connections.get(uuid) else {
            return;
        };
        if let Some(source) = &connection.source {
            self.outgoing
                .entry(source.clone())
                .or_default()
                .push(uuid.to_string());
        }
        if let Some(destination) = &connection.destination {
            self.incoming
                .entry(destination.clone())
                .or_default()
                .push(uuid.to_string());
        }
    }

    fn resolve_nodes(&mut self) -> Result<(), BuildError> {
        let raw = self.raw;
        for &kind in ElementKind::ALL {
            let Some(table) = raw.table(kind.key()) else {
                tracing::debug!("File does not contain this element class, skipped: {}", kind);
                continue;
            };

            for (uuid, payload) in table {
                if self.excluded_elements.contains(uuid) {
                    continue;
                }
                let Some(board_uuid) = self
                    .doc
                    .nodes
                    .get(uuid)
                    .filter(|n| n.kind == kind)
                    .map(|n| n.board.clone())
                else {
                    return Err(BuildError::DanglingElementReference {
                        uuid: uuid.to_string(),
                        type_key: kind.key().to_string(),
                        location: self.doc.location().with_entity(uuid),
                    });
                };

                let location = self.doc.board_location(&board_uuid).with_entity(uuid);
                let parsed = parse_node(kind, payload, uuid, &location)?;
                let connections_in = self.incoming.remove(uuid).unwrap_or_default();
                let connections_out = self.outgoing.remove(uuid).unwrap_or_default();

                if let Some(node) = self.doc.nodes.get_mut(uuid) {
                    tracing::debug!("    Found element '{}' ({}) in board {}", node.name, uuid, board_uuid);
                    node.text = parsed.common.text;
                    node.code = parsed.common.code;
                    node.is_intro = parsed.common.is_intro;
                    node.is_topic = parsed.common.is_topic;
                    node.tags = parsed.common.tags;
                    node.payload = Some(parsed.payload);
                    node.connections_in = connections_in;
                    node.connections_out = connections_out;
                }
            }
        }
        Ok(())
    }
}
