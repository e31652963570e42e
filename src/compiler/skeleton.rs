use crate::error::BuildError;
use crate::model::node::display_name;
use crate::model::{Board, BoardKind, Connection, Document, ExcludedBoard, Node};
use crate::source::{ConnectionKind, ElementKind, RawBoard, RawDocument};
use ahash::AHashMap;

/// Who claimed a uuid first during the skeleton pass.
struct Owner {
    board_uuid: String,
    board_name: String,
    excluded: bool,
}

/// First pass: creates empty boards, excluded boards, nodes and connections.
///
/// Nodes get their display name right away; payloads stay empty until the resolver
/// runs. Move-on connections are not listed on boards and are left to the resolver.
struct SkeletonBuilder<'a> {
    raw: &'a RawDocument,
    doc: &'a mut Document,
    owners: AHashMap<String, Owner>,
}

pub(super) fn build(raw: &RawDocument, doc: &mut Document) -> Result<(), BuildError> {
    let boards = raw
        .boards
        .as_ref()
        .ok_or_else(|| BuildError::MissingRequiredField {
            field: "boards".to_string(),
            location: doc.location().with_field("boards"),
        })?;

    let mut builder = SkeletonBuilder {
        raw,
        doc,
        owners: AHashMap::new(),
    };
    for (board_uuid, value) in boards {
        tracing::debug!("board: {}", board_uuid);
        let location = builder.doc.location().with_entity(board_uuid);
        let raw_board = RawBoard::from_value(value).map_err(|e| BuildError::MalformedPayload {
            uuid: board_uuid.clone(),
            type_key: "boards".to_string(),
            message: e.to_string(),
            location: location.clone(),
        })?;
        let name = raw_board
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| BuildError::MissingRequiredField {
                field: "name".to_string(),
                location: location.with_field("name"),
            })?;

        if raw_board.excluded {
            tracing::debug!("Creating excluded board '{}', since marked as 'excluded'", name);
            builder.excluded_board(board_uuid, &name, &raw_board)?;
        } else {
            builder.board(board_uuid, &name, &raw_board)?;
        }
    }
    Ok(())
}

impl SkeletonBuilder<'_> {
    fn excluded_board(
        &mut self,
        uuid: &str,
        name: &str,
        raw_board: &RawBoard,
    ) -> Result<(), BuildError> {
        let mut excluded = ExcludedBoard::new(uuid, name);

        for kind in ElementKind::ALL {
            for element_uuid in self.uuid_list(uuid, name, raw_board, kind.key())? {
                self.claim(&element_uuid, uuid, name, true)?;
                excluded.element_uuids.insert(element_uuid);
            }
        }
        for kind in ConnectionKind::ALL {
            for connection_uuid in self.uuid_list(uuid, name, raw_board, kind.key())? {
                self.claim(&connection_uuid, uuid, name, true)?;
                excluded.connection_uuids.insert(connection_uuid);
            }
        }

        self.doc.excluded_boards.push(excluded);
        Ok(())
    }

    fn board(&mut self, uuid: &str, name: &str, raw_board: &RawBoard) -> Result<(), BuildError> {
        let kind = BoardKind::from_discriminator(raw_board.board_type.as_deref());
        let mut board = Board::new(uuid, name, raw_board.order, kind);
        board.content_id = raw_board.content_id.clone();
        board.info = raw_board.info.clone();

        let raw = self.raw;
        for &kind in ElementKind::ALL {
            let table = raw.table(kind.key());
            for element_uuid in self.uuid_list(uuid, name, raw_board, kind.key())? {
                tracing::debug!("    * {}: {}", kind, element_uuid);
                let location = self
                    .doc
                    .location()
                    .with_board(uuid, name)
                    .with_entity(&element_uuid);
                let payload = table.and_then(|t| t.get(&element_uuid)).ok_or_else(|| {
                    BuildError::MissingTopLevelEntry {
                        uuid: element_uuid.clone(),
                        type_key: kind.key().to_string(),
                        location: location.clone(),
                    }
                })?;
                self.claim(&element_uuid, uuid, name, false)?;

                let mut node = Node::skeleton(kind, &element_uuid, uuid);
                node.name = display_name(kind, &element_uuid, payload);
                board.elements.push(element_uuid.clone());
                self.doc.nodes.insert(element_uuid, node);
            }
        }

        for &kind in ConnectionKind::ALL {
            if !kind.is_listed_on_board() {
                continue;
            }
            for connection_uuid in self.uuid_list(uuid, name, raw_board, kind.key())? {
                tracing::debug!("    - {}: {}", kind, connection_uuid);
                self.claim(&connection_uuid, uuid, name, false)?;
                let connection = Connection::skeleton(kind, &connection_uuid, uuid);
                board.connections.push(connection_uuid.clone());
                self.doc.connections.insert(connection_uuid, connection);
            }
        }

        self.doc.boards.push(board);
        Ok(())
    }

    fn uuid_list(
        &self,
        board_uuid: &str,
        board_name: &str,
        raw_board: &RawBoard,
        key: &str,
    ) -> Result<Vec<String>, BuildError> {
        raw_board
            .uuid_list(key)
            .map(Option::unwrap_or_default)
            .map_err(|message| BuildError::MalformedPayload {
                uuid: board_uuid.to_string(),
                type_key: key.to_string(),
                message,
                location: self
                    .doc
                    .location()
                    .with_board(board_uuid, board_name)
                    .with_field(key),
            })
    }

    /// Records the board owning `uuid`. A uuid may be owned by one board only,
    /// and never by both an active and an excluded board.
    fn claim(
        &mut self,
        uuid: &str,
        board_uuid: &str,
        board_name: &str,
        excluded: bool,
    ) -> Result<(), BuildError> {
        if let Some(owner) = self.owners.get(uuid) {
            let location = self
                .doc
                .location()
                .with_board(board_uuid, board_name)
                .with_entity(uuid);
            if owner.excluded != excluded {
                let (active, excluded_name) = if owner.excluded {
                    (board_name, owner.board_name.as_str())
                } else {
                    (owner.board_name.as_str(), board_name)
                };
                return Err(BuildError::InvalidExclusionReference {
                    reference: format!(
                        "'{}' on board '{}' (also listed by excluded board '{}')",
                        uuid, active, excluded_name
                    ),
                    location,
                });
            }
            return Err(BuildError::DuplicateEntity {
                uuid: uuid.to_string(),
                first_board: owner.board_uuid.clone(),
                location,
            });
        }

        self.owners.insert(
            uuid.to_string(),
            Owner {
                board_uuid: board_uuid.to_string(),
                board_name: board_name.to_string(),
                excluded,
            },
        );
        Ok(())
    }
}
