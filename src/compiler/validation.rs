use super::{BuildOptions, ExitRequirement, NameScope, topics};
use crate::error::{BuildError, Endpoint};
use crate::model::{BoardRef, Document};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

/// A name already taken within the current scope.
struct NameOwner {
    uuid: String,
    board: String,
}

/// Validates every board that has an introduction node and stores its topic clusters.
///
/// Boards are visited in their sorted order. Boards without an intro are skipped.
/// Document-wide exit kind and completion constraints run after the board loop.
pub(super) fn validate(doc: &mut Document, options: &BuildOptions) -> Result<(), BuildError> {
    let mut names: AHashMap<String, NameOwner> = AHashMap::new();

    for index in 0..doc.boards.len() {
        let clusters = {
            let board = BoardRef {
                doc: &*doc,
                board: &doc.boards[index],
            };
            if !board.has_intro() {
                tracing::debug!("Board '{}' has no intro node, skipping validation", board.name());
                continue;
            }
            tracing::debug!("Validating board '{}'", board.name());

            if options.name_scope == NameScope::Board {
                names.clear();
            }
            validate_node_names(board, &mut names)?;
            validate_connections(board)?;
            let clusters = topics::analyze(board);
            if board.document().uses_explicit_exits {
                validate_reachable_exit(board)?;
            }
            clusters
        };
        doc.boards[index].topic_clusters = clusters;
    }

    if doc.uses_explicit_exits && options.exit_requirement != ExitRequirement::Any {
        validate_exit_requirement(doc, options.exit_requirement)?;
    }
    if let Some(subtype) = &options.completion_subtype {
        validate_completion_node(doc, subtype)?;
    }
    Ok(())
}

/// Every collision on the board is logged before the first one is returned.
fn validate_node_names(
    board: BoardRef<'_>,
    names: &mut AHashMap<String, NameOwner>,
) -> Result<(), BuildError> {
    let mut first_duplicate = None;
    let mut duplicates = 0;

    for node in board.elements() {
        match names.get(&node.name) {
            Some(owner) => {
                duplicates += 1;
                tracing::error!(
                    "Duplicate node name '{}' in board '{}': '{}' (board {}) and '{}'",
                    node.name,
                    board.name(),
                    owner.uuid,
                    owner.board,
                    node.uuid
                );
                if first_duplicate.is_none() {
                    first_duplicate = Some((node.name.clone(), owner.uuid.clone(), node.uuid.clone()));
                }
            }
            None => {
                names.insert(
                    node.name.clone(),
                    NameOwner {
                        uuid: node.uuid.clone(),
                        board: board.uuid().to_string(),
                    },
                );
            }
        }
    }

    match first_duplicate {
        None => Ok(()),
        Some((name, first_uuid, second_uuid)) => Err(BuildError::DuplicateNodeName {
            name,
            first_uuid,
            location: board
                .document()
                .board_location(board.uuid())
                .with_entity(&second_uuid)
                .with_field("name"),
            second_uuid,
            duplicates,
        }),
    }
}

fn validate_connections(board: BoardRef<'_>) -> Result<(), BuildError> {
    for connection in board.connections() {
        let (endpoint, declared) = if connection.source.is_none() {
            (Endpoint::Source, &connection.declared_source)
        } else if connection.destination.is_none() {
            (Endpoint::Destination, &connection.declared_destination)
        } else {
            continue;
        };

        return Err(BuildError::UnresolvedConnectionEndpoint {
            uuid: connection.uuid.clone(),
            endpoint,
            target: declared.clone().unwrap_or_else(|| "<none>".to_string()),
            location: board
                .document()
                .board_location(board.uuid())
                .with_entity(&connection.uuid)
                .with_field(&endpoint.to_string()),
        });
    }
    Ok(())
}

/// Walks outgoing connections from every node of the board, following move-on
/// connections into other boards, until an exit node is found.
fn validate_reachable_exit(board: BoardRef<'_>) -> Result<(), BuildError> {
    let doc = board.document();
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<&str> = board.elements().map(|n| n.uuid.as_str()).collect();

    while let Some(uuid) = queue.pop_front() {
        if !visited.insert(uuid) {
            continue;
        }
        let Some(node) = doc.find_node(uuid) else {
            continue;
        };
        if node.is_exit() {
            tracing::debug!("Board '{}' reaches exit node '{}'", board.name(), node.name);
            return Ok(());
        }
        queue.extend(
            node.connections_out
                .iter()
                .filter_map(|c| doc.find_connection(c))
                .filter_map(|c| c.destination.as_deref()),
        );
    }

    Err(BuildError::MissingRequiredExit {
        required: ExitRequirement::Any.to_string(),
        exit_nodes_found: board.exit_nodes().len(),
        location: doc.board_location(board.uuid()),
    })
}

/// A specific exit kind only has to exist once per document, on any active board.
fn validate_exit_requirement(
    doc: &Document,
    requirement: ExitRequirement,
) -> Result<(), BuildError> {
    let exit_nodes: Vec<_> = doc.boards().flat_map(|board| board.exit_nodes()).collect();
    if exit_nodes.iter().any(|node| requirement.is_satisfied_by(node)) {
        return Ok(());
    }

    tracing::error!(
        "Document '{}' requires a {} exit node, none found out of {} exit node(s)",
        doc.name,
        requirement,
        exit_nodes.len()
    );
    Err(BuildError::MissingRequiredExit {
        required: requirement.to_string(),
        exit_nodes_found: exit_nodes.len(),
        location: doc.location(),
    })
}

/// At least one flexible node of `subtype` must exist, and one of them must have
/// both incoming and outgoing connections.
fn validate_completion_node(doc: &Document, subtype: &str) -> Result<(), BuildError> {
    let candidates: Vec<_> = doc
        .boards()
        .flat_map(|board| board.nodes_with_flexible_subtype(subtype))
        .collect();

    let Some(first) = candidates.first() else {
        return Err(BuildError::MissingCompletionNode {
            subtype: subtype.to_string(),
            location: doc.location(),
        });
    };
    if candidates
        .iter()
        .any(|node| !node.connections_in.is_empty() && !node.connections_out.is_empty())
    {
        return Ok(());
    }

    Err(BuildError::UnconnectedCompletionNode {
        subtype: subtype.to_string(),
        nodes_found: candidates.len(),
        location: doc.board_location(&first.board).with_entity(&first.uuid),
    })
}
