use crate::model::{BoardRef, Connection, Document, Node, TopicCluster, TopicClusters};
use ahash::AHashSet;

/// Groups a board's nodes into topic clusters.
///
/// Topics are intro nodes, nodes flagged as topics and destinations of move-on
/// connections. A topic's responses are the nodes its standard connections lead
/// to; the nodes those responses lead to are its rejoinders. Exits and other
/// topics never join a cluster, and a node belongs to the first cluster that
/// reaches it. Topics without responses end up non-clustered.
pub(super) fn analyze(board: BoardRef<'_>) -> TopicClusters {
    let doc = board.document();
    let nodes: Vec<&Node> = board.elements().collect();

    let topics: Vec<&Node> = nodes
        .iter()
        .copied()
        .filter(|node| is_topic(doc, node))
        .collect();
    let mut claimed: AHashSet<&str> = topics.iter().map(|t| t.uuid.as_str()).collect();

    let mut clusters = TopicClusters::default();
    for topic in &topics {
        let mut cluster = TopicCluster::new(&topic.uuid);

        for response in standard_destinations(doc, topic) {
            if claimable(board, response, &claimed) {
                claimed.insert(&response.uuid);
                cluster.responses.push(response.uuid.clone());
            }
        }

        for response_uuid in &cluster.responses {
            let Some(response) = doc.find_node(response_uuid) else {
                continue;
            };
            for rejoinder in standard_destinations(doc, response) {
                if claimable(board, rejoinder, &claimed) {
                    claimed.insert(&rejoinder.uuid);
                    cluster.rejoinders.push(rejoinder.uuid.clone());
                }
            }
        }

        if !cluster.responses.is_empty() {
            clusters.push(cluster);
        }
    }

    for node in &nodes {
        if clusters.cluster_of(&node.uuid).is_none() {
            clusters.push_non_clustered(&node.uuid);
        }
    }

    tracing::debug!(
        "Board '{}': {} topic cluster(s), {} non-clustered node(s)",
        board.name(),
        clusters.len(),
        clusters.non_clustered().len()
    );
    clusters
}

fn is_topic(doc: &Document, node: &Node) -> bool {
    node.is_intro
        || node.is_topic
        || node
            .connections_in
            .iter()
            .filter_map(|uuid| doc.find_connection(uuid))
            .any(Connection::is_move_on)
}

fn claimable(board: BoardRef<'_>, node: &Node, claimed: &AHashSet<&str>) -> bool {
    node.board == board.uuid() && !node.is_exit() && !claimed.contains(node.uuid.as_str())
}

/// Nodes reached from `node` over standard connections, in connection order.
fn standard_destinations<'a>(doc: &'a Document, node: &'a Node) -> impl Iterator<Item = &'a Node> {
    node.connections_out
        .iter()
        .filter_map(|uuid| doc.find_connection(uuid))
        .filter(|c| !c.is_move_on())
        .filter_map(|c| c.destination.as_deref())
        .filter_map(|uuid| doc.find_node(uuid))
}
