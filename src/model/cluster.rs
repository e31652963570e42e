use ahash::AHashMap;

/// One topic node grouped with its responses and rejoinders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCluster {
    pub topic: String,
    pub responses: Vec<String>,
    pub rejoinders: Vec<String>,
}

impl TopicCluster {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            ..Self::default()
        }
    }

    /// Topic, responses and rejoinders, in that order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.topic.as_str())
            .chain(self.responses.iter().map(String::as_str))
            .chain(self.rejoinders.iter().map(String::as_str))
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.topic == uuid
            || self.responses.iter().any(|r| r == uuid)
            || self.rejoinders.iter().any(|r| r == uuid)
    }
}

/// The topic clusters of a board, in insertion order, plus the nodes that belong to none.
#[derive(Debug, Clone, Default)]
pub struct TopicClusters {
    clusters: Vec<TopicCluster>,
    by_topic: AHashMap<String, usize>,
    non_clustered: Vec<String>,
}

impl TopicClusters {
    pub(crate) fn push(&mut self, cluster: TopicCluster) {
        self.by_topic
            .insert(cluster.topic.clone(), self.clusters.len());
        self.clusters.push(cluster);
    }

    pub(crate) fn push_non_clustered(&mut self, uuid: &str) {
        self.non_clustered.push(uuid.to_string());
    }

    pub fn clusters(&self) -> &[TopicCluster] {
        &self.clusters
    }

    pub fn get(&self, topic_uuid: &str) -> Option<&TopicCluster> {
        self.by_topic.get(topic_uuid).map(|&i| &self.clusters[i])
    }

    /// The cluster a node belongs to as topic, response or rejoinder.
    pub fn cluster_of(&self, uuid: &str) -> Option<&TopicCluster> {
        self.clusters.iter().find(|c| c.contains(uuid))
    }

    pub fn non_clustered(&self) -> &[String] {
        &self.non_clustered
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
