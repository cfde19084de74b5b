use crate::config::IdStrategy;
use crate::model::{EdgeId, NodeId};
use uuid::Uuid;

/// Hands out fresh node and edge ids according to an [`IdStrategy`].
#[derive(Debug, Clone, Default)]
pub(super) struct IdMinter {
    strategy: IdStrategy,
    next_node: u64,
    next_edge: u64,
}

impl IdMinter {
    pub(super) fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            next_node: 0,
            next_edge: 0,
        }
    }

    pub(super) fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub(super) fn node_id(&mut self, taken: impl Fn(&str) -> bool) -> NodeId {
        NodeId::new(Self::mint(self.strategy, &mut self.next_node, "node", taken))
    }

    pub(super) fn edge_id(&mut self, taken: impl Fn(&str) -> bool) -> EdgeId {
        EdgeId::new(Self::mint(self.strategy, &mut self.next_edge, "edge", taken))
    }

    fn mint(
        strategy: IdStrategy,
        counter: &mut u64,
        prefix: &str,
        taken: impl Fn(&str) -> bool,
    ) -> String {
        loop {
            let candidate = match strategy {
                IdStrategy::Uuid => Uuid::new_v4().to_string(),
                IdStrategy::Sequential => {
                    *counter += 1;
                    format!("{}_{}", prefix, counter)
                }
            };
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}
