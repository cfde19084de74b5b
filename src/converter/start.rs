use crate::error::ConvertError;
use crate::model::NodeId;
use crate::registry::NodeType;

/// Finds the single start node among `(id, type)` pairs.
pub(super) fn locate_start<'a>(
    nodes: impl Iterator<Item = (&'a NodeId, NodeType)>,
) -> Result<&'a NodeId, ConvertError> {
    let starts: Vec<&NodeId> = nodes
        .filter(|(_, node_type)| *node_type == NodeType::Start)
        .map(|(id, _)| id)
        .collect();
    match starts.as_slice() {
        [] => Err(ConvertError::MissingStartNode),
        [only] => Ok(*only),
        many => Err(ConvertError::MultipleStartNodes {
            node_ids: many.iter().map(|id| (*id).clone()).collect(),
        }),
    }
}
