use crate::domain::routing::computed_path::ComputedPath;
use crate::domain::topology::graph::TopologyGraph;
use crate::domain::utils::id::ElementId;
use crate::error::BlockingReason;

/// Builds the return direction of `path`: its elements in reverse order, each replaced
/// by its reverse counterpart.
///
/// # Returns
/// `NoReverseMapping` if an element has no counterpart or two consecutive counterparts are
/// not linked in the topology.
pub fn find_reversed_path(path: &ComputedPath, topology: &TopologyGraph) -> Result<ComputedPath, BlockingReason> {
    let mut elements: Vec<ElementId> = Vec::with_capacity(path.elements.len());

    for element_id in path.elements.iter().rev() {
        let reverse = topology
            .reverse_of(element_id)
            .ok_or_else(|| BlockingReason::NoReverseMapping(format!("element {} has no reverse counterpart", element_id)))?;
        elements.push(reverse.clone());
    }

    let mut cost = 0.0;
    for pair in elements.windows(2) {
        let link = topology
            .key_of(&pair[0])
            .zip(topology.key_of(&pair[1]))
            .and_then(|(from, to)| topology.link(from, to))
            .ok_or_else(|| BlockingReason::NoReverseMapping(format!("no link from {} to {} in the reverse direction", pair[0], pair[1])))?;

        cost += link.weight;
    }

    log::debug!("Reverse path found with {} elements and cost {}.", elements.len(), cost);

    Ok(ComputedPath::new(elements, cost))
}
