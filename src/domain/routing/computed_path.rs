use serde::Serialize;
use std::collections::HashSet;

use crate::domain::topology::graph::TopologyGraph;
use crate::domain::utils::id::ElementId;

/// Ordered element walk realizing one request. Never edited once built; re-routing
/// produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedPath {
    pub elements: Vec<ElementId>,

    /// Sum of the link weights along the path.
    pub cost: f64,
}

impl ComputedPath {
    pub fn new(elements: Vec<ElementId>, cost: f64) -> Self {
        Self { elements, cost }
    }

    pub fn hops(&self) -> usize {
        self.elements.len().saturating_sub(1)
    }

    pub fn links(&self) -> impl Iterator<Item = (&ElementId, &ElementId)> {
        self.elements.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Index of the first and last switch on the path. The segments outside are the
    /// add/drop legs towards the endpoint transceivers.
    fn core_bounds(&self, topology: &TopologyGraph) -> (usize, usize) {
        let is_switch = |id: &ElementId| topology.element(id).is_some_and(|element| element.is_switch());

        let first = self.elements.iter().position(is_switch);
        let last = self.elements.iter().rposition(is_switch);

        match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => (0, self.elements.len().saturating_sub(1)),
        }
    }

    /// Directed links between the first and the last switch.
    pub fn core_links(&self, topology: &TopologyGraph) -> HashSet<(ElementId, ElementId)> {
        let (first, last) = self.core_bounds(topology);
        if self.elements.is_empty() || first >= last {
            return HashSet::new();
        }

        self.elements[first..=last].windows(2).map(|pair| (pair[0].clone(), pair[1].clone())).collect()
    }

    /// Elements from the first to the last switch, both included.
    pub fn core_elements(&self, topology: &TopologyGraph) -> HashSet<ElementId> {
        if self.elements.is_empty() {
            return HashSet::new();
        }

        let (first, last) = self.core_bounds(topology);
        self.elements[first..=last].iter().cloned().collect()
    }

    /// The first and the last switch of the path.
    pub fn core_endpoints(&self, topology: &TopologyGraph) -> HashSet<ElementId> {
        if self.elements.is_empty() {
            return HashSet::new();
        }

        let (first, last) = self.core_bounds(topology);
        HashSet::from([self.elements[first].clone(), self.elements[last].clone()])
    }
}
