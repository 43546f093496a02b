use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::domain::planner::planning_config::RoutingConfig;
use crate::domain::routing::computed_path::ComputedPath;
use crate::domain::routing::request::PathRequest;
use crate::domain::topology::element::ElementKind;
use crate::domain::topology::graph::{ElementKey, TopologyGraph};
use crate::domain::utils::id::ElementId;
use crate::error::BlockingReason;

/// Partial path waiting in the search queue.
#[derive(Debug, Clone)]
struct PartialPath {
    cost: f64,
    /// Insertion counter, breaks cost ties in discovery order.
    sequence: u64,
    keys: Vec<ElementKey>,
    /// Index of the next include element still to visit.
    next_include: usize,
}

impl PartialEq for PartialPath {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PartialPath {}

impl PartialOrd for PartialPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartialPath {
    // Reversed so the max-heap pops the cheapest, then the oldest, partial path.
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Resolved constraints of one request.
struct SearchConstraints {
    source: ElementKey,
    destination: ElementKey,
    include: Vec<ElementKey>,
    include_set: HashSet<ElementKey>,
    exclude: HashSet<ElementKey>,
}

/// Computes loopless candidate paths between transceivers.
pub struct PathRouter<'a> {
    topology: &'a TopologyGraph,
    k_paths: usize,
    max_explored_paths: usize,
}

impl<'a> PathRouter<'a> {
    pub fn new(topology: &'a TopologyGraph, config: &RoutingConfig) -> Self {
        Self { topology, k_paths: config.k_paths, max_explored_paths: config.max_explored_paths }
    }

    /// Calculates up to `k` shortest loopless paths for `request`, cheapest first.
    ///
    /// ### Algorithm Logic
    /// 1. Resolves source, destination, include and exclude ids against the topology.
    /// 2. Runs a best-first search over partial paths ordered by cost; since link weights are
    ///    never negative, complete paths leave the queue in non-decreasing cost order.
    /// 3. A partial path never revisits an element, never enters an excluded element,
    ///    never transits a transceiver, and visits include elements in their given order.
    /// 4. Stops after `k` complete paths or `max_explored_paths` expansions.
    ///
    /// ### Returns
    /// * `Err(BlockingReason::NoPathFound)` if no path satisfies the constraints.
    pub fn candidate_paths(&self, request: &PathRequest) -> Result<Vec<ComputedPath>, BlockingReason> {
        let constraints = self.resolve_constraints(request)?;

        let mut found_solutions: Vec<ComputedPath> = Vec::new();
        let mut queue: BinaryHeap<PartialPath> = BinaryHeap::new();
        let mut sequence: u64 = 0;
        let mut explored: usize = 0;

        let first_include = usize::from(constraints.include.first() == Some(&constraints.source));
        queue.push(PartialPath { cost: 0.0, sequence, keys: vec![constraints.source], next_include: first_include });

        while let Some(current_path) = queue.pop() {
            let Some(&last) = current_path.keys.last() else {
                continue;
            };

            if last == constraints.destination {
                if current_path.next_include == constraints.include.len() {
                    found_solutions.push(self.to_computed_path(&current_path));

                    if found_solutions.len() >= self.k_paths {
                        break;
                    }
                }
                continue;
            }

            explored += 1;
            if explored > self.max_explored_paths {
                log::warn!(
                    "Path search for request {} stopped after exploring {} partial paths ({} candidates found).",
                    request.request_id,
                    self.max_explored_paths,
                    found_solutions.len()
                );
                break;
            }

            for link in self.topology.outgoing(last) {
                let next = link.to;

                if current_path.keys.contains(&next) || constraints.exclude.contains(&next) {
                    continue;
                }

                if next != constraints.destination && self.topology.kind_of(next) == Some(ElementKind::Transceiver) {
                    continue;
                }

                let mut next_include = current_path.next_include;
                if constraints.include.get(next_include) == Some(&next) {
                    next_include += 1;
                } else if constraints.include_set.contains(&next) {
                    // include element out of order
                    continue;
                }

                sequence += 1;
                let mut keys = current_path.keys.clone();
                keys.push(next);
                queue.push(PartialPath { cost: current_path.cost + link.weight, sequence, keys, next_include });
            }
        }

        if found_solutions.is_empty() {
            log::debug!("NoPathFound: {} => {}", request.source, request.destination);
            return Err(BlockingReason::NoPathFound(format!(
                "no path from {} to {} satisfies the include/exclude constraints",
                request.source, request.destination
            )));
        }

        log::debug!(
            "Paths found {} => {}: {} solutions, best cost {}",
            request.source,
            request.destination,
            found_solutions.len(),
            found_solutions[0].cost
        );

        Ok(found_solutions)
    }

    fn resolve_constraints(&self, request: &PathRequest) -> Result<SearchConstraints, BlockingReason> {
        let source = self.resolve_endpoint(&request.source, "source")?;
        let destination = self.resolve_endpoint(&request.destination, "destination")?;

        if source == destination {
            return Err(BlockingReason::NoPathFound(format!("source and destination are both {}", request.source)));
        }

        let mut include = Vec::with_capacity(request.include.len());
        for id in &request.include {
            let key = self.topology.key_of(id).ok_or_else(|| BlockingReason::NoPathFound(format!("include element {} is unknown", id)))?;
            if include.last() != Some(&key) {
                include.push(key);
            }
        }

        let mut exclude = HashSet::new();
        for id in &request.exclude {
            match self.topology.key_of(id) {
                Some(key) => {
                    exclude.insert(key);
                }
                None => log::warn!("Request {} excludes unknown element {}; ignored.", request.request_id, id),
            }
        }

        if exclude.contains(&source) || exclude.contains(&destination) {
            return Err(BlockingReason::NoPathFound("source or destination is excluded".to_string()));
        }

        if let Some(conflict) = include.iter().find(|key| exclude.contains(key)) {
            let id = self.topology.id_of(*conflict).map(ElementId::to_string).unwrap_or_default();
            return Err(BlockingReason::NoPathFound(format!("element {} is both included and excluded", id)));
        }

        let include_set: HashSet<ElementKey> = include.iter().copied().collect();
        if include_set.len() != include.len() {
            return Err(BlockingReason::NoPathFound("include list visits an element twice".to_string()));
        }

        // The destination can only be the last include element.
        if include.iter().rev().skip(1).any(|key| *key == destination) {
            return Err(BlockingReason::NoPathFound("destination listed before other include elements".to_string()));
        }

        Ok(SearchConstraints { source, destination, include, include_set, exclude })
    }

    fn resolve_endpoint(&self, id: &ElementId, role: &str) -> Result<ElementKey, BlockingReason> {
        let element = self.topology.element(id).ok_or_else(|| BlockingReason::NoPathFound(format!("{} {} is unknown", role, id)))?;

        if element.kind != ElementKind::Transceiver {
            return Err(BlockingReason::NoPathFound(format!("{} {} is a {}, not a Transceiver", role, id, element.kind)));
        }

        self.topology.key_of(id).ok_or_else(|| BlockingReason::NoPathFound(format!("{} {} is unknown", role, id)))
    }

    fn to_computed_path(&self, partial: &PartialPath) -> ComputedPath {
        let elements = partial.keys.iter().filter_map(|key| self.topology.id_of(*key).cloned()).collect();
        ComputedPath::new(elements, partial.cost)
    }
}
