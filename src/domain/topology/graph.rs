use bimap::BiMap;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

use crate::api::topology_dto::TopologyDto;
use crate::domain::topology::element::{Element, ElementKind, OmsRef};
use crate::domain::utils::id::ElementId;
use crate::error::{Error, Result};

new_key_type! {
    pub struct ElementKey;
}

pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// Outgoing unidirectional link as stored in the adjacency list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: ElementKey,
    pub to: ElementKey,
    pub weight: f64,
}

/// Directed graph of network elements.
///
/// * **Elements**: stored in a `SlotMap`, addressable by `ElementKey` or by `ElementId`.
/// * **Adjacency**: outgoing links per element, sorted by target id so every traversal
///   visits neighbours in the same order from run to run.
/// * **Reverse map**: forward element id to the id of the element carrying the opposite
///   direction of the same physical equipment.
///
/// The graph is read-only once the OMS partitioner has annotated it.
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    elements: SlotMap<ElementKey, Element>,

    id_index: HashMap<ElementId, ElementKey>,

    adjacency: HashMap<ElementKey, Vec<Link>>,

    incoming: HashMap<ElementKey, Vec<ElementKey>>,

    reverse_map: BiMap<ElementId, ElementId>,
}

impl TopologyGraph {
    pub fn from_dto(dto: &TopologyDto) -> Result<Self> {
        // 1. Elements and id index.
        let (elements, id_index) = TopologyGraph::setup_elements(dto)?;

        let mut topology =
            TopologyGraph { elements, id_index, adjacency: HashMap::new(), incoming: HashMap::new(), reverse_map: BiMap::new() };

        // 2. Unidirectional links.
        for connection in &dto.connections {
            let weight = connection.weight.unwrap_or(DEFAULT_LINK_WEIGHT);
            topology.add_link(&ElementId::new(connection.from_node.clone()), &ElementId::new(connection.to_node.clone()), weight)?;
        }
        topology.sort_adjacency();

        // 3. Reverse map: bidirectional equipment, then declared pairs.
        topology.setup_reverse_map(dto)?;

        log::info!(
            "Topology built: {} elements, {} links, {} reverse mappings.",
            topology.elements.len(),
            topology.link_count(),
            topology.reverse_map.len()
        );

        Ok(topology)
    }

    /// Builds a topology from elements and links directly, without a DTO.
    pub fn from_parts(elements: Vec<Element>, links: Vec<(ElementId, ElementId, f64)>) -> Result<Self> {
        let mut topology = TopologyGraph {
            elements: SlotMap::with_key(),
            id_index: HashMap::new(),
            adjacency: HashMap::new(),
            incoming: HashMap::new(),
            reverse_map: BiMap::new(),
        };

        for element in elements {
            topology.insert_element(element)?;
        }

        for (from, to, weight) in links {
            topology.add_link(&from, &to, weight)?;
        }
        topology.sort_adjacency();

        let bidirectional: Vec<ElementId> =
            topology.elements.values().filter(|element| element.kind.is_bidirectional()).map(|element| element.id.clone()).collect();
        for id in bidirectional {
            topology.register_reverse_pair(&id, &id)?;
        }

        Ok(topology)
    }

    fn setup_elements(dto: &TopologyDto) -> Result<(SlotMap<ElementKey, Element>, HashMap<ElementId, ElementKey>)> {
        let mut elements: SlotMap<ElementKey, Element> = SlotMap::with_key();
        let mut id_index: HashMap<ElementId, ElementKey> = HashMap::new();

        for element_dto in &dto.elements {
            let element = Element::from_dto(element_dto)?;

            if id_index.contains_key(&element.id) {
                return Err(Error::TopologyError(format!("Duplicate element uid {}.", element.id)));
            }

            let id = element.id.clone();
            let key = elements.insert(element);
            id_index.insert(id, key);
        }

        Ok((elements, id_index))
    }

    fn insert_element(&mut self, element: Element) -> Result<ElementKey> {
        if self.id_index.contains_key(&element.id) {
            return Err(Error::TopologyError(format!("Duplicate element uid {}.", element.id)));
        }

        let id = element.id.clone();
        let key = self.elements.insert(element);
        self.id_index.insert(id, key);

        Ok(key)
    }

    fn add_link(&mut self, from: &ElementId, to: &ElementId, weight: f64) -> Result<()> {
        let from_key =
            self.key_of(from).ok_or_else(|| Error::TopologyError(format!("Connection source {} is not a known element.", from)))?;
        let to_key = self.key_of(to).ok_or_else(|| Error::TopologyError(format!("Connection target {} is not a known element.", to)))?;

        if from_key == to_key {
            return Err(Error::TopologyError(format!("Connection {} -> {} is a self-loop.", from, to)));
        }

        if !(weight.is_finite() && weight >= 0.0) {
            return Err(Error::TopologyError(format!("Connection {} -> {} has invalid weight {}.", from, to, weight)));
        }

        let outgoing = self.adjacency.entry(from_key).or_default();
        if outgoing.iter().any(|link| link.to == to_key) {
            log::warn!("Duplicate connection {} -> {} ignored.", from, to);
            return Ok(());
        }

        outgoing.push(Link { from: from_key, to: to_key, weight });
        self.incoming.entry(to_key).or_default().push(from_key);

        Ok(())
    }

    fn sort_adjacency(&mut self) {
        let elements = &self.elements;
        for links in self.adjacency.values_mut() {
            links.sort_by(|a, b| elements[a.to].id.cmp(&elements[b.to].id));
        }
        for sources in self.incoming.values_mut() {
            sources.sort_by(|a, b| elements[*a].id.cmp(&elements[*b].id));
        }
    }

    fn setup_reverse_map(&mut self, dto: &TopologyDto) -> Result<()> {
        let bidirectional: Vec<ElementId> =
            self.elements.values().filter(|element| element.kind.is_bidirectional()).map(|element| element.id.clone()).collect();

        for id in bidirectional {
            self.register_reverse_pair(&id, &id)?;
        }

        for element_dto in &dto.elements {
            let Some(reverse_uid) = &element_dto.reverse else {
                continue;
            };

            let forward = ElementId::new(element_dto.uid.clone());
            let reverse = ElementId::new(reverse_uid.clone());

            let forward_kind = self.element(&forward).map(|element| element.kind);
            let reverse_kind = self.element(&reverse).map(|element| element.kind);

            match (forward_kind, reverse_kind) {
                (Some(a), Some(b)) if a == b => {}
                (Some(_), Some(_)) => {
                    return Err(Error::TopologyError(format!("Element {} declares reverse {} of a different type.", forward, reverse)));
                }
                _ => {
                    return Err(Error::TopologyError(format!("Element {} declares unknown reverse {}.", forward, reverse)));
                }
            }

            self.register_reverse_pair(&forward, &reverse)?;
        }

        Ok(())
    }

    /// Records that `forward` and `reverse` carry opposite directions of the same
    /// equipment. Registering an already known pair again is a no-op.
    pub(crate) fn register_reverse_pair(&mut self, forward: &ElementId, reverse: &ElementId) -> Result<()> {
        for (a, b) in [(forward, reverse), (reverse, forward)] {
            if self.reverse_map.get_by_left(a) == Some(b) {
                continue;
            }

            if self.reverse_map.insert_no_overwrite(a.clone(), b.clone()).is_err() {
                return Err(Error::TopologyError(format!(
                    "Conflicting reverse mapping {} <-> {}: {:?} already maps to {:?}.",
                    a,
                    b,
                    a,
                    self.reverse_map.get_by_left(a)
                )));
            }
        }

        Ok(())
    }

    pub(crate) fn set_oms_ref(&mut self, key: ElementKey, oms_ref: OmsRef) {
        if let Some(element) = self.elements.get_mut(key) {
            element.oms = Some(oms_ref);
        }
    }

    pub fn key_of(&self, id: &ElementId) -> Option<ElementKey> {
        self.id_index.get(id).copied()
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.key_of(id).and_then(|key| self.elements.get(key))
    }

    pub fn element_by_key(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(key)
    }

    /// Id of an element key. Keys are only handed out by this graph, so a miss means
    /// the key belongs to another topology.
    pub fn id_of(&self, key: ElementKey) -> Option<&ElementId> {
        self.elements.get(key).map(|element| &element.id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementKey, &Element)> {
        self.elements.iter()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn link_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Outgoing links of `key`, sorted by target id.
    pub fn outgoing(&self, key: ElementKey) -> &[Link] {
        self.adjacency.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Source keys of the links ending in `key`, sorted by source id.
    pub fn incoming(&self, key: ElementKey) -> &[ElementKey] {
        self.incoming.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn link(&self, from: ElementKey, to: ElementKey) -> Option<&Link> {
        self.outgoing(from).iter().find(|link| link.to == to)
    }

    pub fn has_link(&self, from: &ElementId, to: &ElementId) -> bool {
        match (self.key_of(from), self.key_of(to)) {
            (Some(from_key), Some(to_key)) => self.link(from_key, to_key).is_some(),
            _ => false,
        }
    }

    /// Switch elements sorted by id.
    pub fn switches(&self) -> Vec<ElementKey> {
        let mut switches: Vec<ElementKey> = self.elements.iter().filter(|(_, element)| element.is_switch()).map(|(key, _)| key).collect();
        switches.sort_by(|a, b| self.elements[*a].id.cmp(&self.elements[*b].id));
        switches
    }

    /// Element carrying the opposite direction of `id`, if known.
    pub fn reverse_of(&self, id: &ElementId) -> Option<&ElementId> {
        self.reverse_map.get_by_left(id)
    }

    pub fn reverse_mapping_count(&self) -> usize {
        self.reverse_map.len()
    }

    pub fn kind_of(&self, key: ElementKey) -> Option<ElementKind> {
        self.elements.get(key).map(|element| element.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::topology_dto::{ConnectionDto, ElementDto};

    fn element(uid: &str, typ: &str, reverse: Option<&str>) -> ElementDto {
        ElementDto { uid: uid.to_string(), typ: typ.to_string(), params: None, reverse: reverse.map(str::to_string) }
    }

    fn connection(from: &str, to: &str) -> ConnectionDto {
        ConnectionDto { from_node: from.to_string(), to_node: to.to_string(), weight: None }
    }

    #[test]
    fn test_from_dto_builds_sorted_adjacency() {
        let dto = TopologyDto {
            elements: vec![element("r1", "Roadm", None), element("b", "Fiber", None), element("a", "Fiber", None)],
            connections: vec![connection("r1", "b"), connection("r1", "a")],
        };

        let topology = TopologyGraph::from_dto(&dto).unwrap();
        let r1 = topology.key_of(&ElementId::new("r1")).unwrap();
        let targets: Vec<&ElementId> = topology.outgoing(r1).iter().map(|link| topology.id_of(link.to).unwrap()).collect();

        assert_eq!(targets, vec![&ElementId::new("a"), &ElementId::new("b")]);
        assert_eq!(topology.link_count(), 2);
    }

    #[test]
    fn test_duplicate_uid_is_topology_error() {
        let dto = TopologyDto { elements: vec![element("r1", "Roadm", None), element("r1", "Roadm", None)], connections: vec![] };

        assert!(matches!(TopologyGraph::from_dto(&dto), Err(Error::TopologyError(_))));
    }

    #[test]
    fn test_unknown_connection_endpoint_is_topology_error() {
        let dto = TopologyDto { elements: vec![element("r1", "Roadm", None)], connections: vec![connection("r1", "ghost")] };

        assert!(matches!(TopologyGraph::from_dto(&dto), Err(Error::TopologyError(_))));
    }

    #[test]
    fn test_duplicate_connection_is_ignored() {
        let dto = TopologyDto {
            elements: vec![element("r1", "Roadm", None), element("f", "Fiber", None)],
            connections: vec![connection("r1", "f"), connection("r1", "f")],
        };

        let topology = TopologyGraph::from_dto(&dto).unwrap();

        assert_eq!(topology.link_count(), 1);
    }

    #[test]
    fn test_declared_reverse_pairs_are_symmetric() {
        let dto = TopologyDto {
            elements: vec![element("r1", "Roadm", None), element("f-ab", "Fiber", Some("f-ba")), element("f-ba", "Fiber", None)],
            connections: vec![],
        };

        let topology = TopologyGraph::from_dto(&dto).unwrap();

        assert_eq!(topology.reverse_of(&ElementId::new("f-ab")), Some(&ElementId::new("f-ba")));
        assert_eq!(topology.reverse_of(&ElementId::new("f-ba")), Some(&ElementId::new("f-ab")));
        assert_eq!(topology.reverse_of(&ElementId::new("r1")), Some(&ElementId::new("r1")));
    }

    #[test]
    fn test_conflicting_reverse_declaration_is_rejected() {
        let dto = TopologyDto {
            elements: vec![element("f1", "Fiber", Some("f2")), element("f2", "Fiber", Some("f3")), element("f3", "Fiber", None)],
            connections: vec![],
        };

        assert!(matches!(TopologyGraph::from_dto(&dto), Err(Error::TopologyError(_))));
    }

    #[test]
    fn test_reverse_of_different_kind_is_rejected() {
        let dto = TopologyDto { elements: vec![element("f1", "Fiber", Some("a1")), element("a1", "Edfa", None)], connections: vec![] };

        assert!(matches!(TopologyGraph::from_dto(&dto), Err(Error::TopologyError(_))));
    }
}
