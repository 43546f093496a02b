use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::domain::routing::computed_path::ComputedPath;
use crate::domain::routing::request::{DisjointnessKind, DisjunctionGroup};
use crate::domain::topology::graph::TopologyGraph;
use crate::domain::utils::id::{DisjunctionId, RequestId};
use crate::error::BlockingReason;

/// Candidate paths per request, or the reason routing failed.
pub type CandidateMap = BTreeMap<RequestId, Result<Vec<ComputedPath>, BlockingReason>>;

/// Outcome of the disjunction of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub group_id: DisjunctionId,
    pub kind: DisjointnessKind,
    pub members: Vec<RequestId>,

    /// `true` iff every member got a path and the selected paths are pairwise disjoint.
    pub satisfied: bool,

    /// Members without a candidate disjoint from the ones selected before them.
    pub unsatisfiable: Vec<RequestId>,
}

/// One selected path per request, plus the per-group outcome.
#[derive(Debug, Clone)]
pub struct Selection {
    pub selected: BTreeMap<RequestId, Result<ComputedPath, BlockingReason>>,
    pub groups: Vec<GroupReport>,
}

/// Normalizes disjunction declarations before resolution.
///
/// * Unknown and duplicate member ids are dropped.
/// * Groups sharing a member are merged (DSU). The merged group keeps the smallest id and is
///   node-disjoint if any of its sources was.
/// * Groups left with fewer than two members are dropped.
///
/// # Returns
/// Groups sorted by id, each with sorted members, no request in two groups.
pub fn correct_disjunctions(groups: Vec<DisjunctionGroup>, known_requests: &BTreeSet<RequestId>) -> Vec<DisjunctionGroup> {
    let mut cleaned: Vec<DisjunctionGroup> = Vec::with_capacity(groups.len());

    for mut group in groups {
        let mut members: BTreeSet<RequestId> = BTreeSet::new();
        for member in group.members.drain(..) {
            if !known_requests.contains(&member) {
                log::warn!("Disjunction {} references unknown request {}; dropped.", group.group_id, member);
                continue;
            }
            if !members.insert(member.clone()) {
                log::warn!("Disjunction {} lists request {} twice.", group.group_id, member);
            }
        }
        group.members = members.into_iter().collect();
        cleaned.push(group);
    }

    // 1. DSU over group indices
    let mut dsu = QuickUnionUf::<UnionBySize>::new(cleaned.len());
    let mut first_group_of: HashMap<RequestId, usize> = HashMap::new();

    for (index, group) in cleaned.iter().enumerate() {
        for member in &group.members {
            match first_group_of.get(member) {
                Some(&other) => {
                    log::info!("Disjunctions {} and {} share request {}; merging.", cleaned[other].group_id, group.group_id, member);
                    dsu.union(other, index);
                }
                None => {
                    first_group_of.insert(member.clone(), index);
                }
            }
        }
    }

    // 2. Merge every group into its representative
    let mut merged: BTreeMap<usize, (DisjunctionId, DisjointnessKind, BTreeSet<RequestId>)> = BTreeMap::new();
    for (index, group) in cleaned.into_iter().enumerate() {
        let representative = dsu.find(index);
        let entry = merged.entry(representative).or_insert_with(|| (group.group_id.clone(), group.kind, BTreeSet::new()));

        if group.group_id < entry.0 {
            entry.0 = group.group_id.clone();
        }
        entry.1 = entry.1.max(group.kind);
        entry.2.extend(group.members);
    }

    // 3. Drop degenerate groups
    let mut corrected: Vec<DisjunctionGroup> = merged
        .into_values()
        .filter_map(|(group_id, kind, members)| {
            if members.len() < 2 {
                log::warn!("Disjunction {} has fewer than two distinct requests; dropped.", group_id);
                return None;
            }
            Some(DisjunctionGroup { group_id, kind, members: members.into_iter().collect() })
        })
        .collect();

    corrected.sort_by(|a, b| a.group_id.cmp(&b.group_id));
    corrected
}

/// Checks whether two paths satisfy `kind`, comparing only their switch-to-switch core.
///
/// Node-disjoint paths may only share switches that are a core endpoint of both, i.e. a
/// common add/drop site.
pub fn is_disjoint(first: &ComputedPath, second: &ComputedPath, kind: DisjointnessKind, topology: &TopologyGraph) -> bool {
    let links_disjoint = first.core_links(topology).is_disjoint(&second.core_links(topology));

    match kind {
        DisjointnessKind::LinkDisjoint => links_disjoint,
        DisjointnessKind::NodeDisjoint => {
            let first_endpoints = first.core_endpoints(topology);
            let second_endpoints = second.core_endpoints(topology);

            links_disjoint
                && first
                    .core_elements(topology)
                    .intersection(&second.core_elements(topology))
                    .all(|shared| first_endpoints.contains(shared) && second_endpoints.contains(shared))
        }
    }
}

/// Selects one path per request.
///
/// ### Algorithm Logic
/// 1. Groups in ascending id, members in ascending request id.
/// 2. Each member takes its cheapest candidate disjoint from every path already fixed in the
///    group. No such candidate leaves the member `Unsatisfiable`; the group continues.
/// 3. Requests outside every group take their cheapest candidate.
///
/// `groups` must come from [`correct_disjunctions`].
pub fn resolve(candidates: &CandidateMap, groups: &[DisjunctionGroup], topology: &TopologyGraph) -> Selection {
    let mut selected: BTreeMap<RequestId, Result<ComputedPath, BlockingReason>> = BTreeMap::new();
    let mut reports: Vec<GroupReport> = Vec::with_capacity(groups.len());

    for group in groups {
        let mut fixed: Vec<ComputedPath> = Vec::new();
        let mut unsatisfiable: Vec<RequestId> = Vec::new();
        let mut all_routed = true;

        for member in &group.members {
            let Some(member_candidates) = candidates.get(member) else {
                all_routed = false;
                continue;
            };

            let outcome = match member_candidates {
                Err(reason) => {
                    all_routed = false;
                    Err(reason.clone())
                }
                Ok(list) => {
                    let choice = list.iter().find(|candidate| fixed.iter().all(|other| is_disjoint(candidate, other, group.kind, topology)));

                    match choice {
                        Some(path) => {
                            fixed.push(path.clone());
                            Ok(path.clone())
                        }
                        None => {
                            tracing::warn!(
                                "Unsatisfiable: none of the {} candidates of request {} is disjoint within group {}.",
                                list.len(),
                                member,
                                group.group_id
                            );
                            unsatisfiable.push(member.clone());
                            Err(BlockingReason::Unsatisfiable(group.group_id.to_string()))
                        }
                    }
                }
            };

            selected.insert(member.clone(), outcome);
        }

        let satisfied = all_routed && unsatisfiable.is_empty();
        log::info!("Disjunction {} ({:?}): satisfied = {}.", group.group_id, group.kind, satisfied);

        reports.push(GroupReport { group_id: group.group_id.clone(), kind: group.kind, members: group.members.clone(), satisfied, unsatisfiable });
    }

    for (request_id, member_candidates) in candidates {
        if selected.contains_key(request_id) {
            continue;
        }

        let outcome = match member_candidates {
            Ok(list) => list
                .first()
                .cloned()
                .ok_or_else(|| BlockingReason::NoPathFound("router returned no candidate".to_string())),
            Err(reason) => Err(reason.clone()),
        };
        selected.insert(request_id.clone(), outcome);
    }

    Selection { selected, groups: reports }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::element::{Element, ElementKind};
    use crate::domain::utils::id::ElementId;
    use tracing_test::traced_test;

    fn known(ids: &[&str]) -> BTreeSet<RequestId> {
        ids.iter().map(|id| RequestId::new(*id)).collect()
    }

    fn path(names: &[&str], cost: f64) -> ComputedPath {
        ComputedPath::new(names.iter().map(|name| ElementId::new(*name)).collect(), cost)
    }

    /// ta/tc on roadms a and c, transit roadms b and d, fibers between them.
    fn topology() -> TopologyGraph {
        let mut elements = vec![Element::new(ElementId::new("ta"), ElementKind::Transceiver), Element::new(ElementId::new("tc"), ElementKind::Transceiver)];
        for roadm in ["a", "b", "c", "d"] {
            elements.push(Element::new(ElementId::new(roadm), ElementKind::Roadm));
        }
        for fiber in ["fab", "fbc", "fad", "fdc", "fac"] {
            elements.push(Element::new(ElementId::new(fiber), ElementKind::Fiber));
        }
        TopologyGraph::from_parts(elements, vec![]).unwrap()
    }

    #[test]
    fn test_correct_merges_and_drops() {
        let groups = vec![
            DisjunctionGroup::new("g2", DisjointnessKind::LinkDisjoint, &["3", "4"]),
            DisjunctionGroup::new("g1", DisjointnessKind::LinkDisjoint, &["1", "2"]),
            DisjunctionGroup::new("g3", DisjointnessKind::NodeDisjoint, &["2", "5"]),
            DisjunctionGroup::new("g4", DisjointnessKind::LinkDisjoint, &["6", "6", "ghost"]),
        ];

        let corrected = correct_disjunctions(groups, &known(&["1", "2", "3", "4", "5", "6"]));

        assert_eq!(corrected.len(), 2);
        assert_eq!(corrected[0].group_id, DisjunctionId::new("g1"));
        assert_eq!(corrected[0].kind, DisjointnessKind::NodeDisjoint);
        assert_eq!(corrected[0].members, vec![RequestId::new("1"), RequestId::new("2"), RequestId::new("5")]);
        assert_eq!(corrected[1].group_id, DisjunctionId::new("g2"));
        assert_eq!(corrected[1].members, vec![RequestId::new("3"), RequestId::new("4")]);
    }

    #[test]
    fn test_correct_removes_duplicate_groups() {
        let groups = vec![
            DisjunctionGroup::new("g1", DisjointnessKind::LinkDisjoint, &["1", "2"]),
            DisjunctionGroup::new("g1-copy", DisjointnessKind::LinkDisjoint, &["2", "1"]),
        ];

        let corrected = correct_disjunctions(groups, &known(&["1", "2"]));

        assert_eq!(corrected.len(), 1);
        assert_eq!(corrected[0].group_id, DisjunctionId::new("g1"));
    }

    #[test]
    fn test_resolve_picks_disjoint_second_path() {
        let topology = topology();
        let upper = path(&["ta", "a", "fab", "b", "fbc", "c", "tc"], 6.0);
        let lower = path(&["ta", "a", "fad", "d", "fdc", "c", "tc"], 6.0);

        let mut candidates = CandidateMap::new();
        candidates.insert(RequestId::new("1"), Ok(vec![upper.clone(), lower.clone()]));
        candidates.insert(RequestId::new("2"), Ok(vec![upper.clone(), lower.clone()]));
        candidates.insert(RequestId::new("3"), Ok(vec![upper.clone()]));

        let groups = vec![DisjunctionGroup::new("g", DisjointnessKind::NodeDisjoint, &["1", "2"])];
        let selection = resolve(&candidates, &groups, &topology);

        assert_eq!(selection.selected[&RequestId::new("1")], Ok(upper.clone()));
        assert_eq!(selection.selected[&RequestId::new("2")], Ok(lower));
        assert_eq!(selection.selected[&RequestId::new("3")], Ok(upper));
        assert!(selection.groups[0].satisfied);
    }

    #[traced_test]
    #[test]
    fn test_resolve_marks_unsatisfiable_and_continues() {
        let topology = topology();
        let upper = path(&["ta", "a", "fab", "b", "fbc", "c", "tc"], 6.0);
        let lower = path(&["ta", "a", "fad", "d", "fdc", "c", "tc"], 6.0);

        let mut candidates = CandidateMap::new();
        candidates.insert(RequestId::new("1"), Ok(vec![upper.clone()]));
        candidates.insert(RequestId::new("2"), Ok(vec![upper.clone()]));
        candidates.insert(RequestId::new("3"), Ok(vec![lower.clone(), upper.clone()]));

        let groups = vec![DisjunctionGroup::new("g", DisjointnessKind::LinkDisjoint, &["1", "2", "3"])];
        let selection = resolve(&candidates, &groups, &topology);

        assert_eq!(selection.selected[&RequestId::new("1")], Ok(upper));
        assert_eq!(selection.selected[&RequestId::new("2")], Err(BlockingReason::Unsatisfiable("g".to_string())));
        assert_eq!(selection.selected[&RequestId::new("3")], Ok(lower));
        assert!(!selection.groups[0].satisfied);
        assert_eq!(selection.groups[0].unsatisfiable, vec![RequestId::new("2")]);
        assert!(logs_contain("Unsatisfiable"));
    }

    #[test]
    fn test_disjointness_ignores_add_drop_legs() {
        let topology = topology();
        let upper = path(&["ta", "a", "fab", "b", "fbc", "c", "tc"], 6.0);
        let lower = path(&["ta", "a", "fad", "d", "fdc", "c", "tc"], 6.0);
        let direct = path(&["ta", "a", "fac", "c", "tc"], 4.0);
        let through_b = path(&["ta", "a", "fab", "b", "fbc", "c", "tc"], 6.0);

        assert!(is_disjoint(&upper, &lower, DisjointnessKind::LinkDisjoint, &topology));
        assert!(is_disjoint(&upper, &lower, DisjointnessKind::NodeDisjoint, &topology));
        assert!(is_disjoint(&direct, &lower, DisjointnessKind::NodeDisjoint, &topology));
        assert!(!is_disjoint(&upper, &through_b, DisjointnessKind::LinkDisjoint, &topology));
    }

    #[test]
    fn test_endpoint_of_one_path_transit_of_other() {
        let topology = topology();
        let abc = path(&["ta", "a", "fab", "b", "fbc", "c", "tc"], 6.0);
        // a is an endpoint of abc but a transit switch here
        let dac = path(&["ta", "d", "fad", "a", "fac", "c", "tc"], 6.0);
        let from_a = path(&["ta", "a", "fad", "d", "tc"], 4.0);
        let from_b = path(&["ta", "b", "fbc", "c", "tc"], 4.0);

        assert!(!is_disjoint(&abc, &dac, DisjointnessKind::NodeDisjoint, &topology));
        assert!(!is_disjoint(&dac, &abc, DisjointnessKind::NodeDisjoint, &topology));
        assert!(is_disjoint(&abc, &dac, DisjointnessKind::LinkDisjoint, &topology));
        assert!(is_disjoint(&abc, &from_a, DisjointnessKind::NodeDisjoint, &topology));
        assert!(is_disjoint(&from_a, &from_b, DisjointnessKind::NodeDisjoint, &topology));
        assert!(!is_disjoint(&abc, &from_b, DisjointnessKind::NodeDisjoint, &topology));
    }

    #[test]
    fn test_member_without_candidates_fails_group() {
        let topology = topology();
        let upper = path(&["ta", "a", "fab", "b", "fbc", "c", "tc"], 6.0);

        let mut candidates = CandidateMap::new();
        candidates.insert(RequestId::new("1"), Ok(vec![upper.clone()]));

        let groups = vec![DisjunctionGroup::new("g", DisjointnessKind::LinkDisjoint, &["1", "2"])];
        let selection = resolve(&candidates, &groups, &topology);

        assert_eq!(selection.selected[&RequestId::new("1")], Ok(upper));
        assert!(!selection.selected.contains_key(&RequestId::new("2")));
        assert!(!selection.groups[0].satisfied);
        assert!(selection.groups[0].unsatisfiable.is_empty());
    }
}
