#![allow(dead_code)]

use optical_path_planner::api::request_dto::{DisjunctionDto, PathRequestDto, PlanningInputDto};
use optical_path_planner::api::topology_dto::{ConnectionDto, ElementDto, TopologyDto};

pub fn element(uid: &str, typ: &str) -> ElementDto {
    ElementDto { uid: uid.to_string(), typ: typ.to_string(), params: None, reverse: None }
}

pub fn connection(from: &str, to: &str) -> ConnectionDto {
    ConnectionDto { from_node: from.to_string(), to_node: to.to_string(), weight: None }
}

pub fn empty_topology() -> TopologyDto {
    TopologyDto { elements: vec![], connections: vec![] }
}

/// Roadm `roadm {site}` with its transceiver `trx {site}` attached both ways.
pub fn add_site(topology: &mut TopologyDto, site: &str) {
    let roadm = format!("roadm {}", site);
    let trx = format!("trx {}", site);

    topology.elements.push(element(&roadm, "Roadm"));
    topology.elements.push(element(&trx, "Transceiver"));
    topology.connections.push(connection(&trx, &roadm));
    topology.connections.push(connection(&roadm, &trx));
}

/// One fiber pair between two sites, each direction `roadm -> booster -> fiber -> preamp -> roadm`.
pub fn add_span(topology: &mut TopologyDto, a: &str, b: &str) {
    for (from, to) in [(a, b), (b, a)] {
        let chain =
            [format!("roadm {}", from), format!("booster {}-{}", from, to), format!("fiber {}-{}", from, to), format!("preamp {}-{}", from, to), format!("roadm {}", to)];

        topology.elements.push(element(&chain[1], "Edfa"));
        topology.elements.push(element(&chain[2], "Fiber"));
        topology.elements.push(element(&chain[3], "Edfa"));

        for pair in chain.windows(2) {
            topology.connections.push(connection(&pair[0], &pair[1]));
        }
    }
}

/// `trx A - roadm A = roadm B - trx B`
pub fn two_node_topology() -> TopologyDto {
    let mut topology = empty_topology();
    add_site(&mut topology, "A");
    add_site(&mut topology, "B");
    add_span(&mut topology, "A", "B");
    topology
}

/// Square of four sites: A-B, B-C, C-D, D-A.
pub fn square_topology() -> TopologyDto {
    let mut topology = empty_topology();
    for site in ["A", "B", "C", "D"] {
        add_site(&mut topology, site);
    }
    add_span(&mut topology, "A", "B");
    add_span(&mut topology, "B", "C");
    add_span(&mut topology, "C", "D");
    add_span(&mut topology, "D", "A");
    topology
}

pub fn request(request_id: &str, source: &str, destination: &str) -> PathRequestDto {
    PathRequestDto {
        request_id: request_id.to_string(),
        source: format!("trx {}", source),
        destination: format!("trx {}", destination),
        include: vec![],
        exclude: vec![],
        spacing: None,
        nb_channel: None,
        requested_n: None,
        requested_m: None,
    }
}

pub fn disjunction(disjunction_id: &str, disjunction_type: &str, request_ids: &[&str]) -> DisjunctionDto {
    DisjunctionDto {
        disjunction_id: disjunction_id.to_string(),
        disjunction_type: disjunction_type.to_string(),
        relaxable: false,
        request_ids: request_ids.iter().map(|id| id.to_string()).collect(),
    }
}

pub fn input(path_requests: Vec<PathRequestDto>, disjunctions: Vec<DisjunctionDto>) -> PlanningInputDto {
    PlanningInputDto { path_requests, disjunctions }
}
