use std::collections::HashMap;

use crate::domain::oms::oms::Oms;
use crate::domain::planner::planning_config::SpectrumConfig;
use crate::domain::topology::element::{ElementKind, OmsRef};
use crate::domain::topology::graph::{ElementKey, TopologyGraph};
use crate::domain::utils::id::{ElementId, OmsId};
use crate::error::{Error, Result};

/// Maps every unidirectional link inside an OMS to the OMS id.
pub type OmsLinkIndex = HashMap<(ElementKey, ElementKey), OmsId>;

/// Partitions the topology into Optical Multiplex Sections.
///
/// ### Algorithm Logic
/// 1. Visits every switch in ascending id order and follows each outgoing link.
/// 2. Accumulates non-switch elements until the next switch closes the section.
/// 3. Annotates each interior element with its `(oms_id, position)`.
/// 4. Pairs sections running in opposite directions between the same switches and
///    completes the topology's reverse map from them.
///
/// A link from a switch straight to a transceiver is an add/drop link and opens no OMS.
///
/// ### Returns
/// * `Err(Error::TopologyError)` if a walk dead-ends, branches, loops, reaches a
///   transceiver, or reaches an element already owned by another OMS.
pub fn build_oms_list(topology: &mut TopologyGraph, spectrum: &SpectrumConfig) -> Result<Vec<Oms>> {
    let mut oms_list = walk_all_sections(topology, spectrum)?;

    for oms in &oms_list {
        let interior = oms.el_list.len().saturating_sub(1);
        for (position, key) in oms.el_list.iter().enumerate().take(interior).skip(1) {
            topology.set_oms_ref(*key, OmsRef { oms_id: oms.oms_id, position });
        }
    }

    link_reversed_oms(topology, &mut oms_list)?;

    log::info!("Built {} OMS from {} switches.", oms_list.len(), topology.switches().len());

    Ok(oms_list)
}

fn walk_all_sections(topology: &TopologyGraph, spectrum: &SpectrumConfig) -> Result<Vec<Oms>> {
    let empty_bitmap = spectrum.empty_bitmap()?;
    let hop_limit = topology.element_count();

    let mut oms_list: Vec<Oms> = Vec::new();
    let mut owner: HashMap<ElementKey, OmsId> = HashMap::new();

    for switch in topology.switches() {
        let switch_id = element_id(topology, switch)?;

        for link in topology.outgoing(switch) {
            if topology.kind_of(link.to) == Some(ElementKind::Transceiver) {
                log::debug!("Add/drop link {} -> {} opens no OMS.", switch_id, element_id(topology, link.to)?);
                continue;
            }

            let oms_id = oms_list.len();
            let mut oms = Oms::new(oms_id, empty_bitmap.clone());
            oms.add_element(switch, switch_id.clone());

            walk_section(topology, &mut oms, link.to, hop_limit, &mut owner)?;

            log::debug!("OMS {}: {}", oms_id, oms.el_id_list.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(" -> "));
            oms_list.push(oms);
        }
    }

    Ok(oms_list)
}

fn element_id(topology: &TopologyGraph, key: ElementKey) -> Result<ElementId> {
    topology.id_of(key).cloned().ok_or_else(|| Error::TopologyError("Element key does not belong to this topology.".to_string()))
}

/// Follows the chain starting at `start` until a switch is reached.
fn walk_section(
    topology: &TopologyGraph,
    oms: &mut Oms,
    start: ElementKey,
    hop_limit: usize,
    owner: &mut HashMap<ElementKey, OmsId>,
) -> Result<()> {
    let mut current = start;
    let mut hops: usize = 0;

    loop {
        if hops > hop_limit {
            return Err(Error::TopologyError(format!(
                "OMS {} starting at {} does not reach a switch within {} hops.",
                oms.oms_id, oms.el_id_list[0], hop_limit
            )));
        }

        let element = topology
            .element_by_key(current)
            .ok_or_else(|| Error::TopologyError("Element key does not belong to this topology.".to_string()))?;

        if element.is_switch() {
            oms.add_element(current, element.id.clone());
            return Ok(());
        }

        if element.kind == ElementKind::Transceiver {
            return Err(Error::TopologyError(format!(
                "OMS {} starting at {} reaches transceiver {} before a switch.",
                oms.oms_id, oms.el_id_list[0], element.id
            )));
        }

        if let Some(other) = owner.get(&current) {
            let reason = if *other == oms.oms_id { "loops back to".to_string() } else { format!("merges into OMS {} at", other) };
            return Err(Error::TopologyError(format!("OMS {} starting at {} {} element {}.", oms.oms_id, oms.el_id_list[0], reason, element.id)));
        }

        owner.insert(current, oms.oms_id);
        oms.add_element(current, element.id.clone());

        let outgoing = topology.outgoing(current);
        if outgoing.len() != 1 {
            return Err(Error::TopologyError(format!(
                "Element {} in OMS {} has {} outgoing links, expected exactly one.",
                element.id,
                oms.oms_id,
                outgoing.len()
            )));
        }

        current = outgoing[0].to;
        hops += 1;
    }
}

/// Finds, for every OMS, the section running backwards between the same two switches
/// with mirrored element kinds, and registers the interior elements as reverse pairs.
fn link_reversed_oms(topology: &mut TopologyGraph, oms_list: &mut [Oms]) -> Result<()> {
    let mut pairs: Vec<(OmsId, OmsId)> = Vec::new();
    let mut paired: Vec<bool> = vec![false; oms_list.len()];

    for forward in 0..oms_list.len() {
        if paired[forward] {
            continue;
        }

        let candidate = (0..oms_list.len()).find(|backward| {
            *backward != forward && !paired[*backward] && is_mirror(topology, &oms_list[forward], &oms_list[*backward])
        });

        if let Some(backward) = candidate {
            paired[forward] = true;
            paired[backward] = true;
            pairs.push((forward, backward));
        }
    }

    for (forward, backward) in pairs {
        oms_list[forward].reversed_oms = Some(backward);
        oms_list[backward].reversed_oms = Some(forward);

        let forward_ids = oms_list[forward].el_id_list.clone();
        let backward_ids = &oms_list[backward].el_id_list;

        for (a, b) in forward_ids.iter().zip(backward_ids.iter().rev()) {
            topology.register_reverse_pair(a, b)?;
        }
    }

    let unpaired = paired.iter().filter(|p| !**p).count();
    if unpaired > 0 {
        log::warn!("{} OMS have no reverse-direction counterpart.", unpaired);
    }

    Ok(())
}

fn is_mirror(topology: &TopologyGraph, forward: &Oms, backward: &Oms) -> bool {
    if forward.len() != backward.len() || forward.first() != backward.last() || forward.last() != backward.first() {
        return false;
    }

    forward.el_list.iter().zip(backward.el_list.iter().rev()).all(|(a, b)| {
        let (Some(a_element), Some(b_element)) = (topology.element_by_key(*a), topology.element_by_key(*b)) else {
            return false;
        };

        if a_element.kind != b_element.kind {
            return false;
        }

        // A declared pairing must not be contradicted.
        let forward_ok = topology.reverse_of(&a_element.id).is_none_or(|reverse| reverse == &b_element.id);
        let backward_ok = topology.reverse_of(&b_element.id).is_none_or(|reverse| reverse == &a_element.id);

        forward_ok && backward_ok
    })
}

/// Index from each OMS link to its OMS id.
pub fn oms_link_index(oms_list: &[Oms]) -> OmsLinkIndex {
    let mut index = OmsLinkIndex::new();
    for oms in oms_list {
        for link in oms.links() {
            index.insert(link, oms.oms_id);
        }
    }
    index
}

/// Widens every bitmap to the union of all usable bands.
///
/// The resulting lower bound is the minimum of all `freq_index_min`, the upper bound the
/// maximum of all `freq_index_max`. Bounds only ever widen; existing occupancy is kept.
pub fn align_grids(oms_list: &mut [Oms]) -> Result<()> {
    let Some(freq_index_min) = oms_list.iter().map(|oms| oms.spectrum_bitmap().freq_index_min()).min() else {
        return Ok(());
    };
    let freq_index_max = oms_list.iter().map(|oms| oms.spectrum_bitmap().freq_index_max()).max().unwrap_or(freq_index_min);

    for oms in oms_list.iter_mut() {
        let bitmap = oms.spectrum_bitmap();
        if bitmap.freq_index_min() == freq_index_min && bitmap.freq_index_max() == freq_index_max {
            continue;
        }

        log::debug!(
            "Aligning OMS {} from [{}, {}] to [{}, {}].",
            oms.oms_id,
            bitmap.freq_index_min(),
            bitmap.freq_index_max(),
            freq_index_min,
            freq_index_max
        );
        oms.widen_spectrum(freq_index_min, freq_index_max)?;
    }

    Ok(())
}
