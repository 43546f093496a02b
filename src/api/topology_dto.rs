use serde::{Deserialize, Serialize};

/// Topology description: elements plus unidirectional connections between them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopologyDto {
    pub elements: Vec<ElementDto>,
    pub connections: Vec<ConnectionDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElementDto {
    pub uid: String,

    /// One of `Transceiver`, `Roadm`, `Edfa`, `Fiber`, `Fused`.
    #[serde(rename = "type")]
    pub typ: String,

    #[serde(default)]
    pub params: Option<ElementParamsDto>,

    /// Uid of the element carrying the opposite direction of the same physical
    /// equipment, when known.
    #[serde(default)]
    pub reverse: Option<String>,
}

/// Scalar parameters. They are carried for reporting only.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ElementParamsDto {
    #[serde(default)]
    pub gain: Option<f64>,
    #[serde(default)]
    pub loss: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionDto {
    #[serde(alias = "fromNode")]
    pub from_node: String,
    #[serde(alias = "toNode")]
    pub to_node: String,

    #[serde(default)]
    pub weight: Option<f64>,
}
