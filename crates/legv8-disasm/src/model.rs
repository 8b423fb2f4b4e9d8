use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use legv8_sim::disasm::{fmt_decoded, group_bits};
use legv8_sim::Program;

use crate::analyze::{Analysis, EdgeOut};

#[derive(Debug, Clone, Serialize)]
pub struct InsnOut {
    pub address: u32,
    pub bits: String,
    pub format: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataOut { pub address: u32, pub raw: String, pub value: i32 }

#[derive(Debug, Clone, Serialize)]
pub struct LabelKV { pub addr: u32, pub name: String }

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub instructions: Vec<InsnOut>,
    pub data: Vec<DataOut>,
    pub edges: Vec<EdgeOut>,
    pub labels: Vec<LabelKV>,
}

pub fn load_source(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Program::from_source(&text)?)
}

pub fn build_report(prog: &Program, analysis: &Analysis) -> Report {
    let instructions = prog
        .instructions
        .iter()
        .map(|i| InsnOut {
            address: i.address,
            bits: group_bits(&i.raw, i.format()),
            format: i.format().name(),
            text: fmt_decoded(&i.decoded),
            target: analysis.target_of(i.address),
        })
        .collect();
    let data = prog
        .data
        .iter()
        .map(|w| DataOut { address: w.address, raw: w.raw.clone(), value: w.value })
        .collect();
    let labels = analysis.labels.iter().map(|(&addr, name)| LabelKV { addr, name: name.clone() }).collect();
    Report { instructions, data, edges: analysis.edges.iter().map(EdgeOut::from).collect(), labels }
}
