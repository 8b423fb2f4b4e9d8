use std::collections::BTreeMap;

use serde::Serialize;

use legv8_sim::program::WORD_BYTES;
use legv8_sim::{Decoded, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch }

impl EdgeKind {
    pub fn tag(self) -> &'static str {
        match self { EdgeKind::Fallthrough => "ft", EdgeKind::Branch => "br", EdgeKind::CondBranch => "cbr" }
    }
}

/// Control transfer between two addresses. `to` is signed because a branch
/// offset can point below address 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge { pub from: u32, pub to: i64, pub kind: EdgeKind, pub external: bool }

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOut { pub from: u32, pub to: i64, pub kind: String, pub external: bool }

impl From<&Edge> for EdgeOut {
    fn from(e: &Edge) -> Self {
        EdgeOut { from: e.from, to: e.to, kind: e.kind.tag().to_string(), external: e.external }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub edges: Vec<Edge>,
    /// Branch targets inside the instruction range, by address.
    pub labels: BTreeMap<u32, String>,
}

impl Analysis {
    /// In-range target of the branch at `addr`, if it has one.
    pub fn target_of(&self, addr: u32) -> Option<u32> {
        self.edges
            .iter()
            .find(|e| e.from == addr && e.kind != EdgeKind::Fallthrough && !e.external)
            .and_then(|e| u32::try_from(e.to).ok())
    }
}

pub fn analyze_program(prog: &Program) -> Analysis {
    let mut out = Analysis::default();
    let (Some(first), Some(last)) = (prog.instructions.first(), prog.instructions.last()) else {
        return out;
    };
    let (lo, hi) = (i64::from(first.address), i64::from(last.address));
    let in_range = |t: i64| t >= lo && t <= hi && (t - lo) % i64::from(WORD_BYTES) == 0;

    for (i, insn) in prog.instructions.iter().enumerate() {
        let pc = insn.address;
        let ft = prog.instructions.get(i + 1).map(|n| i64::from(n.address));
        let mut push = |to: i64, kind| out.edges.push(Edge { from: pc, to, kind, external: !in_range(to) });
        let rel = |offset: i32| i64::from(pc) + i64::from(offset) * i64::from(WORD_BYTES);
        match insn.decoded {
            Decoded::B { offset, .. } => push(rel(offset), EdgeKind::Branch),
            Decoded::Cb { offset, .. } => {
                push(rel(offset), EdgeKind::CondBranch);
                if let Some(ft) = ft { push(ft, EdgeKind::Fallthrough); }
            }
            Decoded::Break | Decoded::Invalid { .. } => {}
            _ => {
                if let Some(ft) = ft { push(ft, EdgeKind::Fallthrough); }
            }
        }
    }

    for e in &out.edges {
        if e.kind == EdgeKind::Fallthrough || e.external { continue; }
        if let Ok(to) = u32::try_from(e.to) {
            out.labels.entry(to).or_insert_with(|| format!("loc_{to}"));
        }
    }
    out
}
