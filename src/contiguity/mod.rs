//! Pluggable contiguity enforcement for Hess models.
//!
//! Each enforcer consumes a column view of the model (per potential
//! center, one cell per unit) and either posts static flow constraints
//! (`shir`, `mcf`) or registers a lazy separator (`cut`, `lcut`) that
//! fences off disconnected pieces of a candidate district.

mod cuts;
mod flow;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::bail;

use crate::graph::Graph;
use crate::hess::Column;
use crate::mip::MipModel;

/// The four enforcement variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Contiguity {
    /// Single-commodity flow per potential center. Static; compact.
    #[default]
    Shir,
    /// Multi-commodity flow per (center, unit) pair. Static; tightest
    /// relaxation, largest model.
    Mcf,
    /// Lazy component cuts.
    Cut,
    /// Lazy component cuts with the separator pruned by the population
    /// ceiling.
    Lcut,
}

impl Contiguity {
    /// Install this enforcer on a model session over the given columns.
    pub(crate) fn install(
        self,
        model: &mut dyn MipModel,
        columns: Vec<Column>,
        graph: &Arc<Graph>,
        population: &[i64],
        upper: i64,
    ) {
        match self {
            Contiguity::Shir => flow::install_single_flow(model, &columns, graph),
            Contiguity::Mcf => flow::install_multi_flow(model, &columns, graph),
            Contiguity::Cut => model.add_separator(Box::new(cuts::ComponentCuts::new(
                columns,
                Arc::clone(graph),
                population.to_vec(),
                None,
            ))),
            Contiguity::Lcut => model.add_separator(Box::new(cuts::ComponentCuts::new(
                columns,
                Arc::clone(graph),
                population.to_vec(),
                Some(upper),
            ))),
        }
    }
}

impl FromStr for Contiguity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shir" => Ok(Contiguity::Shir),
            "mcf" => Ok(Contiguity::Mcf),
            "cut" => Ok(Contiguity::Cut),
            "lcut" => Ok(Contiguity::Lcut),
            other => bail!("unknown contiguity model '{other}' (expected shir, mcf, cut or lcut)"),
        }
    }
}

impl std::fmt::Display for Contiguity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Contiguity::Shir => "shir",
            Contiguity::Mcf => "mcf",
            Contiguity::Cut => "cut",
            Contiguity::Lcut => "lcut",
        };
        write!(f, "{name}")
    }
}
