//! k-way mapping driver.
//!
//! Phase 1 walks the architecture's bipartition tree breadth first: each
//! live domain with more than one terminal is split, the subgraph currently
//! mapped to it is 2-way partitioned toward the weight ratio of the two
//! halves (with external gains pulling frontier vertices toward the domains
//! their outside neighbours already live in), and the part array is updated.
//! Phase 2 iterates the band diffusion refiner around the frontier,
//! accepting a pass only when it improves the communication cost without
//! breaking the balance bound.
//!
//! # Example
//!
//! ```no_run
//! use lodestone::{Arch, Context, Graph, kway};
//!
//! # fn demo(graph: Graph) -> lodestone::Result<()> {
//! let ctx = Context::new();
//! let arch = Arch::mesh2(2, 2)?;
//! let mapping = kway::map_graph(&ctx, &graph, arch)?;
//! println!("cost {}", mapping.comm_load(&graph));
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use log::debug;

use crate::arch::Arch;
use crate::bipart::{BipartParams, bipart_multilevel};
use crate::config::{DblOption, IntOption};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::band::extract_band;
use crate::kway::KwayGraph;
use crate::kway::df::{DfParams, diffuse_band};
use crate::mapping::Mapping;

/// Optional inputs of a mapping run.
#[derive(Clone, Debug, Default)]
pub struct MapOptions {
    /// Fixed terminal per vertex (`-1` free).
    pub fixtab: Option<Vec<i64>>,
    /// Previous mapping, as terminal numbers, for remapping runs.
    pub parotab: Option<Vec<i64>>,
    /// Per-vertex migration load (with `parotab`).
    pub vmlotab: Option<Vec<i64>>,
    /// Cost coefficient of cut traffic.
    pub crloval: i64,
    /// Cost coefficient of migration traffic.
    pub cmloval: i64,
}

/// Map `graph` onto `arch` with default options.
pub fn map_graph(ctx: &Context, graph: &Graph, arch: Arch) -> Result<Mapping> {
    map_graph_with(ctx, graph, arch, &MapOptions::default())
}

/// k-way partition into `partnbr` parts: mapping onto a complete graph.
/// Returns the terminal number of every vertex.
pub fn part_graph(ctx: &Context, graph: &Graph, partnbr: i64) -> Result<Vec<i64>> {
    let arch = Arch::cmplt(partnbr)?;
    let mapping = map_graph(ctx, graph, arch)?;
    Ok((0..graph.vertnbr()).map(|v| mapping.term_num(v)).collect())
}

/// Map `graph` onto `arch` with explicit options.
pub fn map_graph_with(
    ctx: &Context,
    graph: &Graph,
    arch: Arch,
    options: &MapOptions,
) -> Result<Mapping> {
    const ROUTINE: &str = "map_graph";
    if arch.is_variable() {
        return Err(Error::UnsupportedConfig(
            "k-way mapping requires a fixed-size architecture".into(),
        )
        .report(ROUTINE));
    }
    if let Some(fixtab) = &options.fixtab {
        let termnbr = arch.term_nbr();
        if fixtab.iter().any(|&t| t >= termnbr) {
            return Err(
                Error::InvalidArgument("fixed terminal out of range".into()).report(ROUTINE)
            );
        }
    }

    let mut mapping = Mapping::init(graph, arch, None)?;
    if let Some(fixtab) = &options.fixtab {
        mapping.set_fixed(fixtab.clone())?;
    }
    map_compute(ctx, graph, &mut mapping, options)?;
    Ok(mapping)
}

/// Compute (or recompute) a mapping in place. On error the mapping is
/// rolled back to its pre-call state: the saved part array and live-domain
/// table are restored.
pub fn map_compute(
    ctx: &Context,
    graph: &Graph,
    mapping: &mut Mapping,
    options: &MapOptions,
) -> Result<()> {
    ctx.random_reset();
    let saved_domntab = mapping.domains().to_vec();
    let saved_parttab = mapping.parts().to_vec();
    match run_phases(ctx, graph, mapping.clone(), options) {
        Ok(computed) => {
            *mapping = computed;
            Ok(())
        }
        Err(err) => {
            mapping.rollback(saved_domntab, saved_parttab);
            Err(err)
        }
    }
}

fn run_phases(
    ctx: &Context,
    graph: &Graph,
    mut mapping: Mapping,
    options: &MapOptions,
) -> Result<Mapping> {
    // Phase 1: recursive bipartition, breadth first over the domain tree.
    let mut queue: VecDeque<usize> = VecDeque::new();
    queue.push_back(0);
    while let Some(slot) = queue.pop_front() {
        let Some((slot0, slot1)) = mapping.split(slot)? else {
            continue; // terminal domain
        };
        bipart_domain(ctx, graph, &mut mapping, slot0, slot1)?;
        queue.push_back(slot0);
        queue.push_back(slot1);
    }
    debug!(
        "initial mapping: {} domains, cost {}",
        mapping.domnnbr(),
        mapping.comm_load(graph)
    );

    // Phase 2: band diffusion around the frontier.
    let mut kgraph = KwayGraph::new(graph, mapping);
    if options.crloval > 0 {
        kgraph.crloval = options.crloval;
    }
    if options.cmloval > 0 {
        kgraph.cmloval = options.cmloval;
    }
    if let Some(parotab) = &options.parotab {
        kgraph.parotab = Some(parotab.clone());
    }
    kgraph.vmlotab = options.vmlotab.clone();
    refine_kway(ctx, &mut kgraph)?;

    kgraph.mapping.check(graph)?;
    Ok(kgraph.mapping)
}

/// 2-way partition the subgraph of `slot0` toward the weight ratio of the
/// freshly split pair, then move the part-1 vertices over to `slot1`.
fn bipart_domain(
    ctx: &Context,
    graph: &Graph,
    mapping: &mut Mapping,
    slot0: usize,
    slot1: usize,
) -> Result<()> {
    let induced = graph.induce_part(mapping.parts(), slot0 as i64)?;
    let sub = &induced.graph;
    if sub.vertnbr() == 0 {
        return Ok(());
    }
    let arch = mapping.arch();
    let dom0 = mapping.domain(slot0).clone();
    let dom1 = mapping.domain(slot1).clone();
    let wght0 = arch.dom_wght(&dom0);
    let wght1 = arch.dom_wght(&dom1);
    let load0avg =
        ((sub.velosum() as f64 * wght0 as f64) / (wght0 + wght1).max(1) as f64).round() as i64;
    let velomax = (0..sub.vertnbr()).map(|v| sub.velo(v)).max().unwrap_or(1);
    let dltmax = ((ctx.values().dbl(DblOption::ImbalanceRatio) * load0avg as f64) as i64)
        .max(velomax);

    // External gains: edges leaving the subgraph pull their vertex toward
    // whichever half sits closer to the neighbour's domain. Pure
    // partitioning architectures have no external gains.
    let mut veextab = None;
    let mut commloadextn0 = 0i64;
    if !arch.is_part() {
        let mut veex = vec![0i64; sub.vertnbr()];
        for (local, &v) in induced.orgtab.iter().enumerate() {
            for e in graph.edge_range(v) {
                let w = graph.edge_target(e);
                let wslot = mapping.part(w);
                if wslot == slot0 as i64 || wslot < 0 {
                    continue;
                }
                let domw = mapping.domain(wslot as usize);
                let edlo = graph.edlo(e);
                veex[local] += edlo * (arch.dom_dist(&dom1, domw) - arch.dom_dist(&dom0, domw));
                commloadextn0 += edlo * arch.dom_dist(&dom0, domw);
            }
        }
        veextab = Some(veex);
    }

    // Fixed vertices pin their side when their terminal falls in one half.
    let fixtab = mapping.fixed().map(|fixed| {
        induced
            .orgtab
            .iter()
            .map(|&v| match fixed[v] {
                t if t < 0 => -1i8,
                t => {
                    let term = arch.dom_term(t).expect("checked terminal");
                    if arch.dom_incl(&dom0, &term) {
                        0
                    } else if arch.dom_incl(&dom1, &term) {
                        1
                    } else {
                        -1
                    }
                }
            })
            .collect()
    });

    let params = BipartParams {
        domdist: arch.dom_dist(&dom0, &dom1).max(1),
        veextab,
        fixtab,
        commloadextn0,
        ..BipartParams::new(load0avg, dltmax)
    };
    let sides = bipart_multilevel(ctx, sub, &params)?;
    for (local, side) in sides.into_iter().enumerate() {
        if side == 1 {
            mapping.set_part(induced.orgtab[local], slot1 as i64);
        }
    }
    Ok(())
}

/// Phase 2: iterate band extraction and diffusion, keeping a pass only if
/// it pays for itself.
fn refine_kway(ctx: &Context, kgraph: &mut KwayGraph<'_>) -> Result<()> {
    let passnbr = ctx.values().int(IntOption::KwayPassCount).max(0);
    let layers = ctx.values().int(IntOption::BandLayerCount).max(1) as usize;
    let balmax = ctx.values().dbl(DblOption::ImbalanceRatio);
    let domnnbr = kgraph.mapping.domnnbr();
    if domnnbr < 2 {
        return Ok(());
    }

    // The previous mapping arrives as terminal numbers; the band state
    // works in live-domain slots.
    let paroslot: Option<Vec<i64>> = kgraph.parotab.as_ref().map(|parotab| {
        let term2slot: std::collections::HashMap<i64, i64> = kgraph
            .mapping
            .domains()
            .iter()
            .enumerate()
            .map(|(slot, dom)| (kgraph.mapping.arch().dom_num(dom), slot as i64))
            .collect();
        parotab
            .iter()
            .map(|&t| term2slot.get(&t).copied().unwrap_or(-1))
            .collect()
    });

    for pass in 0..passnbr {
        if kgraph.fronttab.is_empty() {
            break;
        }
        let band = match extract_band(
            kgraph.graph,
            kgraph.mapping.parts(),
            &kgraph.fronttab,
            layers,
            domnnbr,
            &kgraph.compload(),
        ) {
            Ok(band) => band,
            Err(err) if err.is_recoverable() => break,
            Err(err) => return Err(err),
        };

        // Previous parts seen band-locally: the migration bias pulls
        // toward the old mapping when one was supplied.
        let bandparo: Option<Vec<i64>> = paroslot.as_ref().map(|parotab| {
            let mut tab: Vec<i64> = band.orgtab.iter().map(|&v| parotab[v]).collect();
            tab.extend(0..band.domnnbr as i64);
            tab
        });
        let bandvmlo: Option<Vec<i64>> = kgraph.vmlotab.as_ref().map(|vmlotab| {
            let mut tab: Vec<i64> = band.orgtab.iter().map(|&v| vmlotab[v]).collect();
            tab.extend(std::iter::repeat_n(0, band.domnnbr));
            tab
        });

        let Some(bandpart) = diffuse_band(
            ctx,
            &band,
            &kgraph.mapping,
            &kgraph.comploadavg,
            &DfParams {
                parotab: bandparo.as_deref(),
                vmlotab: bandvmlo.as_deref(),
                crloval: kgraph.crloval,
                cmloval: kgraph.cmloval,
            },
        ) else {
            debug!("diffusion pass {pass} aborted");
            break;
        };

        // Tentative write-back, kept only when it pays. Fixed vertices
        // stay where the initial mapping pinned them.
        let commload0 = kgraph.commload;
        let imbalance0 = kgraph.imbalance();
        let saved: Vec<i64> = band
            .orgtab
            .iter()
            .map(|&v| kgraph.mapping.part(v))
            .collect();
        let pinned: Option<Vec<bool>> = kgraph
            .mapping
            .fixed()
            .map(|fixtab| band.orgtab.iter().map(|&v| fixtab[v] >= 0).collect());
        for (local, &v) in band.orgtab.iter().enumerate() {
            if pinned.as_ref().is_none_or(|p| !p[local]) {
                kgraph.mapping.set_part(v, bandpart[local]);
            }
        }
        kgraph.recompute();
        let accept = kgraph.commload < commload0
            && (kgraph.imbalance() <= balmax || kgraph.imbalance() <= imbalance0);
        if !accept {
            for (local, &v) in band.orgtab.iter().enumerate() {
                kgraph.mapping.set_part(v, saved[local]);
            }
            kgraph.recompute();
            debug!("diffusion pass {pass} discarded");
            break;
        }
        debug!(
            "diffusion pass {pass}: cost {} -> {}",
            commload0, kgraph.commload
        );
    }
    Ok(())
}
