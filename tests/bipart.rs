mod common;

use common::{grid2, path_graph, two_cliques};
use lodestone::{
    BipartGraph, BipartParams, Context, IntOption, Strategy, bipart_multilevel,
};

fn deterministic_ctx() -> Context {
    let mut ctx = Context::new();
    ctx.set_int(IntOption::DeterministicMode, 1);
    ctx
}

#[test]
fn path_graph_splits_in_the_middle() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = path_graph(100);
    let sides = bipart_multilevel(&ctx, &g, &BipartParams::new(50, 1))?;

    let size0 = sides.iter().filter(|&&s| s == 0).count();
    assert_eq!(size0, 50);
    let cut: usize = (0..99).filter(|&v| sides[v] != sides[v + 1]).count();
    assert_eq!(cut, 1, "a path splits along a single edge");
    // The halves are contiguous runs.
    assert!(sides.windows(2).filter(|w| w[0] != w[1]).count() == 1);
    Ok(())
}

#[test]
fn disconnected_components_split_cleanly() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = two_cliques(10);
    let sides = bipart_multilevel(&ctx, &g, &BipartParams::new(10, 1))?;
    let size0 = sides.iter().filter(|&&s| s == 0).count();
    assert_eq!(size0, 10);
    // No edge crosses: each clique lands wholly on one side.
    for v in 0..20 {
        for &w in g.neighbors(v) {
            assert_eq!(sides[v], sides[w]);
        }
    }
    Ok(())
}

#[test]
fn refiners_preserve_active_graph_invariants() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = grid2(8, 8);
    let mut bgraph = BipartGraph::new(&g, 32, 2, 1, None, 0, None);
    // A deliberately bad start: checkerboard.
    for v in 0..64 {
        bgraph.parttab[v] = (((v % 8) + (v / 8)) % 2) as u8;
    }
    bgraph.recompute();
    bgraph.check()?;
    let start = bgraph.commload;

    lodestone::bipart::fm::bipart_fm(&ctx, &mut bgraph);
    bgraph.check()?;
    assert!(bgraph.commload <= start, "hill climbing never worsens cost");

    lodestone::bipart::ex::bipart_ex(&mut bgraph);
    bgraph.check()?;
    assert_eq!(bgraph.compload0dlt(), 0, "unit loads balance exactly");
    Ok(())
}

#[test]
fn exactifier_restores_balance() -> anyhow::Result<()> {
    let g = grid2(6, 6);
    let mut bgraph = BipartGraph::new(&g, 18, 1, 1, None, 0, None);
    // Start with a lopsided split: first column only.
    for v in 0..36 {
        bgraph.parttab[v] = if v % 6 == 0 { 0 } else { 1 };
    }
    bgraph.recompute();
    lodestone::bipart::ex::bipart_ex(&mut bgraph);
    bgraph.check()?;
    assert_eq!(bgraph.compload0dlt(), 0);
    Ok(())
}

#[test]
fn fixed_vertices_never_move() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = grid2(6, 6);
    // Pin the west edge to side 0 and the east edge to side 1.
    let fixtab: Vec<i8> = (0..36)
        .map(|v| match v % 6 {
            0 => 0,
            5 => 1,
            _ => -1,
        })
        .collect();
    let params = BipartParams {
        fixtab: Some(fixtab.clone()),
        ..BipartParams::new(18, 2)
    };
    let sides = bipart_multilevel(&ctx, &g, &params)?;
    for v in 0..36 {
        if fixtab[v] >= 0 {
            assert_eq!(sides[v], fixtab[v] as u8, "vertex {v} moved off its pin");
        }
    }
    Ok(())
}

#[test]
fn external_gains_pull_the_frontier() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = path_graph(8);
    // Strong external pull of the last vertices toward side 1.
    let mut veextab = vec![0i64; 8];
    veextab[7] = -100;
    veextab[0] = 100;
    let params = BipartParams {
        veextab: Some(veextab),
        ..BipartParams::new(4, 1)
    };
    let sides = bipart_multilevel(&ctx, &g, &params)?;
    assert_eq!(sides[0], 0, "vertex 0 is pulled toward side 0");
    assert_eq!(sides[7], 1, "vertex 7 is pulled toward side 1");
    Ok(())
}

#[test]
fn strategy_parsing() {
    assert!(Strategy::parse("gfx").is_ok());
    assert!(Strategy::parse("gfdx").is_ok());
    assert!(Strategy::parse("q").is_err());
    assert_eq!(Strategy::parse("gfx").unwrap(), Strategy::default_initial());
}

#[test]
fn diffusion_smoothing_never_worsens() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = grid2(8, 8);
    let mut bgraph = BipartGraph::new(&g, 32, 2, 1, None, 0, None);
    for v in 0..64 {
        bgraph.parttab[v] = u8::from(v % 8 >= 4);
    }
    bgraph.recompute();
    let start = bgraph.commload;
    lodestone::bipart::df::bipart_df(&ctx, &mut bgraph);
    bgraph.check()?;
    assert!(bgraph.commload <= start);
    Ok(())
}
