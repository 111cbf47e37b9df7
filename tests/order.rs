mod common;

use common::{grid2, grid3, path_graph};
use lodestone::{CblkKind, Context, HaloGraph, IntOption, order};

fn deterministic_ctx() -> Context {
    let mut ctx = Context::new();
    ctx.set_int(IntOption::DeterministicMode, 1);
    ctx
}

fn assert_permutation(permtab: &[usize], peritab: &[usize]) {
    let n = permtab.len();
    assert_eq!(peritab.len(), n);
    let mut seen = vec![false; n];
    for &v in peritab {
        assert!(v < n);
        assert!(!seen[v], "vertex {v} ordered twice");
        seen[v] = true;
    }
    for (v, &rank) in permtab.iter().enumerate() {
        assert_eq!(peritab[rank], v);
    }
}

#[test]
fn ordering_is_a_permutation() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    for graph in [path_graph(30), grid2(7, 7), grid3(3, 3, 3)] {
        let ordering = order::order_graph(&ctx, &graph)?;
        assert_permutation(&ordering.permtab, &ordering.peritab);
    }
    Ok(())
}

#[test]
fn dissection_orders_separators_last() -> anyhow::Result<()> {
    let mut ctx = deterministic_ctx();
    ctx.set_int(IntOption::CoarsenVertexCutoff, 10);
    let g = grid3(3, 3, 3);
    let ordering = order::order_graph(&ctx, &g)?;
    assert_permutation(&ordering.permtab, &ordering.peritab);

    // The root must have dissected 27 vertices into halves and a
    // separator placed at the very end of the permutation.
    let root = &ordering.cblktab[0];
    assert_eq!(root.kind, CblkKind::Nested);
    assert_eq!(root.vnodnbr, 27);
    let sep = ordering
        .cblktab
        .iter()
        .find(|c| c.kind == CblkKind::Separator && c.parent == 0)
        .expect("root separator block");
    assert_eq!(sep.ordenum + sep.vnodnbr, 27, "separator fills the tail");
    // A planar cut of the 3x3x3 grid: at least one full 3x3 plane worth
    // of vertices, but no runaway separator.
    assert!(sep.vnodnbr >= 3 && sep.vnodnbr <= 13, "separator size {}", sep.vnodnbr);

    // Every other block lies under the root.
    for cblk in &ordering.cblktab[1..] {
        assert!(cblk.parent >= 0);
    }
    Ok(())
}

#[test]
fn separator_really_separates() -> anyhow::Result<()> {
    let mut ctx = deterministic_ctx();
    ctx.set_int(IntOption::CoarsenVertexCutoff, 10);
    let g = grid2(8, 8);
    let ordering = order::order_graph(&ctx, &g)?;
    let root = &ordering.cblktab[0];
    if root.kind != CblkKind::Nested {
        return Ok(()); // degenerate fallback, nothing to verify
    }
    let sep = ordering
        .cblktab
        .iter()
        .find(|c| c.kind == CblkKind::Separator && c.parent == 0)
        .expect("root separator block");
    // Vertices of the two halves precede the separator range; no edge
    // may join the halves directly.
    let half0: Vec<usize> = (0..sep.ordenum)
        .map(|r| ordering.peritab[r])
        .collect();
    let split = ordering.cblktab[1].vnodnbr; // first half of the root
    let first: Vec<usize> = half0[..split].to_vec();
    let second: Vec<usize> = half0[split..].to_vec();
    let in_second = |v: usize| second.contains(&v);
    for &v in &first {
        for &w in g.neighbors(v) {
            assert!(
                !in_second(w),
                "edge ({v}, {w}) crosses the root separator"
            );
        }
    }
    Ok(())
}

#[test]
fn halo_minimum_fill_orders_only_anchors() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    // A 4-path where the last vertex is halo.
    let g = path_graph(4);
    let hg = HaloGraph::from_graph(g);
    let (sub, orgtab) = hg.induce_list(&[0, 1, 2])?;
    assert_eq!(sub.vnohnbr(), 3);
    assert_eq!(sub.halo_nbr(), 1);
    let ordering = order::order_halo(&ctx, &sub)?;
    assert_eq!(ordering.vertnbr(), 3);
    assert_permutation(&ordering.permtab, &ordering.peritab);
    assert_eq!(orgtab.len(), 4);
    Ok(())
}

#[test]
fn column_counts_match_the_permuted_matrix() -> anyhow::Result<()> {
    let ctx = deterministic_ctx();
    let g = grid2(5, 5);
    let ordering = order::order_graph(&ctx, &g)?;
    assert_eq!(ordering.colcnttab.len(), 25);
    let total: i64 = ordering.colcnttab.iter().sum();
    // Diagonal plus one endpoint of every edge.
    assert_eq!(total, 25 + (g.edgenbr() / 2) as i64);
    assert!(ordering.colcnttab.iter().all(|&c| c >= 1));
    Ok(())
}

#[test]
fn path_ordering_has_low_fill() -> anyhow::Result<()> {
    // Minimum fill on a path eliminates from the ends inward, so every
    // column keeps at most one sub-diagonal entry.
    let ctx = deterministic_ctx();
    let g = path_graph(20);
    let ordering = order::order_graph(&ctx, &g)?;
    assert!(ordering.colcnttab.iter().all(|&c| c <= 2));
    Ok(())
}
