use lodestone::{Arch, ArchDom};

/// Recursive bipartition down to the leaves must enumerate every terminal
/// exactly once, with consecutive canonical numbers.
fn collect_terminals(arch: &Arch, dom: &ArchDom, out: &mut Vec<i64>) {
    match arch.dom_bipart(dom) {
        None => {
            assert_eq!(arch.dom_size(dom), 1);
            out.push(arch.dom_num(dom));
        }
        Some((d0, d1)) => {
            assert!(arch.dom_incl(dom, &d0));
            assert!(arch.dom_incl(dom, &d1));
            assert_eq!(arch.dom_size(&d0) + arch.dom_size(&d1), arch.dom_size(dom));
            // Interval-encoded variants keep the canonical number in the
            // first half, which recursive bipartition relies on.
            if !matches!(arch, Arch::Sub(_) | Arch::Deco(_)) {
                assert_eq!(arch.dom_num(&d0), arch.dom_num(dom));
            }
            collect_terminals(arch, &d0, out);
            collect_terminals(arch, &d1, out);
        }
    }
}

fn all_archs() -> Vec<Arch> {
    vec![
        Arch::cmplt(7).unwrap(),
        Arch::cmpltw(&[5, 1, 3, 2, 8, 1]).unwrap(),
        Arch::hcub(3).unwrap(),
        Arch::mesh2(3, 4).unwrap(),
        Arch::mesh3(2, 3, 2).unwrap(),
        Arch::torus(&[4, 3]).unwrap(),
        Arch::tleaf(&[2, 3], &[5, 2]).unwrap(),
        Arch::sub(Arch::mesh2(3, 3).unwrap(), &[0, 2, 4, 6, 8]).unwrap(),
        Arch::deco(
            &[2, 1, 1, 3],
            &[
                0, 1, 2, 3, //
                1, 0, 1, 2, //
                2, 1, 0, 1, //
                3, 2, 1, 0,
            ],
        )
        .unwrap(),
    ]
}

#[test]
fn bipartition_covers_all_terminals() {
    for arch in all_archs() {
        let mut terms = Vec::new();
        collect_terminals(&arch, &arch.first_domain(), &mut terms);
        assert_eq!(terms.len() as i64, arch.term_nbr());
        terms.sort_unstable();
        let expect: Vec<i64> = (0..arch.term_nbr()).collect();
        assert_eq!(terms, expect, "terminals of {arch:?}");
    }
}

#[test]
fn distance_properties() {
    for arch in all_archs() {
        let n = arch.term_nbr();
        for a in 0..n {
            let da = arch.dom_term(a).unwrap();
            assert_eq!(arch.dom_dist(&da, &da), 0);
            for b in 0..n {
                let db = arch.dom_term(b).unwrap();
                let d01 = arch.dom_dist(&da, &db);
                assert!(d01 >= 0);
                assert_eq!(d01, arch.dom_dist(&db, &da), "symmetry in {arch:?}");
                if arch.is_part() {
                    assert!(d01 <= 1);
                }
            }
        }
    }
}

#[test]
fn terminal_numbers_round_trip() {
    for arch in all_archs() {
        for t in 0..arch.term_nbr() {
            let dom = arch.dom_term(t).unwrap();
            assert_eq!(arch.dom_num(&dom), t);
            assert_eq!(arch.dom_size(&dom), 1);
        }
        assert!(arch.dom_term(arch.term_nbr()).is_err());
    }
}

#[test]
fn mesh_distance_is_l1() {
    let arch = Arch::mesh2(4, 4).unwrap();
    let a = arch.dom_term(0).unwrap(); // (0, 0)
    let b = arch.dom_term(1 + 2 * 4).unwrap(); // (1, 2)
    assert_eq!(arch.dom_dist(&a, &b), 3);
}

#[test]
fn torus_distance_wraps() {
    let arch = Arch::torus(&[5]).unwrap();
    let a = arch.dom_term(0).unwrap();
    let b = arch.dom_term(4).unwrap();
    assert_eq!(arch.dom_dist(&a, &b), 1);
}

#[test]
fn hcub_distance_is_hamming() {
    let arch = Arch::hcub(4).unwrap();
    let a = arch.dom_term(0b0000).unwrap();
    let b = arch.dom_term(0b1011).unwrap();
    assert_eq!(arch.dom_dist(&a, &b), 3);
}

#[test]
fn tleaf_distance_is_topmost_link() {
    // Two levels: fan-out 2 with link cost 5, then fan-out 3 with cost 2.
    let arch = Arch::tleaf(&[2, 3], &[5, 2]).unwrap();
    let a = arch.dom_term(0).unwrap();
    // Same level-0 subtree: only the cheap link is crossed.
    assert_eq!(arch.dom_dist(&a, &arch.dom_term(2).unwrap()), 2);
    // Different subtrees: the top link dominates.
    assert_eq!(arch.dom_dist(&a, &arch.dom_term(3).unwrap()), 5);
}

#[test]
fn cmpltw_bipartition_balances_weights() {
    let wghts = [7i64, 1, 1, 1, 4, 2];
    let arch = Arch::cmpltw(&wghts).unwrap();
    let top = arch.first_domain();
    let (d0, d1) = arch.dom_bipart(&top).unwrap();
    let (w0, w1) = (arch.dom_wght(&d0), arch.dom_wght(&d1));
    assert_eq!(w0 + w1, 16);
    assert!(w0 >= w1, "first half carries the heavier load");
    assert!((w0 - w1).abs() <= 2, "greedy split stays near balance");
}

#[test]
fn sub_arch_keeps_parent_geometry() {
    // Corners of a 3x3 mesh: distances come from the parent mesh.
    let arch = Arch::sub(Arch::mesh2(3, 3).unwrap(), &[0, 2, 6, 8]).unwrap();
    assert_eq!(arch.term_nbr(), 4);
    let d0 = arch.dom_term(0).unwrap();
    for t in 1..4 {
        let dt = arch.dom_term(t).unwrap();
        assert!(arch.dom_dist(&d0, &dt) >= 2);
    }
}

#[test]
fn weight_equals_size_for_unweighted() {
    for arch in [Arch::cmplt(6).unwrap(), Arch::mesh2(2, 3).unwrap()] {
        let top = arch.first_domain();
        assert_eq!(arch.dom_wght(&top), arch.dom_size(&top));
    }
}

#[test]
fn arch_io_round_trip() -> anyhow::Result<()> {
    for arch in all_archs() {
        let mut text = Vec::new();
        arch.save(&mut text)?;
        let back = Arch::load(text.as_slice())?;
        assert_eq!(back.term_nbr(), arch.term_nbr());
        // Same terminal set and same pairwise distances.
        for a in 0..arch.term_nbr() {
            let da = arch.dom_term(a)?;
            let ba = back.dom_term(a)?;
            for b in 0..arch.term_nbr() {
                let db = arch.dom_term(b)?;
                let bb = back.dom_term(b)?;
                assert_eq!(arch.dom_dist(&da, &db), back.dom_dist(&ba, &bb));
            }
        }
    }
    Ok(())
}

#[test]
fn coarsen_match_pairs_terminals() -> anyhow::Result<()> {
    let (coarse, multtab) = Arch::cmplt(8)?.coarsen_match()?;
    assert_eq!(coarse.term_nbr(), 4);
    assert_eq!(multtab.len(), 4);
    let mut seen: Vec<i64> = multtab.iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..8).collect::<Vec<_>>());

    let (coarsew, multw) = Arch::cmpltw(&[3, 1, 4, 1])?.coarsen_match()?;
    assert_eq!(coarsew.term_nbr(), 2);
    assert_eq!(multw.len(), 2);

    let (coarseh, multh) = Arch::hcub(3)?.coarsen_match()?;
    assert_eq!(coarseh.term_nbr(), 4);
    assert_eq!(multh.len(), 4);
    Ok(())
}
