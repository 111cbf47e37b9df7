mod common;

use common::{from_edges_weighted, grid2, path_graph};
use lodestone::{Error, Graph, HaloGraph, io};

#[test]
fn build_rejects_bad_input() {
    // Base value out of range.
    assert!(matches!(
        Graph::build(2, vec![0, 0], vec![], None, None),
        Err(Error::InvalidArgument(_))
    ));
    // Vertex array not spanning the edge array.
    assert!(matches!(
        Graph::build(0, vec![0, 1], vec![], None, None),
        Err(Error::InvalidArgument(_))
    ));
    // Non-positive loads.
    assert!(matches!(
        Graph::build(0, vec![0, 1, 2], vec![1, 0], Some(vec![1, 0]), None),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn check_accepts_well_formed_graphs() -> anyhow::Result<()> {
    grid2(5, 4).check()?;
    path_graph(17).check()?;
    from_edges_weighted(4, vec![(0, 1, 3), (1, 2, 2), (2, 3, 5), (3, 0, 1)], true).check()?;
    Ok(())
}

#[test]
fn check_catches_asymmetric_loads() {
    // Arc (0,1) carries load 2 one way and 3 the other.
    let g = Graph::build(
        0,
        vec![0, 1, 2],
        vec![1, 0],
        None,
        Some(vec![2, 3]),
    )
    .expect("structurally fine");
    assert!(matches!(g.check(), Err(Error::InconsistentState(_))));
}

#[test]
fn induction_preserves_invariants() -> anyhow::Result<()> {
    let g = grid2(6, 6);
    // Stripe the grid into three parts by column band.
    let parttab: Vec<i64> = (0..36).map(|v| ((v % 6) / 2) as i64).collect();
    for part in 0..3 {
        let induced = g.induce_part(&parttab, part)?;
        induced.graph.check()?;
        let expect = parttab.iter().filter(|&&p| p == part).count();
        assert_eq!(induced.graph.vertnbr(), expect);
        // Every induced edge must exist between the parent vertices.
        for v in 0..induced.graph.vertnbr() {
            for e in induced.graph.edge_range(v) {
                let w = induced.graph.edge_target(e);
                let pv = induced.orgtab[v];
                let pw = induced.orgtab[w];
                assert!(g.neighbors(pv).contains(&pw));
            }
        }
    }
    Ok(())
}

#[test]
fn induction_by_list_renumbers_densely() -> anyhow::Result<()> {
    let g = path_graph(10);
    let induced = g.induce_list(&[2, 3, 4, 7])?;
    assert_eq!(induced.graph.vertnbr(), 4);
    assert_eq!(induced.graph.edgenbr(), 4); // 2-3, 3-4, both arcs
    assert_eq!(induced.orgtab, vec![2, 3, 4, 7]);
    Ok(())
}

#[test]
fn graph_io_round_trip() -> anyhow::Result<()> {
    let g = from_edges_weighted(5, vec![(0, 1, 2), (1, 2, 1), (2, 3, 4), (3, 4, 1), (4, 0, 7)], true);
    let mut text = Vec::new();
    g.save(&mut text)?;
    let back = Graph::load(text.as_slice())?;
    back.check()?;
    assert_eq!(back.vertnbr(), g.vertnbr());
    assert_eq!(back.edgenbr(), g.edgenbr());
    assert_eq!(back.velosum(), g.velosum());
    assert_eq!(back.edlosum(), g.edlosum());
    for v in 0..g.vertnbr() {
        assert_eq!(back.neighbors(v), g.neighbors(v));
        let loads: Vec<i64> = g.edge_range(v).map(|e| g.edlo(e)).collect();
        let loads_back: Vec<i64> = back.edge_range(v).map(|e| back.edlo(e)).collect();
        assert_eq!(loads, loads_back);
    }
    Ok(())
}

#[test]
fn graph_io_round_trip_base_one() -> anyhow::Result<()> {
    let mut g = grid2(3, 3);
    g.set_baseval(1)?;
    let mut text = Vec::new();
    g.save(&mut text)?;
    let back = Graph::load(text.as_slice())?;
    assert_eq!(back.baseval(), 1);
    for v in 0..g.vertnbr() {
        assert_eq!(back.neighbors(v), g.neighbors(v));
    }
    Ok(())
}

#[test]
fn graph_io_with_labels() -> anyhow::Result<()> {
    // Vertices listed out of order, identified by label: a triangle.
    let text = "0\n3 6\n0 100\n2 2 0 1\n1 2 0 2\n0 2 1 2\n";
    let g = Graph::load(text.as_bytes())?;
    g.check()?;
    assert_eq!(g.vertnbr(), 3);
    assert_eq!(g.degree(0), 2);
    Ok(())
}

#[test]
fn graph_io_rejects_malformed_input() {
    for text in [
        "1\n",                    // bad version
        "0\n2 2\n3 000\n1 1\n1 0\n", // bad base
        "0\n2 4\n0 000\n1 1\n1 0\n", // arc count mismatch
        "0\n1 0\n0 00x\n0\n",        // bad token
    ] {
        assert!(matches!(
            Graph::load(text.as_bytes()),
            Err(Error::Io(_)) | Err(Error::InvalidArgument(_))
        ));
    }
}

#[test]
fn halo_io_round_trip() -> anyhow::Result<()> {
    // A path of three anchors with one halo vertex attached to anchor 2.
    let g = Graph::build(
        0,
        vec![0, 1, 3, 5, 6],
        vec![1, 0, 2, 1, 3, 2],
        None,
        None,
    )?;
    let hg = {
        // halo suffix of one vertex
        let mut text = Vec::new();
        let wrapped = HaloGraph::from_graph(g);
        let (induced, _) = wrapped.induce_list(&[0, 1, 2])?;
        induced.save(&mut text)?;
        HaloGraph::load(text.as_slice())?
    };
    assert_eq!(hg.vnohnbr(), 3);
    assert_eq!(hg.halo_nbr(), 1);
    Ok(())
}

#[test]
fn pair_file_round_trip() -> anyhow::Result<()> {
    let values = vec![3i64, 1, 4, 1, 5];
    let mut text = String::from("5\n");
    for (v, val) in values.iter().enumerate() {
        text.push_str(&format!("{v} {val}\n"));
    }
    let back = io::load_pairs(text.as_bytes(), 5, 0)?;
    assert_eq!(back, values);
    Ok(())
}

#[test]
fn graph_file_round_trip_on_disk() -> anyhow::Result<()> {
    let g = grid2(4, 3);
    let mut file = tempfile::NamedTempFile::new()?;
    g.save(file.as_file_mut())?;
    let back = Graph::load(std::fs::File::open(file.path())?)?;
    back.check()?;
    assert_eq!(back.vertnbr(), 12);
    assert_eq!(back.edgenbr(), g.edgenbr());
    Ok(())
}

#[test]
fn grid_counts_are_consistent() -> anyhow::Result<()> {
    let g = grid2(4, 4);
    g.check()?;
    assert_eq!(g.vertnbr(), 16);
    assert_eq!(g.edgenbr(), 48);
    assert_eq!(g.degrmax(), 4);
    Ok(())
}
