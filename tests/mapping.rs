mod common;

use common::{grid2, path_graph};
use lodestone::{Arch, Error, Mapping};

#[test]
fn init_seeds_the_root_domain() -> anyhow::Result<()> {
    let g = path_graph(6);
    let arch = Arch::cmplt(4)?;
    let m = Mapping::init(&g, arch, None)?;
    assert_eq!(m.domnnbr(), 1);
    assert!(m.parts().iter().all(|&p| p == 0));
    m.check(&g)?;
    Ok(())
}

#[test]
fn split_allocates_a_new_slot() -> anyhow::Result<()> {
    let g = path_graph(4);
    let mut m = Mapping::init(&g, Arch::cmplt(4)?, None)?;
    let (i, j) = m.split(0)?.expect("four terminals split");
    assert_eq!((i, j), (0, 1));
    assert_eq!(m.domnnbr(), 2);
    // part entries are untouched by design
    assert!(m.parts().iter().all(|&p| p == 0));
    m.check(&g)?;
    Ok(())
}

#[test]
fn split_reports_leaves() -> anyhow::Result<()> {
    let g = path_graph(2);
    let mut m = Mapping::init(&g, Arch::cmplt(1)?, None)?;
    assert!(m.split(0)?.is_none());
    assert!(m.split(7).is_err());
    Ok(())
}

#[test]
fn repeated_splits_grow_the_table() -> anyhow::Result<()> {
    let g = path_graph(40);
    let mut m = Mapping::init(&g, Arch::cmplt(40)?, None)?;
    // Split breadth-first until every live domain is a terminal.
    let mut queue = std::collections::VecDeque::from([0usize]);
    while let Some(slot) = queue.pop_front() {
        if let Some((s0, s1)) = m.split(slot)? {
            queue.push_back(s0);
            queue.push_back(s1);
        }
    }
    assert_eq!(m.domnnbr(), 40);
    m.check(&g)?;
    Ok(())
}

#[test]
fn merge_folds_vertices_and_compacts() -> anyhow::Result<()> {
    let g = path_graph(6);
    let mut m = Mapping::init(&g, Arch::cmplt(4)?, None)?;
    let (s0, s1) = m.split(0)?.expect("splittable");
    for v in 3..6 {
        m.set_part(v, s1 as i64);
    }
    m.check(&g)?;
    m.merge(s0, s1)?;
    assert_eq!(m.domnnbr(), 1);
    assert!(m.parts().iter().all(|&p| p == 0));
    m.check(&g)?;
    Ok(())
}

#[test]
fn view_reports_loads_and_cut() -> anyhow::Result<()> {
    let g = path_graph(4);
    let mut m = Mapping::init(&g, Arch::cmplt(2)?, None)?;
    let (_, s1) = m.split(0)?.expect("splittable");
    m.set_part(2, s1 as i64);
    m.set_part(3, s1 as i64);
    let view = m.view(&g);
    assert_eq!(view.compload, vec![2, 2]);
    assert_eq!(view.edge_cut, 1);
    assert_eq!(view.comm_load, 1);
    Ok(())
}

#[test]
fn term_num_exposes_canonical_labels() -> anyhow::Result<()> {
    let g = path_graph(4);
    let mut m = Mapping::init(&g, Arch::cmplt(4)?, None)?;
    let (_, s1) = m.split(0)?.expect("splittable");
    m.set_part(3, s1 as i64);
    assert_eq!(m.term_num(0), 0);
    assert_eq!(m.term_num(3), 2); // second half of [0, 4) starts at 2
    Ok(())
}

#[test]
fn check_rejects_unmapped_unless_allowed() -> anyhow::Result<()> {
    let g = path_graph(3);
    let mut m = Mapping::init(&g, Arch::cmplt(2)?, None)?;
    m.set_part(1, -1);
    assert!(matches!(m.check(&g), Err(Error::InconsistentState(_))));
    m.set_allow_incomplete(true);
    m.check(&g)?;
    Ok(())
}

#[test]
fn check_honours_fixed_vertices() -> anyhow::Result<()> {
    let g = path_graph(4);
    let mut m = Mapping::init(&g, Arch::cmplt(2)?, None)?;
    m.set_fixed(vec![-1, -1, -1, 1])?;
    let (_, s1) = m.split(0)?.expect("splittable");
    // vertex 3 must live in the domain whose terminal number is 1
    assert!(matches!(m.check(&g), Err(Error::InconsistentState(_))));
    m.set_part(3, s1 as i64);
    m.check(&g)?;
    Ok(())
}

#[test]
fn mapping_save_writes_terminal_labels() -> anyhow::Result<()> {
    let g = grid2(2, 2);
    let mut m = Mapping::init(&g, Arch::cmplt(2)?, None)?;
    let (_, s1) = m.split(0)?.expect("splittable");
    m.set_part(2, s1 as i64);
    m.set_part(3, s1 as i64);
    let mut text = Vec::new();
    m.save(&g, &mut text)?;
    let parsed = lodestone::io::load_pairs(text.as_slice(), 4, 0)?;
    assert_eq!(parsed, vec![0, 0, 1, 1]);
    Ok(())
}
