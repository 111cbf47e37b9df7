//! Text file formats.
//!
//! All formats are whitespace-separated token streams, so any spacing and
//! line breaking parse the same.
//!
//! # Graph format (version 0)
//!
//! ```text
//! 0
//! <vertex_count> <arc_count>
//! <base_value> <flags>
//! <per-vertex block> × vertex_count
//! ```
//!
//! `flags` has three decimal digits `d2 d1 d0`: `d2` vertex labels present,
//! `d1` edge loads present, `d0` vertex loads present. Each per-vertex
//! block is `[label] [load] degree (neighbour [load]) × degree`, with
//! neighbours given in external (base-shifted) numbering. Labels, when
//! present, must form a permutation of the external vertex range. The halo
//! graph format is identical except that halo vertices store the sentinel
//! `-(degree + 1)` in the degree field.
//!
//! # Mapping / ordering format
//!
//! ```text
//! <entry_count>
//! <vertex_index> <part_or_rank>  × entry_count
//! ```
//!
//! # Architecture format
//!
//! A leading type keyword, then type parameters: `cmplt n`; `cmpltw n w…`;
//! `hcub dim`; `mesh2D x y`, `mesh3D x y z`, `meshXD d x…`, same for
//! `torus…`; `tleaf levels (size link)…`; `sub <parent…> n t…`;
//! `deco n w… <lower-triangular distance matrix>`.

use std::io::{Read, Write};

use crate::arch::Arch;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::halo::HaloGraph;
use crate::mapping::Mapping;
use crate::order::Ordering;

/// Token stream over a whole input.
struct Tokens {
    toks: Vec<String>,
    next: usize,
}

impl Tokens {
    fn from_reader<R: Read>(mut reader: R, routine: &str) -> Result<Tokens> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::from(e).report(routine))?;
        Ok(Tokens {
            toks: text.split_whitespace().map(str::to_owned).collect(),
            next: 0,
        })
    }

    fn next_i64(&mut self, routine: &str) -> Result<i64> {
        let tok = self.toks.get(self.next).ok_or_else(|| {
            Error::Io("unexpected end of input".into()).report(routine)
        })?;
        self.next += 1;
        tok.parse::<i64>()
            .map_err(|_| Error::Io(format!("bad integer token '{tok}'")).report(routine))
    }

    fn next_word(&mut self, routine: &str) -> Result<&str> {
        let tok = self.toks.get(self.next).ok_or_else(|| {
            Error::Io("unexpected end of input".into()).report(routine)
        })?;
        self.next += 1;
        Ok(tok)
    }
}

/// One parsed per-vertex block.
struct VertBlock {
    label: Option<i64>,
    velo: Option<i64>,
    /// Negative when the halo sentinel was read.
    degree: i64,
    edges: Vec<(i64, Option<i64>)>,
}

fn read_blocks(
    toks: &mut Tokens,
    vertnbr: usize,
    flags: i64,
    allow_halo: bool,
    routine: &str,
) -> Result<Vec<VertBlock>> {
    let has_labl = flags / 100 % 10 != 0;
    let has_edlo = flags / 10 % 10 != 0;
    let has_velo = flags % 10 != 0;
    let mut blocks = Vec::with_capacity(vertnbr);
    for _ in 0..vertnbr {
        let label = if has_labl {
            Some(toks.next_i64(routine)?)
        } else {
            None
        };
        let velo = if has_velo {
            let velo = toks.next_i64(routine)?;
            if velo <= 0 {
                return Err(Error::Io(format!("non-positive vertex load {velo}")).report(routine));
            }
            Some(velo)
        } else {
            None
        };
        let degree = toks.next_i64(routine)?;
        if degree < 0 && !allow_halo {
            return Err(Error::Io("negative degree in a plain graph".into()).report(routine));
        }
        let degnbr = if degree < 0 { -degree - 1 } else { degree };
        let mut edges = Vec::with_capacity(degnbr as usize);
        for _ in 0..degnbr {
            let end = toks.next_i64(routine)?;
            let edlo = if has_edlo {
                let edlo = toks.next_i64(routine)?;
                if edlo <= 0 {
                    return Err(
                        Error::Io(format!("non-positive edge load {edlo}")).report(routine)
                    );
                }
                Some(edlo)
            } else {
                None
            };
            edges.push((end, edlo));
        }
        blocks.push(VertBlock {
            label,
            velo,
            degree,
            edges,
        });
    }
    Ok(blocks)
}

/// Assemble blocks into CSR arrays, resolving labels and the base value.
fn assemble(
    blocks: Vec<VertBlock>,
    baseval: usize,
    flags: i64,
    routine: &str,
) -> Result<(Graph, usize)> {
    let vertnbr = blocks.len();
    // Labels, when given, must be a permutation of the external range;
    // the block of label `l` describes vertex `l - baseval`.
    let mut ordered: Vec<Option<VertBlock>> = (0..vertnbr).map(|_| None).collect();
    let mut halonbr = 0usize;
    for (at, block) in blocks.into_iter().enumerate() {
        let slot = match block.label {
            Some(label) => {
                let slot = label - baseval as i64;
                if slot < 0 || slot as usize >= vertnbr {
                    return Err(
                        Error::Io(format!("vertex label {label} out of range")).report(routine)
                    );
                }
                slot as usize
            }
            None => at,
        };
        if ordered[slot].is_some() {
            return Err(Error::Io("duplicate vertex label".into()).report(routine));
        }
        ordered[slot] = Some(block);
    }

    let has_velo = flags % 10 != 0;
    let has_edlo = flags / 10 % 10 != 0;
    let mut verttab = Vec::with_capacity(vertnbr + 1);
    verttab.push(0usize);
    let mut edgetab = Vec::new();
    let mut velotab = if has_velo { Some(Vec::new()) } else { None };
    let mut edlotab = if has_edlo { Some(Vec::new()) } else { None };
    for slot in ordered {
        let block = slot.expect("every slot filled by a unique label");
        if block.degree < 0 {
            halonbr += 1;
        } else if halonbr > 0 {
            return Err(
                Error::Io("halo vertices must come after all anchors".into()).report(routine)
            );
        }
        if let Some(velotab) = velotab.as_mut() {
            velotab.push(block.velo.unwrap_or(1));
        }
        for (end, edlo) in block.edges {
            let target = end - baseval as i64;
            if target < 0 || target as usize >= vertnbr {
                return Err(Error::Io(format!("edge target {end} out of range")).report(routine));
            }
            edgetab.push(target as usize);
            if let Some(edlotab) = edlotab.as_mut() {
                edlotab.push(edlo.unwrap_or(1));
            }
        }
        verttab.push(edgetab.len());
    }
    let graph = Graph::build(baseval, verttab, edgetab, velotab, edlotab)?;
    Ok((graph, halonbr))
}

fn load_any<R: Read>(reader: R, allow_halo: bool, routine: &str) -> Result<(Graph, usize)> {
    let mut toks = Tokens::from_reader(reader, routine)?;
    let version = toks.next_i64(routine)?;
    if version != 0 {
        return Err(Error::Io(format!("unsupported format version {version}")).report(routine));
    }
    let vertnbr = toks.next_i64(routine)?;
    let edgenbr = toks.next_i64(routine)?;
    if vertnbr < 0 || edgenbr < 0 {
        return Err(Error::Io("negative counts".into()).report(routine));
    }
    let baseval = toks.next_i64(routine)?;
    if baseval != 0 && baseval != 1 {
        return Err(Error::Io(format!("base value {baseval} not 0 or 1")).report(routine));
    }
    let flags = toks.next_i64(routine)?;
    let blocks = read_blocks(&mut toks, vertnbr as usize, flags, allow_halo, routine)?;
    let (graph, halonbr) = assemble(blocks, baseval as usize, flags, routine)?;
    if graph.edgenbr() != edgenbr as usize {
        return Err(Error::Io(format!(
            "header announces {edgenbr} arcs, blocks hold {}",
            graph.edgenbr()
        ))
        .report(routine));
    }
    Ok((graph, halonbr))
}

impl Graph {
    /// Load a plain graph.
    pub fn load<R: Read>(reader: R) -> Result<Graph> {
        let (graph, _) = load_any(reader, false, "Graph::load")?;
        Ok(graph)
    }

    /// Save in the plain graph format.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.save_with_halo(writer, 0)
    }

    fn save_with_halo<W: Write>(&self, writer: &mut W, halonbr: usize) -> Result<()> {
        const ROUTINE: &str = "Graph::save";
        let io = |e: std::io::Error| Error::from(e).report(ROUTINE);
        let flags = 10 * i64::from(self.has_edlo()) + i64::from(self.has_velo());
        writeln!(writer, "0").map_err(io)?;
        writeln!(writer, "{} {}", self.vertnbr(), self.edgenbr()).map_err(io)?;
        writeln!(writer, "{} {:03}", self.baseval(), flags).map_err(io)?;
        let anchornbr = self.vertnbr() - halonbr;
        for v in 0..self.vertnbr() {
            let mut line = String::new();
            if self.has_velo() {
                line.push_str(&format!("{} ", self.velo(v)));
            }
            let degree = self.degree(v) as i64;
            if v >= anchornbr {
                line.push_str(&format!("{}", -degree - 1));
            } else {
                line.push_str(&format!("{degree}"));
            }
            for e in self.edge_range(v) {
                line.push_str(&format!(" {}", self.edge_target(e) + self.baseval()));
                if self.has_edlo() {
                    line.push_str(&format!(" {}", self.edlo(e)));
                }
            }
            writeln!(writer, "{line}").map_err(io)?;
        }
        Ok(())
    }
}

impl HaloGraph {
    /// Load a halo graph; the negative-degree sentinel marks the halo
    /// suffix.
    pub fn load<R: Read>(reader: R) -> Result<HaloGraph> {
        let (graph, halonbr) = load_any(reader, true, "HaloGraph::load")?;
        let vnohnbr = graph.vertnbr() - halonbr;
        Ok(HaloGraph::from_parts(graph, vnohnbr))
    }

    /// Save in the halo graph format.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.graph().save_with_halo(writer, self.halo_nbr())
    }
}

/// Write a `(vertex, value)` pair file, one pair per line.
fn save_pairs<W: Write>(
    writer: &mut W,
    baseval: usize,
    values: impl ExactSizeIterator<Item = i64>,
    routine: &str,
) -> Result<()> {
    let io = |e: std::io::Error| Error::Io(e.to_string()).report(routine);
    writeln!(writer, "{}", values.len()).map_err(io)?;
    for (v, value) in values.enumerate() {
        writeln!(writer, "{} {}", v + baseval, value).map_err(io)?;
    }
    Ok(())
}

/// Load a `(vertex, value)` pair file for a graph of `vertnbr` vertices.
pub fn load_pairs<R: Read>(reader: R, vertnbr: usize, baseval: usize) -> Result<Vec<i64>> {
    const ROUTINE: &str = "io::load_pairs";
    let mut toks = Tokens::from_reader(reader, ROUTINE)?;
    let entnbr = toks.next_i64(ROUTINE)?;
    if entnbr < 0 || entnbr as usize != vertnbr {
        return Err(Error::Io(format!("expected {vertnbr} entries, found {entnbr}"))
            .report(ROUTINE));
    }
    let mut values = vec![0i64; vertnbr];
    let mut seen = vec![false; vertnbr];
    for _ in 0..vertnbr {
        let v = toks.next_i64(ROUTINE)? - baseval as i64;
        if v < 0 || v as usize >= vertnbr {
            return Err(Error::Io(format!("vertex index {v} out of range")).report(ROUTINE));
        }
        if seen[v as usize] {
            return Err(Error::Io(format!("vertex {v} listed twice")).report(ROUTINE));
        }
        seen[v as usize] = true;
        values[v as usize] = toks.next_i64(ROUTINE)?;
    }
    Ok(values)
}

impl Mapping {
    /// Save the mapping as `(vertex, terminal number)` pairs.
    pub fn save<W: Write>(&self, graph: &Graph, writer: &mut W) -> Result<()> {
        save_pairs(
            writer,
            graph.baseval(),
            (0..graph.vertnbr()).map(|v| self.term_num(v)),
            "Mapping::save",
        )
    }
}

impl Ordering {
    /// Save the ordering as `(vertex, rank)` pairs.
    pub fn save<W: Write>(&self, baseval: usize, writer: &mut W) -> Result<()> {
        save_pairs(
            writer,
            baseval,
            self.permtab.iter().map(|&r| (r + baseval) as i64),
            "Ordering::save",
        )
    }
}

impl Arch {
    /// Load an architecture from its keyword format.
    pub fn load<R: Read>(reader: R) -> Result<Arch> {
        const ROUTINE: &str = "Arch::load";
        let mut toks = Tokens::from_reader(reader, ROUTINE)?;
        load_arch(&mut toks, ROUTINE)
    }

    /// Save an architecture in its keyword format.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        const ROUTINE: &str = "Arch::save";
        let io = |e: std::io::Error| Error::from(e).report(ROUTINE);
        match self {
            Arch::Cmplt(a) => writeln!(writer, "cmplt {}", a.termnbr()).map_err(io),
            Arch::Cmpltw(a) => {
                write!(writer, "cmpltw {}", a.termnbr()).map_err(io)?;
                for w in a.wghts_by_term() {
                    write!(writer, " {w}").map_err(io)?;
                }
                writeln!(writer).map_err(io)
            }
            Arch::Hcub(a) => writeln!(writer, "hcub {}", a.dim()).map_err(io),
            Arch::Mesh(a) => save_dims(writer, "mesh", a.dims()).map_err(io),
            Arch::Torus(a) => save_dims(writer, "torus", a.dims()).map_err(io),
            Arch::Tleaf(a) => {
                write!(writer, "tleaf {}", a.sizes().len()).map_err(io)?;
                for (size, link) in a.sizes().iter().zip(a.links()) {
                    write!(writer, " {size} {link}").map_err(io)?;
                }
                writeln!(writer).map_err(io)
            }
            Arch::Sub(a) => {
                writeln!(writer, "sub").map_err(io)?;
                a.parent().save(writer)?;
                write!(writer, "{}", a.terms().len()).map_err(io)?;
                for t in a.terms() {
                    write!(writer, " {t}").map_err(io)?;
                }
                writeln!(writer).map_err(io)
            }
            Arch::Deco(a) => {
                write!(writer, "deco {}", a.termnbr()).map_err(io)?;
                for w in a.wghts() {
                    write!(writer, " {w}").map_err(io)?;
                }
                writeln!(writer).map_err(io)?;
                let n = a.termnbr() as usize;
                let dists = a.dists();
                for i in 1..n {
                    let mut line = String::new();
                    for j in 0..i {
                        if j > 0 {
                            line.push(' ');
                        }
                        line.push_str(&dists[i * n + j].to_string());
                    }
                    writeln!(writer, "{line}").map_err(io)?;
                }
                Ok(())
            }
        }
    }
}

fn save_dims<W: Write>(writer: &mut W, kind: &str, dims: &[i64]) -> std::io::Result<()> {
    match dims.len() {
        2 => writeln!(writer, "{kind}2D {} {}", dims[0], dims[1]),
        3 => writeln!(writer, "{kind}3D {} {} {}", dims[0], dims[1], dims[2]),
        d => {
            write!(writer, "{kind}XD {d}")?;
            for x in dims {
                write!(writer, " {x}")?;
            }
            writeln!(writer)
        }
    }
}

fn load_arch(toks: &mut Tokens, routine: &str) -> Result<Arch> {
    let keyword = toks.next_word(routine)?.to_owned();
    match keyword.as_str() {
        "cmplt" => Arch::cmplt(toks.next_i64(routine)?),
        "cmpltw" => {
            let nbr = toks.next_i64(routine)?;
            let wghts = read_i64s(toks, nbr, routine)?;
            Arch::cmpltw(&wghts)
        }
        "hcub" => {
            let dim = toks.next_i64(routine)?;
            if dim < 1 {
                return Err(Error::Io(format!("bad hypercube dimension {dim}")).report(routine));
            }
            Arch::hcub(dim as u32)
        }
        "mesh2D" => Arch::mesh(&read_i64s(toks, 2, routine)?),
        "mesh3D" => Arch::mesh(&read_i64s(toks, 3, routine)?),
        "meshXD" => {
            let d = toks.next_i64(routine)?;
            Arch::mesh(&read_i64s(toks, d, routine)?)
        }
        "torus2D" => Arch::torus(&read_i64s(toks, 2, routine)?),
        "torus3D" => Arch::torus(&read_i64s(toks, 3, routine)?),
        "torusXD" => {
            let d = toks.next_i64(routine)?;
            Arch::torus(&read_i64s(toks, d, routine)?)
        }
        "tleaf" => {
            let lvlnbr = toks.next_i64(routine)?;
            let mut sizetab = Vec::new();
            let mut linktab = Vec::new();
            for _ in 0..lvlnbr {
                sizetab.push(toks.next_i64(routine)?);
                linktab.push(toks.next_i64(routine)?);
            }
            Arch::tleaf(&sizetab, &linktab)
        }
        "sub" => {
            let parent = load_arch(toks, routine)?;
            let nbr = toks.next_i64(routine)?;
            let terms = read_i64s(toks, nbr, routine)?;
            Arch::sub(parent, &terms)
        }
        "deco" => {
            let nbr = toks.next_i64(routine)?;
            let wghts = read_i64s(toks, nbr, routine)?;
            let n = nbr as usize;
            let mut dists = vec![0i64; n * n];
            for i in 1..n {
                for j in 0..i {
                    let d = toks.next_i64(routine)?;
                    dists[i * n + j] = d;
                    dists[j * n + i] = d;
                }
            }
            Arch::deco(&wghts, &dists)
        }
        other => Err(Error::Io(format!("unknown architecture keyword '{other}'")).report(routine)),
    }
}

fn read_i64s(toks: &mut Tokens, count: i64, routine: &str) -> Result<Vec<i64>> {
    if count < 0 {
        return Err(Error::Io(format!("negative count {count}")).report(routine));
    }
    (0..count).map(|_| toks.next_i64(routine)).collect()
}
