//! k-way graph partitioner driver.
//!
//! ```text
//! gpart <parts> [input_graph_file] [output_mapping_file]
//! ```
//!
//! Reads the graph from the file or standard input, writes the vertex/part
//! pair file to the file or standard output. `-d` forces deterministic
//! mode, `-V` prints the version, `-h` the usage.

use std::fs::File;
use std::io::{Read, Write, stdin, stdout};
use std::process::exit;

use anyhow::{Context as _, Result};

use lodestone::{Arch, Context, Graph, IntOption, Mapping, kway};

const USAGE: &str = "usage: gpart [-d] [-V] [-h] <parts> [input] [output]";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => exit(code),
        Err(err) => {
            eprintln!("gpart: {err:#}");
            exit(2);
        }
    }
}

fn run(args: &[String]) -> Result<i32> {
    let mut deterministic = false;
    let mut plain: Vec<&str> = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-V" => {
                println!("gpart (lodestone {})", env!("CARGO_PKG_VERSION"));
                return Ok(0);
            }
            "-h" => {
                println!("{USAGE}");
                return Ok(0);
            }
            "-d" => deterministic = true,
            other if other.starts_with('-') => {
                eprintln!("{USAGE}");
                return Ok(1);
            }
            other => plain.push(other),
        }
    }
    let Some((&parts, rest)) = plain.split_first() else {
        eprintln!("{USAGE}");
        return Ok(1);
    };
    let partnbr: i64 = parts.parse().context("part count must be an integer")?;

    let graph = match rest.first() {
        Some(path) => Graph::load(File::open(path).context("cannot open input")?)?,
        None => Graph::load(read_stdin()?)?,
    };

    let mut ctx = Context::new();
    if deterministic {
        ctx.set_int(IntOption::DeterministicMode, 1);
    }
    let arch = Arch::cmplt(partnbr)?;
    let mapping: Mapping = kway::map_graph(&ctx, &graph, arch)?;

    match rest.get(1) {
        Some(path) => {
            let mut out = File::create(path).context("cannot create output")?;
            mapping.save(&graph, &mut out)?;
        }
        None => {
            let mut out = stdout().lock();
            mapping.save(&graph, &mut out)?;
            out.flush().ok();
        }
    }
    Ok(0)
}

fn read_stdin() -> Result<std::io::Cursor<Vec<u8>>> {
    let mut buf = Vec::new();
    stdin().lock().read_to_end(&mut buf)?;
    Ok(std::io::Cursor::new(buf))
}
