//! Sparse-matrix orderer driver.
//!
//! ```text
//! gord [input_graph_file] [output_ordering_file]
//! ```
//!
//! Reads the graph from the file or standard input and writes the
//! vertex/rank pair file of the nested-dissection ordering. `-d` forces
//! deterministic mode, `-V` prints the version, `-h` the usage.

use std::fs::File;
use std::io::{Read, Write, stdin, stdout};
use std::process::exit;

use anyhow::{Context as _, Result};

use lodestone::{Context, Graph, IntOption, order};

const USAGE: &str = "usage: gord [-d] [-V] [-h] [input] [output]";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => exit(code),
        Err(err) => {
            eprintln!("gord: {err:#}");
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
                println!("gord (lodestone {})", env!("CARGO_PKG_VERSION"));
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

    let graph = match plain.first() {
        Some(path) => Graph::load(File::open(path).context("cannot open input")?)?,
        None => Graph::load(read_stdin()?)?,
    };

    let mut ctx = Context::new();
    if deterministic {
        ctx.set_int(IntOption::DeterministicMode, 1);
    }
    let ordering = order::order_graph(&ctx, &graph)?;

    match plain.get(1) {
        Some(path) => {
            let mut out = File::create(path).context("cannot create output")?;
            ordering.save(graph.baseval(), &mut out)?;
        }
        None => {
            let mut out = stdout().lock();
            ordering.save(graph.baseval(), &mut out)?;
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
