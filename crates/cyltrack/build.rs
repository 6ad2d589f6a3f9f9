//! Renders `cyltrack.1` and one page per visible subcommand into
//! `$OUT_DIR/man`, straight from the clap definitions in `src/cli.rs`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf = std::env::var_os("OUT_DIR")
        .expect("cargo sets OUT_DIR for build scripts")
        .into();
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("man directory under OUT_DIR is writable");

    let mut pages = Vec::new();
    collect_pages(cli::Cli::command(), &mut pages);
    for (page_name, cmd) in pages {
        write_page(&man_dir, &page_name, cmd);
    }
}

/// Depth-first list of `(page name, command)`; `cylinders add` becomes
/// `cyltrack-cylinders-add`.
fn collect_pages(cmd: clap::Command, pages: &mut Vec<(String, clap::Command)>) {
    let page_name = cmd.get_name().to_owned();
    let children: Vec<clap::Command> = cmd
        .get_subcommands()
        .filter(|sub| !sub.is_hide_set())
        .map(|sub| sub.clone().name(format!("{page_name}-{}", sub.get_name())))
        .collect();
    pages.push((page_name, cmd));
    for child in children {
        collect_pages(child, pages);
    }
}

fn write_page(dir: &Path, page_name: &str, cmd: clap::Command) {
    let mut roff = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut roff)
        .unwrap_or_else(|e| panic!("rendering man page {page_name}: {e}"));
    let path = dir.join(format!("{page_name}.1"));
    fs::write(&path, roff).unwrap_or_else(|e| panic!("writing {}: {e}", path.display()));
}
