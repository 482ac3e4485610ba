//! Man page generator for norprobe
//!
//! Renders `<name>.1` for the top-level command and `<name>-<sub>.1` for each
//! visible subcommand (`probe`, `list-programmers`, `list-chips`), all taken
//! from the clap definition in `cli.rs`.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::{Command, CommandFactory};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

/// Render one page and return the path it was written to
fn write_page(cmd: Command, page_name: &str, dir: &Path) -> io::Result<PathBuf> {
    let man = clap_mangen::Man::new(cmd).title(page_name.to_uppercase());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    let path = dir.join(format!("{}.1", page_name));
    fs::write(&path, buffer)?;
    Ok(path)
}

/// Render the top-level page and one page per visible subcommand
fn generate(dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    let mut pages = vec![write_page(cmd.clone(), &name, dir)?];
    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set() && s.get_name() != "help") {
        let page_name = format!("{}-{}", name, sub.get_name());
        let sub = sub.clone().display_name(page_name.clone());
        pages.push(write_page(sub, &page_name, dir)?);
    }
    Ok(pages)
}

fn main() -> io::Result<()> {
    // Default to ./man directory
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    let pages = generate(&output_dir)?;

    println!("Man pages generated in {}:", output_dir.display());
    for page in &pages {
        println!("  {}", page.display());
    }
    if let Some(main_page) = pages.first() {
        println!("\nTo view the man page:");
        println!("  man -l {}", main_page.display());
    }
    println!("\nTo install system-wide (requires sudo):");
    println!(
        "  sudo cp {}/*.1 /usr/local/share/man/man1/",
        output_dir.display()
    );
    println!("  sudo mandb");

    Ok(())
}
