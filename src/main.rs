//! `circ`: catalog and circulation for a plain-text library.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
