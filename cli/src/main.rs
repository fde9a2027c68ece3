//! # sitio
//!
//! Terminal front end for the vacation-rental bookkeeping: reservations,
//! expenses, the financial dashboard and the occupancy calendar.
//!
//! Set `RUST_LOG=info` (or `debug`) to see what the backend is doing.

mod args;
mod commands;
mod render;

use anyhow::Result;
use clap::Parser;
use log::info;
use sitio_backend::Backend;
use std::io;

use args::{Cli, Command};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("🚀 Starting sitio");

    let mut backend = match &cli.data_dir {
        Some(dir) => Backend::open(dir)?,
        None => Backend::open_default()?,
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    commands::run(cli.command.unwrap_or(Command::Dashboard), &mut backend, &mut input, &mut out)
}
