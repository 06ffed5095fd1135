#![doc = include_str!("../README.md")]

mod cli;
mod core;
mod dispatch;
mod forecast;
mod prelude;
mod quantity;
mod query;
mod tables;

use std::io;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Plan(args) => cli::plan(&args)?,
        Command::Dispatch(args) => cli::dispatch(&args)?,
        Command::Schedule(args) => cli::query(&args)?,
    }

    info!("done!");
    Ok(())
}
