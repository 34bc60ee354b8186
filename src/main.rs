use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod library;
pub mod playlist;

fn main() -> anyhow::Result<()> {
    run()
}
