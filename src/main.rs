use crate::cli::run;

pub mod catalog;
pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod signer;

fn main() {
    run();
}
