use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod recognition;
pub mod storage;

fn main() {
    run();
}
