pub mod blast;
pub mod config;
pub mod errors;
pub mod report;
pub mod search;
pub mod seq;
mod runner;

use crate::errors::HomologyError;

pub fn run() -> Result<(), HomologyError> {
    runner::run()
}
