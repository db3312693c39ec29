//! Check the test data of tasks for informatics competitions.

#[macro_use]
extern crate log;

mod archive;
mod error;
mod opt;
mod run;

use clap::Parser;

use crate::error::NiceError;
use crate::opt::Opt;
use crate::run::RunOptions;

fn main() {
    let opt = Opt::parse();
    opt.logger.enable_log();

    let mut units = Vec::new();
    for config in &opt.config {
        units.push(
            task_check_format::load_unit(config)
                .nice_expect_with(|| format!("Invalid configuration file {}", config.display())),
        );
    }

    let options = RunOptions::from_opt(&opt);
    let outcomes = run::validate_units(units, &options);

    let mut all_passed = true;
    for outcome in &outcomes {
        outcome.print_summary().nice_unwrap();
        all_passed &= outcome.passed();
    }
    if !all_passed {
        std::process::exit(1);
    }
}
