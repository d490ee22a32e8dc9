//! Block frequency test program.

use clap::Parser;
use randshell_core::shell::{ShellArgs, run_test_program};
use randshell_tests::BlockFrequencyTest;

fn main() {
    env_logger::init();
    let args = ShellArgs::parse();
    let mut plugin = BlockFrequencyTest::new();
    std::process::exit(run_test_program(&mut plugin, &args));
}
