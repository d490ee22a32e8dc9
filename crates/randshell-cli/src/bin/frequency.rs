//! Monobit frequency test program.

use clap::Parser;
use randshell_core::shell::{ShellArgs, run_test_program};
use randshell_tests::FrequencyTest;

fn main() {
    env_logger::init();
    let args = ShellArgs::parse();
    let mut plugin = FrequencyTest::new();
    std::process::exit(run_test_program(&mut plugin, &args));
}
