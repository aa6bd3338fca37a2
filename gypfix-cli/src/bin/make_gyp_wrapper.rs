//! Generator with manually built static libraries linked after regular
//! dependencies in ndk-build Makefiles.

use clap::Parser;
use std::process::ExitCode;

use gypfix_cli::{finish, init_logging};
use gypfix_core::{run_make, GeneratorArgs};

fn main() -> ExitCode {
    init_logging();

    let args = GeneratorArgs::parse_from(std::env::args_os());
    finish(run_make(&args).map(|_| ()))
}
