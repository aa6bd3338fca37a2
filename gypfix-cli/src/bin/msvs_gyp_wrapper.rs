//! Generator that leaves js2c and build-v8 parameters out of Visual Studio
//! path fixup.

use clap::Parser;
use std::process::ExitCode;

use gypfix_cli::{finish, init_logging};
use gypfix_core::{run_msvs, GeneratorArgs};

fn main() -> ExitCode {
    init_logging();

    let args = GeneratorArgs::parse_from(std::env::args_os());
    finish(run_msvs(&args).map(|_| ()))
}
