//! int8 16x32 * 32x16 on AMX tiles vs naive loops.

use std::process::ExitCode;

use amxmul::demo::{self, Demo};

fn main() -> ExitCode {
    demo::main(Demo::Int8Mul)
}
