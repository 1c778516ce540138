//! int8 3x3 convolution over the valid region, AMX tiles vs naive loops.

use std::process::ExitCode;

use amxmul::conv::ConvMode;
use amxmul::demo::{self, Demo};

fn main() -> ExitCode {
    demo::main(Demo::Int8Conv(ConvMode::Valid))
}
