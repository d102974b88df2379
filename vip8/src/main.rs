use std::path::PathBuf;

use clap::Parser;

use vip8_core::constants::DEFAULT_CYCLE_HZ;

mod audio;
mod keymap;
mod run;

/// CHIP-8 virtual machine.
#[derive(Parser)]
#[command(name = "vip8", version)]
struct Args {
    /// Path to a program image (.ch8)
    rom: PathBuf,

    /// Instructions dispatched per second
    #[arg(long, default_value_t = DEFAULT_CYCLE_HZ)]
    speed: u32,

    /// Window pixels per machine pixel
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Disable the tone generator
    #[arg(long)]
    mute: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    run::run(&args)
}
