use clap::Parser;
use docs_diagrams::{cli, diagrams::architecture};

/// Renders docs/images/system-architecture.{png,pdf}
#[derive(Parser, Debug)]
#[command(name = "create-architecture-diagram")]
#[command(version)]
#[command(about = "Render the system architecture diagram to PNG and PDF", long_about = None)]
struct Args {}

fn main() {
    let _args = Args::parse();
    cli::init_logging();
    cli::render_or_exit(&architecture::diagram());
}
