use clap::Parser;
use docs_diagrams::{cli, diagrams::erd};

/// Renders docs/images/database-erd.{png,pdf}
#[derive(Parser, Debug)]
#[command(name = "create-erd-diagram")]
#[command(version)]
#[command(about = "Render the database entity-relationship diagram to PNG and PDF", long_about = None)]
struct Args {}

fn main() {
    let _args = Args::parse();
    cli::init_logging();
    cli::render_or_exit(&erd::diagram());
}
