use clap::Parser;
use vistrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
