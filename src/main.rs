//! Propstyle command-line entry point

use propstyle::cli::StyleCli;
use propstyle::StyleError;
use std::process;

fn main() {
    let mut cli = StyleCli::new();

    match cli.run() {
        Ok(()) => {}
        Err(StyleError::Io(e)) => {
            eprintln!("IO Error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
