use clap::CommandFactory;
use clap_complete::Shell;

use super::CliResult;
use crate::Cli;

pub fn run(shell: Shell) -> CliResult {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "dotodo", &mut std::io::stdout());
    Ok(())
}
