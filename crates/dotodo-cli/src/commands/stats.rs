use dotodo_core::format_elapsed;

use super::{open_board, CliResult};

pub fn run(json: bool) -> CliResult {
    let board = open_board()?;
    let stats = board.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!(
        "active:    {:>3}  {}",
        stats.active,
        format_elapsed(stats.active_elapsed_ms)
    );
    println!(
        "completed: {:>3}  {}",
        stats.completed,
        format_elapsed(stats.completed_elapsed_ms)
    );
    Ok(())
}
