pub mod completions;
pub mod config;
pub mod stats;
pub mod task;
pub mod watch;

use dotodo_core::{Database, SqliteStore, SystemClock, TaskBoard};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the board over the default database.
pub fn open_board() -> Result<TaskBoard<SqliteStore, SystemClock>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(TaskBoard::load(SqliteStore::new(db), SystemClock))
}
