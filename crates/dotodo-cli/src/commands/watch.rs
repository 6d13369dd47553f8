//! Foreground tick loop.
//!
//! Every tick re-reads the board inside a store transaction, so timers
//! started or stopped by other `dotodo` invocations are picked up and never
//! overwritten. Exits once nothing is running.

use std::io::Write;

use dotodo_core::{
    format_elapsed, timing, Config, Delivery, Dispatcher, NativeNotifier, SqliteStore,
    SystemClock, TaskBoard, TickChange, Ticker, ToastQueue,
};
use tracing::{debug, info};

use super::{open_board, CliResult};

pub fn run() -> CliResult {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(config))
}

async fn watch(config: Config) -> CliResult {
    let mut board = open_board()?;
    let notifier = NativeNotifier::new(config.notifications.enabled);
    let mut dispatcher = Dispatcher::new(
        Box::new(notifier),
        ToastQueue::new(config.toast_duration()),
    );
    let (mut ticker, mut ticks) = Ticker::new(config.tick_interval());
    debug!(period = ?ticker.period(), "watch started");

    if ticker.sync(board.running_count()) == TickChange::Unchanged {
        println!("no task is running");
        return Ok(());
    }
    print_status(&board)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }

        let now = board.now();
        for alert in board.tick_shared() {
            match dispatcher.dispatch(&alert, now) {
                Delivery::Native => println!("alert: {}", alert.message()),
                Delivery::Toast => println!("[toast] {}", alert.message()),
            }
        }
        for toast in dispatcher.toasts_mut().dismiss_expired(now) {
            debug!(message = %toast.message, "toast dismissed");
        }

        if ticker.sync(board.running_count()) == TickChange::Unsubscribed {
            break;
        }
        print_status(&board)?;
    }

    ticker.shutdown();
    println!("no task is running");
    Ok(())
}

fn print_status(board: &TaskBoard<SqliteStore, SystemClock>) -> CliResult {
    let now = board.now();
    let running: Vec<String> = board
        .tasks()
        .iter()
        .filter(|t| t.running)
        .map(|t| {
            format!(
                "{} {}",
                format_elapsed(timing::effective_elapsed(t, now)),
                t.title
            )
        })
        .collect();
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", running.join("  |  "))?;
    stdout.flush()?;
    Ok(())
}
