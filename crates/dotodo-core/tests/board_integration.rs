//! End-to-end board behaviour against a manual clock and real stores.

use chrono::{Duration, TimeZone, Utc};
use dotodo_core::{
    format_elapsed, timing, CoreError, Database, Event, ManualClock, MemoryStore, NewTask,
    SortMode, SqliteStore, TaskBoard, TaskPatch, TaskStatus, TimingError, WarningPatch,
};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap())
}

fn id_of(event: &Event) -> String {
    event.task_id().expect("event names a task").to_string()
}

#[test]
fn stopwatch_accumulates_across_intervals() {
    let clock = clock();
    let mut board = TaskBoard::load(MemoryStore::new(), clock.clone());
    let id = id_of(&board.add(NewTask::titled("Write report")).unwrap());

    board.start(&id).unwrap();
    clock.advance_secs(90);
    board.stop(&id).unwrap();

    clock.advance_secs(600);
    assert_eq!(board.get(&id).unwrap().elapsed_ms, 90_000);

    board.start(&id).unwrap();
    clock.advance_secs(30);
    assert_eq!(board.effective_elapsed(board.get(&id).unwrap()), 120_000);
    let done = board.complete(&id).unwrap().unwrap();
    match done {
        Event::TaskCompleted { added_ms, elapsed_ms, .. } => {
            assert_eq!(added_ms, 30_000);
            assert_eq!(elapsed_ms, 120_000);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let task = board.get(&id).unwrap();
    assert_eq!(task.status(), TaskStatus::Done);
    assert_eq!(format_elapsed(task.elapsed_ms), "00:02:00");
}

#[test]
fn reopened_task_can_run_again() {
    let clock = clock();
    let mut board = TaskBoard::load(MemoryStore::new(), clock.clone());
    let id = id_of(&board.add(NewTask::titled("Review")).unwrap());

    board.complete(&id).unwrap();
    assert!(matches!(
        board.start(&id),
        Err(CoreError::Timing(TimingError::Completed))
    ));

    board.uncomplete(&id).unwrap();
    assert_eq!(board.get(&id).unwrap().status(), TaskStatus::Pending);
    board.start(&id).unwrap();
    assert_eq!(board.running_count(), 1);
}

#[test]
fn running_task_survives_reload() {
    let clock = clock();
    let store = MemoryStore::new();
    let id = {
        let mut board = TaskBoard::load(store.clone(), clock.clone());
        let id = id_of(&board.add(NewTask::titled("Long job")).unwrap());
        board.start(&id).unwrap();
        id
    };

    clock.advance(Duration::minutes(5));
    let board = TaskBoard::load(store, clock.clone());
    let task = board.get(&id).unwrap();
    assert!(task.running);
    assert_eq!(board.effective_elapsed(task), 5 * 60_000);
}

#[test]
fn sqlite_store_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dotodo.db");
    let clock = clock();

    let id = {
        let store = SqliteStore::new(Database::open_at(&path).unwrap());
        let mut board = TaskBoard::load(store, clock.clone());
        let id = id_of(
            &board
                .add(NewTask::titled("Persist me").notes("in sqlite").warn_after(25))
                .unwrap(),
        );
        board.start(&id).unwrap();
        clock.advance_secs(12);
        board.stop(&id).unwrap();
        id
    };

    let store = SqliteStore::new(Database::open_at(&path).unwrap());
    let board = TaskBoard::load(store, clock);
    let task = board.get(&id).unwrap();
    assert_eq!(task.title, "Persist me");
    assert_eq!(task.notes, "in sqlite");
    assert_eq!(task.warning_minutes, Some(25.0));
    assert_eq!(task.elapsed_ms, 12_000);
    assert!(!task.running);
}

#[test]
fn view_filters_sorts_and_counts_everything() {
    let clock = clock();
    let mut board = TaskBoard::load(MemoryStore::new(), clock.clone());
    let a = id_of(&board.add(NewTask::titled("Alpha report")).unwrap());
    clock.advance_secs(1);
    let b = id_of(&board.add(NewTask::titled("beta").notes("REPORT draft")).unwrap());
    clock.advance_secs(1);
    let _c = id_of(&board.add(NewTask::titled("Gamma")).unwrap());

    board.start(&b).unwrap();
    clock.advance_secs(40);
    board.complete(&a).unwrap();

    let view = board.view("report", SortMode::CreatedDesc);
    assert_eq!(view.active.len(), 1);
    assert_eq!(view.active[0].id, b);
    assert_eq!(view.completed.len(), 1);
    assert_eq!(view.completed[0].id, a);

    // Stats ignore the filter.
    assert_eq!(view.stats.active, 2);
    assert_eq!(view.stats.completed, 1);
    assert_eq!(view.stats.active_elapsed_ms, 40_000);

    let by_title = board.view("", SortMode::Title);
    let titles: Vec<_> = by_title.active.iter().map(|t| t.title.as_str()).collect();
    // Plain lexicographic order: uppercase sorts first.
    assert_eq!(titles, ["Gamma", "beta"]);
}

#[test]
fn edit_can_clear_warning_and_rearm_alerts() {
    let clock = clock();
    let mut board = TaskBoard::load(MemoryStore::new(), clock.clone());
    let id = id_of(&board.add(NewTask::titled("Edit me").warn_after(1)).unwrap());

    board
        .edit(
            &id,
            TaskPatch {
                warning_minutes: WarningPatch::Clear,
                ..TaskPatch::default()
            },
        )
        .unwrap();
    board.start(&id).unwrap();
    clock.advance_secs(120);
    assert!(board.tick().is_empty());

    board
        .edit(
            &id,
            TaskPatch {
                notes: Some("back on".into()),
                warning_minutes: WarningPatch::Set(1.0),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(board.tick().len(), 1);
}

#[test]
fn deleted_task_is_gone() {
    let clock = clock();
    let store = MemoryStore::new();
    let mut board = TaskBoard::load(store.clone(), clock.clone());
    let id = id_of(&board.add(NewTask::titled("Temp")).unwrap());
    board.start(&id).unwrap();
    board.delete(&id).unwrap();

    assert_eq!(board.running_count(), 0);
    assert!(matches!(board.delete(&id), Err(CoreError::TaskNotFound { .. })));
    assert!(TaskBoard::load(store, clock).tasks().is_empty());
}

#[test]
fn effective_elapsed_of_stopped_task_is_stable() {
    let clock = clock();
    let mut board = TaskBoard::load(MemoryStore::new(), clock.clone());
    let id = id_of(&board.add(NewTask::titled("Stable")).unwrap());
    board.start(&id).unwrap();
    clock.advance_secs(7);
    board.stop(&id).unwrap();

    let first = timing::effective_elapsed(board.get(&id).unwrap(), board.now());
    clock.advance(Duration::hours(3));
    let later = timing::effective_elapsed(board.get(&id).unwrap(), board.now());
    assert_eq!(first, later);
}
