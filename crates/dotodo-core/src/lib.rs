//! # Do Todo Core Library
//!
//! Core logic for the Do Todo task timer: per-task stopwatches, one-shot
//! overtime alerts and a filtered, sorted view over the collection. The
//! `dotodo` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timing engine**: pure start/stop/complete transitions taking the
//!   current instant from a [`Clock`]
//! - **Alert engine**: fires once per running interval when a task crosses
//!   its warning threshold, delivered natively or as an in-app toast
//! - **Query engine**: filter, sort, partition and aggregate for display
//! - **Storage**: the collection as one JSON array in SQLite, plus TOML config
//!
//! ## Key Components
//!
//! - [`TaskBoard`]: single writer over the collection; persists every change
//! - [`Ticker`]: drives `tick()` only while some task is running
//! - [`Dispatcher`]: native notification with toast fallback
//! - [`Config`]: application configuration management

pub mod alert;
pub mod board;
pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod query;
pub mod storage;
pub mod task;
pub mod ticker;
pub mod timing;

pub use alert::{Alert, AlertState, Delivery, Dispatcher, NativeNotifier, Notifier, ToastQueue};
pub use board::TaskBoard;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, NotifyError, StoreError, TimingError, ValidationError};
pub use events::Event;
pub use format::{format_elapsed, format_hms};
pub use query::{SortMode, Stats, TaskView};
pub use storage::{Config, Database, MemoryStore, SqliteStore, Store};
pub use task::{NewTask, Task, TaskPatch, TaskStatus, WarningPatch};
pub use ticker::{TickChange, Ticker};
