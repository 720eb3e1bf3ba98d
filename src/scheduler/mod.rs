//! Poll scheduling
//!
//! - `collection_loop`: bootstrap and the steady-state fetch/publish loop
//! - `timing`: drift-compensated sleep computation
//! - `report`: per-cycle outcome

pub mod collection_loop;
pub mod report;
pub mod timing;

pub use collection_loop::{CollectionLoop, LoopSettings};
pub use report::{CycleReport, SkippedDevice};
pub use timing::{plan_sleep, SleepPlan};
