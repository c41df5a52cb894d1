pub mod human;
pub mod replay;
pub mod run;
pub mod train;
pub mod tui;

pub use human::{HUMAN_TICK_MS, HumanMode};
pub use replay::ReplayMode;
pub use run::RunMode;
pub use train::{TrainConfig, TrainMode, TrainSummary};
pub use tui::{Controls, TickInterval};
