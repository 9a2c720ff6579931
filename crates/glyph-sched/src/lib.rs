//! Glyph phase scheduler.
//!
//! [`PhaseScheduler`] owns an evaluator and a list of expressions per
//! [`Phase`]. Each [`tick`](PhaseScheduler::tick) runs one phase and
//! returns a [`TickResult`]; a [`cycle`](PhaseScheduler::cycle) is four
//! ticks.

mod config;
mod phase;
mod scheduler;
mod tick;

pub use config::SchedulerConfig;
pub use phase::Phase;
pub use scheduler::PhaseScheduler;
pub use tick::TickResult;
