//! Countup timers for timed activities (meditation, stretching).

mod activity;
mod ticker;

pub use activity::{ActivityTimer, TimerEvent, TimerState};
pub use ticker::{spawn_ticker, TickerHandle};
