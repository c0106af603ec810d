//! Embassy async tasks
//!
//! Each task runs independently and communicates via the watches in
//! [`crate::channels`].

pub mod dashboard;
pub mod exchange;
pub mod net;
pub mod position;

pub use dashboard::dashboard_task;
pub use exchange::exchange_task;
pub use net::{cyw43_task, net_task, wifi_task};
pub use position::{gnss_task, position_task};
