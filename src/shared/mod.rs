pub mod logging;
pub mod serde_ext;
pub mod time;

pub use logging::{append_log_line, EventLog, LogLevel};
pub use time::now_secs;
