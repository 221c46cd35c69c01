pub mod fs;
pub mod http;
pub mod security;
pub mod store;
pub mod time;

pub use time::SystemClock;
