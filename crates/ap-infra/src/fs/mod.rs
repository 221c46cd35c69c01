pub mod app_data_dir;
pub mod atomic;
pub mod write_probe;

pub use app_data_dir::DirsAppDirs;
pub use write_probe::{probe_writable, resolve_writable_dir, WritableDir};
