use std::path::PathBuf;

/// Resolved directory facts. Nothing here is checked for existence or writability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub app_data_root: PathBuf,
    pub fallback_root: PathBuf,
}

impl AppDirs {
    pub fn logs_dir(&self) -> PathBuf {
        self.app_data_root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_dirs_is_pure_fact_container() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/autopress"),
            fallback_root: PathBuf::from("/var/tmp/autopress"),
        };
        assert!(dirs.app_data_root.ends_with("autopress"));
        assert_eq!(dirs.logs_dir(), PathBuf::from("/tmp/autopress/logs"));
    }
}
