use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compiler_command: String,
    pub compile_timeout_secs: u64,
    pub notification_ttl_ms: u64,
    pub render_debounce_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_dir: Option<PathBuf>,
    pub ignored_names: Vec<String>,
    pub search_max_results: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compiler_command: "levlang".to_string(),
            compile_timeout_secs: 30,
            notification_ttl_ms: 3000,
            render_debounce_ms: 16,
            initial_dir: None,
            ignored_names: [
                ".DS_Store",
                ".Spotlight-V100",
                ".Trashes",
                "Thumbs.db",
                "desktop.ini",
                ".git",
                "node_modules",
                "__pycache__",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            search_max_results: 100,
        }
    }
}

impl Settings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms.max(1))
    }

    pub fn render_debounce(&self) -> Duration {
        Duration::from_millis(self.render_debounce_ms)
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs(self.compile_timeout_secs.max(1))
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_names.iter().any(|ignored| ignored == name)
    }
}
