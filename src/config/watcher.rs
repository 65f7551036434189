//! Configuration file watcher for hot reload.
//!
//! Editors often emit several modify events for one save; a reload only
//! happens when the file content actually changed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::GatewayConfig;
use crate::observability::metrics;

/// Remembers the last content seen so repeated events are ignored.
#[derive(Debug, Default)]
struct ReloadState {
    last_content: Option<String>,
    bind_override: Option<String>,
}

impl ReloadState {
    /// `None` when the content is unchanged since the last attempt.
    fn reload(&mut self, path: &Path) -> Option<Result<GatewayConfig, ConfigError>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Some(Err(ConfigError::Io(e))),
        };
        if self.last_content.as_deref() == Some(content.as_str()) {
            return None;
        }
        let result = parse_config(&content, |key| std::env::var(key).ok()).map(|mut config| {
            if let Some(bind) = &self.bind_override {
                config.listener.bind_address = bind.clone();
            }
            config
        });
        self.last_content = Some(content);
        Some(result)
    }
}

/// Watches the config file and publishes every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    bind_override: Option<String>,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end the server listens on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                bind_override: None,
                update_tx,
            },
            update_rx,
        )
    }

    /// Keep a command-line listener address on every reloaded config.
    pub fn with_bind_override(mut self, bind: Option<String>) -> Self {
        self.bind_override = bind;
        self
    }

    /// Start watching. The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let mut state = ReloadState {
            last_content: std::fs::read_to_string(&self.path).ok(),
            bind_override: self.bind_override,
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                match state.reload(&path) {
                    None => tracing::debug!(path = ?path, "Config file unchanged"),
                    Some(Ok(config)) => {
                        tracing::info!(path = ?path, "Config file changed, reloading");
                        let _ = tx.send(config);
                    }
                    Some(Err(e)) => {
                        metrics::record_config_reload(false);
                        tracing::error!(
                            path = ?path,
                            error = %e,
                            "Config reload rejected, keeping current configuration"
                        );
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[deployment]\nmode = \"development\"\n").unwrap();

        let mut state = ReloadState::default();
        let first = state.reload(&path).unwrap().unwrap();
        assert!(first.deployment.mode.is_development());
        assert!(state.reload(&path).is_none());

        std::fs::write(&path, "[deployment]\nmode = \"production\"\n").unwrap();
        let second = state.reload(&path).unwrap().unwrap();
        assert!(!second.deployment.mode.is_development());
    }

    #[test]
    fn test_bind_override_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[listener]\nbind_address = \"0.0.0.0:3000\"\n").unwrap();

        let mut state = ReloadState {
            last_content: None,
            bind_override: Some("127.0.0.1:9000".to_string()),
        };
        let config = state.reload(&path).unwrap().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_content_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[routing]\nviewer_prefix = \"view\"\n").unwrap();

        let mut state = ReloadState::default();
        assert!(matches!(state.reload(&path), Some(Err(_))));
        assert!(state.reload(&path).is_none());
    }
}
