use std::path::{Path, PathBuf};
use std::time::Duration;

use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::commands::ShellCommand;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the menus directory and asks for a reload when documents change
pub struct MenuWatcher {
    dir: PathBuf,
    command_tx: Sender<ShellCommand>,
}

fn is_menu_document(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

impl MenuWatcher {
    pub fn new(dir: PathBuf, command_tx: Sender<ShellCommand>) -> Self {
        Self { dir, command_tx }
    }

    /// Run until the command channel closes
    pub async fn run(self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        info!("Watching menus in {}", self.dir.display());

        let (notify_tx, mut notify_rx) = mpsc::channel::<PathBuf>(32);
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(
                        event.kind,
                        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                    ) {
                        for path in event.paths {
                            let _ = notify_tx.blocking_send(path);
                        }
                    }
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        let mut debounce_deadline: Option<tokio::time::Instant> = None;
        loop {
            tokio::select! {
                changed = notify_rx.recv() => {
                    let Some(path) = changed else { break };
                    if is_menu_document(&path) {
                        debug!("Menu document changed: {}", path.display());
                        debounce_deadline = Some(tokio::time::Instant::now() + DEBOUNCE);
                    }
                }

                _ = async {
                    match debounce_deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    debounce_deadline = None;
                    if self.command_tx.send(ShellCommand::Reload).await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Menu watcher stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_json_documents() {
        assert!(is_menu_document(Path::new("/menus/warps.json")));
        assert!(!is_menu_document(Path::new("/menus/warps.json.swp")));
        assert!(!is_menu_document(Path::new("/menus/README")));
    }
}
