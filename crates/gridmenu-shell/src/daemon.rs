use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use async_channel::Sender;
use compact_str::CompactString;
use gridmenu::{ActionRegistry, AnimationScheduler, ClickEvent, HostEvent, MenuHub, Opener, SerializableMenu};
use gridmenu_core::{ConfigPaths, MenuSettings, SurfaceId, ViewerId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use crate::commands::{ShellCommand, HELP};
use crate::console::ConsoleOpener;
use crate::demo;
use crate::watcher::MenuWatcher;

const DEFAULT_SWATCHES: usize = 60;

#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    pub config_dir: Option<PathBuf>,
    pub menus_dir: Option<PathBuf>,
    pub live: bool,
    pub watch: bool,
    pub swatches: Option<usize>,
}

/// Run the shell until stdin closes or `quit` is read
pub fn run(options: ShellOptions) -> anyhow::Result<()> {
    let paths = match &options.config_dir {
        Some(dir) => ConfigPaths::in_dir(dir),
        None => ConfigPaths::new(),
    };
    let settings = MenuSettings::load(&paths.settings);
    let menus_dir = options
        .menus_dir
        .clone()
        .or_else(|| settings.menus_dir.clone())
        .unwrap_or(paths.menus_dir);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(options, settings, menus_dir))
}

async fn serve(options: ShellOptions, settings: MenuSettings, menus_dir: PathBuf) -> anyhow::Result<()> {
    let opener = Arc::new(ConsoleOpener::new(options.live));
    let hub = MenuHub::with_settings(settings, ActionRegistry::new(), opener.clone());
    let swatches = options.swatches.unwrap_or(DEFAULT_SWATCHES);
    demo::install(&hub, swatches)?;

    let mut shell = Shell {
        hub,
        opener,
        menus_dir,
        loaded: Vec::new(),
        swatches,
    };
    shell.reload();
    let _animations = AnimationScheduler::spawn(&shell.hub);

    let (command_tx, command_rx) = async_channel::bounded::<ShellCommand>(64);
    if options.watch {
        let watcher = MenuWatcher::new(shell.menus_dir.clone(), command_tx.clone());
        tokio::spawn(async move {
            if let Err(e) = watcher.run().await {
                error!("Menu watcher error: {}", e);
            }
        });
    }
    tokio::spawn(read_stdin(command_tx));

    info!("gridmenu shell ready, type 'help' for commands");
    while let Ok(command) = command_rx.recv().await {
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = shell.handle(command) {
            println!("error: {}", e);
        }
    }

    shell.hub.close_all();
    info!("gridmenu shell exiting");
    Ok(())
}

/// Forward parsed stdin lines; asks the loop to quit at end of input
async fn read_stdin(command_tx: Sender<ShellCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match ShellCommand::parse(&line) {
                Ok(Some(command)) => {
                    if command_tx.send(command).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => println!("error: {}", e),
            },
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
    let _ = command_tx.send(ShellCommand::Quit).await;
}

struct Shell {
    hub: Arc<MenuHub>,
    opener: Arc<ConsoleOpener>,
    menus_dir: PathBuf,
    /// Menus registered from `menus_dir` by the last reload
    loaded: Vec<CompactString>,
    swatches: usize,
}

impl Shell {
    fn handle(&mut self, command: ShellCommand) -> anyhow::Result<()> {
        match command {
            ShellCommand::Open { viewer, menu } => {
                self.hub.open_named(&viewer, &menu)?;
                self.show(&viewer);
            }
            ShellCommand::Browse { viewer } => {
                demo::gallery(&self.hub, self.swatches)?.open(&viewer)?;
                self.show(&viewer);
            }
            ShellCommand::Click { viewer, slot, kind } => {
                let surface = self.opener.active_surface(&viewer).unwrap_or(SurfaceId(0));
                let mut event = HostEvent::Click(ClickEvent::new(viewer.clone(), surface, slot, kind));
                self.hub.dispatch(&mut event);
                if let HostEvent::Click(click) = &event {
                    debug!("Click by {} cancelled: {}", viewer, click.is_cancelled());
                }
                self.show(&viewer);
            }
            ShellCommand::Close { viewer } => {
                let surface = self
                    .opener
                    .active_surface(&viewer)
                    .ok_or_else(|| anyhow!("{} has no open menu", viewer))?;
                self.opener.close_surface(&viewer);
                self.hub.dispatch(&mut HostEvent::Close { viewer, surface });
            }
            ShellCommand::Show { viewer } => self.show(&viewer),
            ShellCommand::Save { viewer, path } => {
                let view = self
                    .hub
                    .open_view_of(&viewer)
                    .ok_or_else(|| anyhow!("{} has no open menu", viewer))?;
                SerializableMenu::from_view(&view)?.save(&path)?;
                println!("saved '{}' to {}", view.menu().name(), path.display());
            }
            ShellCommand::Status => self.status(),
            ShellCommand::Menus => {
                for name in self.hub.menu_names() {
                    println!("{}", name);
                }
            }
            ShellCommand::Reload => self.reload(),
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => bail!("quit is handled by the command loop"),
        }
        Ok(())
    }

    fn show(&self, viewer: &ViewerId) {
        match self.opener.surface(viewer) {
            Some(surface) => print!("{}", surface.render()),
            None => println!("{} has no open menu", viewer),
        }
    }

    fn status(&self) {
        let views = self.hub.open_views();
        if views.is_empty() {
            println!("no open menus");
        }
        for view in views {
            let viewer = view.viewer().map(|v| v.to_string()).unwrap_or_default();
            let title = view.title().unwrap_or_default();
            match view.pagination() {
                Some(pagination) => println!(
                    "{}: '{}' page {}/{} ({} animations)",
                    viewer,
                    title,
                    pagination.current_index() + 1,
                    pagination.page_count(),
                    view.animation_task_count()
                ),
                None => println!("{}: '{}' ({} animations)", viewer, title, view.animation_task_count()),
            }
        }
    }

    /// Re-register every document in the menus directory, dropping menus
    /// whose documents are gone
    fn reload(&mut self) {
        let loaded = match self.hub.load_menus_from(&self.menus_dir) {
            Ok(loaded) => loaded,
            Err(e) => {
                debug!("Could not read menus dir {}: {}", self.menus_dir.display(), e);
                Vec::new()
            }
        };
        for stale in self.loaded.iter().filter(|name| !loaded.contains(*name)) {
            self.hub.unregister_menu(stale);
            info!("Unregistered menu '{}'", stale);
        }
        info!("Loaded {} menus from {}", loaded.len(), self.menus_dir.display());
        self.loaded = loaded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const WARPS: &str = r#"{"name": "warps", "properties": {"capacity": 1, "title": "Warps"}}"#;

    fn shell(dir: &Path) -> Shell {
        let opener = Arc::new(ConsoleOpener::new(false));
        let hub = MenuHub::new(opener.clone());
        demo::install(&hub, 5).unwrap();
        Shell {
            hub,
            opener,
            menus_dir: dir.to_path_buf(),
            loaded: Vec::new(),
            swatches: 5,
        }
    }

    #[test]
    fn test_reload_drops_removed_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warps.json");
        std::fs::write(&path, WARPS).unwrap();

        let mut shell = shell(dir.path());
        shell.reload();
        assert!(shell.hub.registered_menu("warps").is_some());

        std::fs::remove_file(&path).unwrap();
        shell.reload();
        assert!(shell.hub.registered_menu("warps").is_none());
        assert!(shell.hub.registered_menu("clock").is_some());
    }

    #[test]
    fn test_reload_skips_broken_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("warps.json"), WARPS).unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"name": "x", "properties": {"capacity": 4611686018427387904}}"#).unwrap();

        let mut shell = shell(dir.path());
        shell.reload();
        assert_eq!(shell.loaded, vec!["warps"]);

        shell.menus_dir = dir.path().join("missing");
        shell.reload();
        assert!(shell.loaded.is_empty());
        assert!(shell.hub.registered_menu("warps").is_none());
    }

    #[test]
    fn test_host_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(dir.path());
        let viewer = ViewerId::from("alex");
        shell
            .handle(ShellCommand::Open {
                viewer: viewer.clone(),
                menu: "clock".into(),
            })
            .unwrap();
        assert!(shell.hub.open_view_of(&viewer).is_some());

        shell.handle(ShellCommand::Close { viewer: viewer.clone() }).unwrap();
        assert!(shell.hub.open_view_of(&viewer).is_none());
        assert!(shell.handle(ShellCommand::Close { viewer }).is_err());
    }

    #[test]
    fn test_save_open_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell(dir.path());
        let viewer = ViewerId::from("alex");
        shell.handle(ShellCommand::Browse { viewer: viewer.clone() }).unwrap();

        let path = dir.path().join("saved").join("gallery.json");
        shell
            .handle(ShellCommand::Save {
                viewer,
                path: path.clone(),
            })
            .unwrap();
        let document = gridmenu::MenuDocument::load(&path).unwrap();
        assert_eq!(document.name, "gallery");
        assert_eq!(document.properties.title, "Gallery 1/1");
    }
}
