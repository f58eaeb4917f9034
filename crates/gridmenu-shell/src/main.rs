mod commands;
mod console;
mod daemon;
mod demo;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use gridmenu::{MenuDocument, MenuHub, SerializableMenu};
use gridmenu_core::ViewerId;

use console::ConsoleOpener;
use daemon::ShellOptions;

#[derive(Parser)]
#[command(name = "gridmenu-shell")]
#[command(about = "Headless host for gridmenu menus, driven from stdin")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive shell (default)
    Run(RunArgs),
    /// Validate menu documents
    Check {
        /// Menu document files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print a menu document as a viewer would see it
    Render {
        file: PathBuf,
        /// Viewer substituted for <viewer>
        #[arg(long, default_value = "viewer")]
        viewer: String,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Configuration directory (default: ~/.config/gridmenu)
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Directory of menu documents to preload
    #[arg(long)]
    menus_dir: Option<PathBuf>,
    /// Print every surface refresh, animation frames included
    #[arg(long)]
    live: bool,
    /// Do not reload menus when their documents change
    #[arg(long)]
    no_watch: bool,
    /// Number of swatches in the demo gallery
    #[arg(long)]
    swatches: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridmenu_shell=info".parse()?)
                .add_directive("gridmenu=info".parse()?)
                .add_directive("gridmenu_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run(args)) => run(args),
        None => run(RunArgs::default()),
        Some(Command::Check { files }) => check(&files),
        Some(Command::Render { file, viewer }) => render(&file, &viewer),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    info!("Starting gridmenu shell");
    daemon::run(ShellOptions {
        config_dir: args.config_dir,
        menus_dir: args.menus_dir,
        live: args.live,
        watch: !args.no_watch,
        swatches: args.swatches,
    })
}

fn check(files: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0;
    for file in files {
        match MenuDocument::load(file).and_then(SerializableMenu::from_document) {
            Ok(menu) => println!("ok      {} ({})", file.display(), gridmenu::Menu::name(&menu)),
            Err(e) => {
                failed += 1;
                println!("invalid {}: {}", file.display(), e);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} menu documents are invalid", failed, files.len());
    }
    Ok(())
}

fn render(file: &Path, viewer: &str) -> anyhow::Result<()> {
    let opener = Arc::new(ConsoleOpener::new(false));
    let hub = MenuHub::new(opener.clone());
    let name = hub.load_menu_file(file)?;
    let viewer = ViewerId::from(viewer);
    hub.open_named(&viewer, &name)?;
    let surface = opener
        .surface(&viewer)
        .ok_or_else(|| anyhow::anyhow!("menu '{}' did not open", name))?;
    print!("{}", surface.render());
    Ok(())
}
