//! Daemonium Bibliotheca entrypoint.
use anyhow::Result;
use clap::Parser;
use core_actions::{
    Clipboard, ClipboardBridge, FileFilter, MemoryClipboard, SaveCoordinator, SystemClipboard,
};
use core_config::{ClipboardBackend, Config, FilterConfig, ViewsConfig, load_from};
use core_events::event_channel;
use core_model::{ViewTitles, Workbench};
use core_terminal::CrosstermBackend;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;
mod host;
mod prompt;
mod runtime;

use host::{Console, TerminalHost};
use runtime::ShellRuntime;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "bibliotheca", version, about = "Daemonium Bibliotheca shell")]
struct Args {
    /// Optional document to open in the editor view at startup.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `bibliotheca.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn configure_logging(log_path: &Path) -> Option<WorkerGuard> {
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }
    let dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "bibliotheca.log".into());

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn view_titles(views: &ViewsConfig) -> ViewTitles {
    ViewTitles {
        repl: views.repl_title.clone(),
        editor: views.editor_title.clone(),
        untitled: views.untitled_title.clone(),
        editing_prefix: views.editing_prefix.clone(),
    }
}

fn file_filters(filters: &[FilterConfig]) -> Vec<FileFilter> {
    filters
        .iter()
        .map(|f| FileFilter {
            description: f.description.clone(),
            patterns: f.patterns.clone(),
        })
        .collect()
}

fn build_clipboard(backend: ClipboardBackend) -> Box<dyn Clipboard> {
    match backend {
        ClipboardBackend::Memory => Box::new(MemoryClipboard::default()),
        ClipboardBackend::System => match SystemClipboard::new() {
            Ok(clipboard) => Box::new(clipboard),
            Err(e) => {
                warn!(target: "clipboard", error = %e, "system_clipboard_unavailable_using_memory");
                Box::new(MemoryClipboard::default())
            }
        },
    }
}

fn build_coordinator(config: &Config) -> SaveCoordinator {
    SaveCoordinator::default().with_filters(
        file_filters(&config.file.files.open_filters),
        file_filters(&config.file.files.save_filters),
    )
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(&config.file.logging.file);
    install_panic_hook();

    info!(
        target: "runtime",
        config = config.source.as_ref().map(|p| p.display().to_string()).as_deref(),
        path = args.path.as_ref().map(|p| p.display().to_string()).as_deref(),
        "startup"
    );

    let console = Console::new(CrosstermBackend::new());
    let workbench = Workbench::new(
        TerminalHost::new(console.clone()),
        build_coordinator(&config),
        ClipboardBridge::new(build_clipboard(config.file.clipboard.backend)),
        view_titles(&config.file.views),
    );

    let (tx, rx) = event_channel();
    let _input = core_input::spawn_line_reader(BufReader::new(std::io::stdin()), tx);

    let mut runtime = ShellRuntime::new(workbench, console, rx);
    runtime.open_initial(args.path.as_deref());
    let reason = runtime.run();
    info!(
        target: "runtime",
        %reason,
        dirty = runtime.workbench().session().is_dirty(),
        "exit"
    );
    Ok(())
}
