//! Terminal walkthrough of the toast lifecycle: shows a few toasts, feeds
//! measured heights back like a renderer would, exercises pause/resume and
//! the promise helper, and logs each layout pass until the registry drains.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tokio::time::sleep;
use tracing::info;

use toastkit::config::Config;
use toastkit::telemetry::init_tracing;
use toastkit::{PromiseMessages, Result, ToastOptions, ToastStore, Toaster};

const DEFAULT_CONFIG: &str = "toastkit.toml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Walk through the toast lifecycle in a terminal", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Render buckets as collapsed piles regardless of configuration.
    #[arg(long, action = ArgAction::SetTrue)]
    stacked: bool,

    /// Use a JSON layer for logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    json_logs: bool,

    /// Explicit log filter (e.g. "toastkit=debug").
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut options = Config::from_env_and_file(&config_path)?.toaster_options();
    if cli.stacked {
        options.stacked = true;
    }

    let store = ToastStore::new();
    let toaster = Toaster::new(&store, options);

    let saved = store.success("Draft saved", ToastOptions::default());
    let failed = store.error("Upload failed", ToastOptions::default());

    // Stand in for the renderer reporting measured heights.
    toaster.update_height(&saved, 48.0);
    toaster.update_height(&failed, 48.0);
    render(&toaster);

    // Hovering the container pauses every countdown; the paused interval is
    // credited back on resume.
    toaster.start_pause();
    sleep(Duration::from_millis(400)).await;
    toaster.end_pause();

    let outcome = store
        .promise(
            async {
                sleep(Duration::from_millis(600)).await;
                Ok::<_, String>("42 rows")
            },
            PromiseMessages::new("Importing…", "Import finished", "Import failed"),
            ToastOptions::default(),
        )
        .await;
    info!(result = ?outcome, "import settled");

    for _ in 0..40 {
        if store.state().toasts.is_empty() {
            break;
        }
        sleep(Duration::from_millis(250)).await;
        render(&toaster);
    }

    info!("registry drained, shutting down");
    Ok(())
}

fn render(toaster: &Toaster) {
    if toaster.options().stacked {
        for slot in toaster.stacked_offsets(true) {
            info!(
                toast_id = %slot.id,
                offset = slot.offset,
                scale = slot.scale,
                collapsed = slot.collapsed,
                "stacked slot"
            );
        }
    } else {
        for toast in toaster.toasts() {
            info!(
                toast_id = %toast.id,
                kind = %toast.toast_type,
                offset = toaster.calculate_offset(&toast),
                visible = toast.visible,
                message = %toast.resolve_message(),
                "toast"
            );
        }
    }
}
