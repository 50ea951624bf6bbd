mod api;
mod bootstrap;
mod config;
mod error;
mod models;
mod store;
mod tasks;
mod voting;
mod widget;

use bootstrap::{MountContext, MountOutcome, MountedApp, Page};
use clap::Parser;
use config::{Cli, Command};
use log::{error, info, warn};
use std::sync::Arc;
use store::{MemoryStore, PreferenceStore, Preferences, SqliteStore};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use widget::{ActionOutcome, WidgetAction};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn mounted(outcomes: &[MountOutcome]) -> impl Iterator<Item = &MountedApp> {
    outcomes.iter().filter_map(|outcome| match outcome {
        MountOutcome::Mounted(app) => Some(app),
        MountOutcome::Failed(_) => None,
    })
}

fn find<'a>(outcomes: &'a [MountOutcome], container: &str) -> Result<&'a MountedApp, BoxError> {
    match outcomes.iter().find(|outcome| outcome.container_id() == container) {
        Some(MountOutcome::Mounted(app)) => Ok(app),
        Some(MountOutcome::Failed(panel)) => {
            Err(format!("Vote widget in '{}' did not mount: {}", container, panel.message).into())
        }
        None => Err(format!("No vote widget container '{}'", container).into()),
    }
}

fn print_all(outcomes: &[MountOutcome]) {
    for outcome in outcomes {
        match outcome {
            MountOutcome::Mounted(app) => println!("{}", app.widget.view().render_html()),
            MountOutcome::Failed(panel) => println!("{}", panel.render_html()),
        }
    }
}

async fn watch(outcomes: &[MountOutcome]) -> Result<(), BoxError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // One forwarder per widget: state changes trigger a re-render, events
    // are only logged.
    for app in mounted(outcomes) {
        let mut state = app.engine().subscribe();
        let mut events = app.engine().events().subscribe();
        let tx = tx.clone();
        let container_id = app.container_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = state.changed() => {
                        if changed.is_err() || tx.send(container_id.clone()).is_err() {
                            break;
                        }
                    }
                    received = events.recv() => match received {
                        Ok(event) => info!("{}: {}", container_id, event.name()),
                        Err(RecvError::Lagged(missed)) => {
                            warn!("{} missed {} events", container_id, missed);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });
    }
    drop(tx);

    print_all(outcomes);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                info!("Shutting down");
                break;
            }
            received = rx.recv() => match received {
                Some(container_id) => {
                    if let Ok(app) = find(outcomes, &container_id) {
                        println!("{}", app.widget.view().render_html());
                    }
                }
                None => break,
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.page)?;
    let page = Page::from_json(&raw)?;

    let store: Arc<dyn PreferenceStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        match SqliteStore::connect(&cli.database_url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Failed to open preference database: {}", e);
                return Err(e.into());
            }
        }
    };

    let ctx = MountContext {
        settings: cli.settings(),
        http: reqwest::Client::new(),
        prefs: Preferences::new(store),
    };

    let outcomes = bootstrap::mount_all(&page, &ctx).await;
    info!("Processed {} container(s)", outcomes.len());

    match cli.command {
        Command::Render => print_all(&outcomes),
        Command::Results { container } => {
            for app in mounted(&outcomes)
                .filter(|app| container.as_deref().is_none_or(|id| id == app.container_id))
            {
                app.widget.dispatch(WidgetAction::Refresh).await;
                println!("{}", app.widget.view().render_html());
            }
        }
        Command::Vote { container, product } => {
            let app = find(&outcomes, &container)?;
            match app.widget.dispatch(WidgetAction::Vote(product.into())).await {
                ActionOutcome::Voted => info!("Vote recorded in {}", container),
                other => warn!("Vote not recorded in {}: {:?}", container, other),
            }
            println!("{}", app.widget.view().render_html());
        }
        Command::Clear { container } => {
            let app = find(&outcomes, &container)?;
            let outcome = app.widget.dispatch(WidgetAction::ClearVotes).await;
            info!("Clear votes in {}: {:?}", container, outcome);
            println!("{}", app.widget.view().render_html());
        }
        Command::Reset => {
            if cli.dev {
                ctx.prefs.clear().await;
                info!("Cleared every stored preference");
            } else {
                warn!("Ignoring reset outside dev mode");
            }
        }
        Command::Watch => watch(&outcomes).await?,
    }

    for outcome in outcomes {
        if let MountOutcome::Mounted(app) = outcome {
            app.unmount();
        }
    }

    Ok(())
}
