use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{DEFAULT_STOREFRONT_VERSION, StorefrontSettings};

pub const DEFAULT_SHOP_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:campaign_votes.db";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "campaign-vote",
    version,
    about = "Mounts the campaign vote widgets of a storefront page"
)]
pub struct Cli {
    /// JSON page document listing the widget containers.
    #[arg(long, env = "PAGE_FILE", value_name = "PATH")]
    pub page: PathBuf,

    /// Origin the app proxy and storefront API live on.
    #[arg(long, env = "SHOP_ORIGIN", default_value = DEFAULT_SHOP_ORIGIN)]
    pub shop_origin: String,

    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Keep preferences in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    #[arg(long, env = "STOREFRONT_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub storefront_token: Option<String>,

    #[arg(long, env = "STOREFRONT_API_VERSION", default_value = DEFAULT_STOREFRONT_VERSION)]
    pub storefront_api_version: String,

    #[arg(
        long,
        env = "RESULTS_REFRESH_SECONDS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=3600)
    )]
    pub refresh_seconds: u64,

    /// Development mode: allows clearing recorded votes.
    #[arg(long, env = "CAMPAIGN_DEV_MODE")]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every mounted widget.
    Render,
    /// Refetch results and print them.
    Results {
        #[arg(long)]
        container: Option<String>,
    },
    /// Vote for a product in one container.
    Vote {
        #[arg(long)]
        container: String,
        #[arg(long)]
        product: String,
    },
    /// Forget recorded votes (dev mode only).
    Clear {
        #[arg(long)]
        container: String,
    },
    /// Wipe every stored preference (dev mode only).
    Reset,
    /// Keep widgets mounted and print them whenever they change.
    Watch,
}

// Process-wide, shared by every mounted widget.
#[derive(Debug, Clone)]
pub struct Settings {
    pub shop_origin: String,
    pub storefront: StorefrontSettings,
    pub refresh_interval: Duration,
    pub dev_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shop_origin: DEFAULT_SHOP_ORIGIN.to_string(),
            storefront: StorefrontSettings::default(),
            refresh_interval: Duration::from_secs(crate::models::DEFAULT_REFRESH_SECONDS),
            dev_mode: false,
        }
    }
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            shop_origin: self.shop_origin.clone(),
            storefront: StorefrontSettings {
                api_version: self.storefront_api_version.clone(),
                access_token: self.storefront_token.clone().filter(|t| !t.is_empty()),
            },
            refresh_interval: Duration::from_secs(self.refresh_seconds),
            dev_mode: self.dev,
        }
    }
}
