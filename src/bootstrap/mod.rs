mod container;

pub use container::{ContainerConfig, ContainerElement, HostConfig, Page};

use log::{error, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::StorefrontApi;
use crate::config::Settings;
use crate::error::MountError;
use crate::models::{EngineConfiguration, FeatureFlags, Product, VoteLimit};
use crate::store::Preferences;
use crate::tasks::results_refresher;
use crate::voting::VoteEngine;
use crate::widget::{ErrorPanel, Widget};

const PRODUCT_PAGE_SIZE: u32 = 20;

// Overrides a host may put in a container's `data-custom` JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomOverrides {
    title: Option<String>,
    voting_enabled: Option<bool>,
    max_votes_per_user: Option<i64>,
    show_results: Option<bool>,
    real_time_updates: Option<bool>,
    products: Option<Vec<Product>>,
}

// What one container resolves to before any I/O happens.
#[derive(Debug, Clone)]
pub struct ResolvedContainer {
    pub shop_origin: String,
    pub title: String,
    pub engine: EngineConfiguration,
    pub products: Option<Vec<Product>>,
}

// Shared by every mount on a page.
#[derive(Clone)]
pub struct MountContext {
    pub settings: Settings,
    pub http: reqwest::Client,
    pub prefs: Preferences,
}

pub struct MountedApp {
    pub container_id: String,
    pub config: ContainerConfig,
    pub widget: Widget,
    refresher: Option<JoinHandle<()>>,
}

impl MountedApp {
    pub fn engine(&self) -> &Arc<VoteEngine> {
        self.widget.engine()
    }

    pub fn unmount(self) {
        info!("Unmounting {}", self.container_id);
    }
}

impl Drop for MountedApp {
    fn drop(&mut self) {
        if let Some(handle) = self.refresher.take() {
            handle.abort();
        }
    }
}

pub enum MountOutcome {
    Mounted(MountedApp),
    Failed(ErrorPanel),
}

impl MountOutcome {
    pub fn container_id(&self) -> &str {
        match self {
            MountOutcome::Mounted(app) => &app.container_id,
            MountOutcome::Failed(panel) => &panel.container_id,
        }
    }
}

fn invalid(container: &str, reason: impl Into<String>) -> MountError {
    MountError::InvalidConfig {
        container: container.to_string(),
        reason: reason.into(),
    }
}

// Turns container attributes plus process settings into engine settings.
pub fn resolve(
    container_id: &str,
    config: &ContainerConfig,
    settings: &Settings,
) -> Result<ResolvedContainer, MountError> {
    let overrides = match &config.custom {
        Some(value @ Value::Object(_)) => CustomOverrides::deserialize(value)
            .map_err(|e| invalid(container_id, format!("custom data: {e}")))?,
        _ => CustomOverrides::default(),
    };

    let defaults = EngineConfiguration::default();
    let max_votes_per_user = match overrides.max_votes_per_user {
        Some(raw) => VoteLimit::from_raw(raw).ok_or_else(|| {
            invalid(container_id, format!("maxVotesPerUser must be -1 or at least 0, got {raw}"))
        })?,
        None => defaults.max_votes_per_user,
    };

    let shop_origin = if config.shop_url.is_empty() {
        settings.shop_origin.clone()
    } else {
        config.shop_url.clone()
    };
    reqwest::Url::parse(&shop_origin)
        .map_err(|e| invalid(container_id, format!("shop origin {shop_origin}: {e}")))?;

    let engine = EngineConfiguration {
        voting_enabled: overrides.voting_enabled.unwrap_or(defaults.voting_enabled),
        max_votes_per_user,
        api_base_endpoint: config.api_endpoint.clone(),
        customer_id: config.customer_id.clone(),
        show_results: overrides.show_results.unwrap_or(defaults.show_results),
        dev_mode: settings.dev_mode,
        features: FeatureFlags {
            real_time_updates: overrides
                .real_time_updates
                .unwrap_or(defaults.features.real_time_updates),
        },
        refresh_interval: settings.refresh_interval,
    };

    Ok(ResolvedContainer {
        shop_origin,
        title: overrides.title.unwrap_or_else(|| config.app_name.clone()),
        engine,
        products: overrides.products,
    })
}

pub async fn mount_container(
    element: &ContainerElement,
    host: Option<&HostConfig>,
    ctx: &MountContext,
) -> Result<MountedApp, MountError> {
    let config = ContainerConfig::from_dataset(&element.dataset(), host);
    let resolved = resolve(&element.id, &config, &ctx.settings)?;

    let api = StorefrontApi::new(
        ctx.http.clone(),
        &resolved.shop_origin,
        &resolved.engine.api_base_endpoint,
        ctx.settings.storefront.clone(),
    );
    reqwest::Url::parse(api.base_url())
        .map_err(|e| invalid(&element.id, format!("api endpoint {}: {e}", api.base_url())))?;

    let products = match resolved.products {
        Some(products) => products,
        None if api.has_storefront_token() => {
            api.fetch_products(PRODUCT_PAGE_SIZE).await.unwrap_or_else(|e| {
                warn!("Could not load products for {}: {}", element.id, e);
                Vec::new()
            })
        }
        None => Vec::new(),
    };

    let engine_config = resolved.engine;
    let real_time = engine_config.features.real_time_updates;
    let period = engine_config.refresh_interval;
    let engine = Arc::new(VoteEngine::new(engine_config, api, ctx.prefs.clone()).await);
    engine.fetch_results().await;

    let refresher =
        real_time.then(|| results_refresher::spawn(engine.clone(), element.id.clone(), period));

    Ok(MountedApp {
        container_id: element.id.clone(),
        widget: Widget::new(element.id.clone(), resolved.title, engine, products),
        config,
        refresher,
    })
}

// Mounts one widget per container. A container that fails to mount gets an
// error panel; the others are unaffected.
pub async fn mount_all(page: &Page, ctx: &MountContext) -> Vec<MountOutcome> {
    let mut outcomes = Vec::new();

    for element in page.containers() {
        match mount_container(element, page.host_config(element), ctx).await {
            Ok(app) => {
                info!(
                    "Vote widget mounted to {} ({}, {})",
                    app.container_id, app.config.locale, app.config.currency
                );
                outcomes.push(MountOutcome::Mounted(app));
            }
            Err(e) => {
                error!("Failed to mount vote widget to {}: {}", element.id, e);
                let panel = ErrorPanel::mount_failure(element.id.clone());
                if let Some(boundary) = panel.boundary_id() {
                    info!("Showing error boundary {}", boundary);
                }
                outcomes.push(MountOutcome::Failed(panel));
            }
        }
    }

    outcomes
}
