mod render;

pub use render::ErrorPanel;

use crate::models::{EngineState, Product, ProductId};
use crate::voting::VoteEngine;
use log::{info, warn};
use std::sync::Arc;

pub const VOTED_BANNER: &str = "Thanks for voting!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetAction {
    Vote(ProductId),
    Refresh,
    ClearVotes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Voted,
    VoteFailed(Option<String>),
    Refreshed,
    Cleared,
    Ignored(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteButton {
    pub product: Product,
    pub enabled: bool,
    pub voted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub product_id: ProductId,
    pub title: String,
    pub vote_count: u64,
}

// Everything the widget shows for one engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub container_id: String,
    pub title: String,
    pub loading: bool,
    pub buttons: Vec<VoteButton>,
    pub banner: Option<String>,
    pub error: Option<String>,
    pub results: Option<Vec<ResultRow>>,
}

pub struct Widget {
    container_id: String,
    title: String,
    engine: Arc<VoteEngine>,
    products: Vec<Product>,
}

impl Widget {
    pub fn new(
        container_id: impl Into<String>,
        title: impl Into<String>,
        engine: Arc<VoteEngine>,
        products: Vec<Product>,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            title: title.into(),
            engine,
            products,
        }
    }

    pub fn engine(&self) -> &Arc<VoteEngine> {
        &self.engine
    }

    pub async fn dispatch(&self, action: WidgetAction) -> ActionOutcome {
        match action {
            WidgetAction::Vote(product_id) => self.handle_vote_button(product_id).await,
            WidgetAction::Refresh => {
                self.engine.fetch_results().await;
                ActionOutcome::Refreshed
            }
            WidgetAction::ClearVotes => {
                if self.engine.clear_votes().await {
                    ActionOutcome::Cleared
                } else {
                    ActionOutcome::Ignored("clearing votes is only available in dev mode")
                }
            }
        }
    }

    async fn handle_vote_button(&self, product_id: ProductId) -> ActionOutcome {
        info!(
            "Processing vote button for {} in {}",
            product_id, self.container_id
        );

        // The buttons are disabled while a request runs.
        if self.engine.state().loading {
            return ActionOutcome::Ignored("a request is already in progress");
        }
        if !self.products.is_empty() && !self.products.iter().any(|p| p.id == product_id) {
            warn!("Vote for unknown product {} in {}", product_id, self.container_id);
            return ActionOutcome::Ignored("unknown product");
        }
        if self.engine.has_voted_for(&product_id) {
            return ActionOutcome::Ignored("already voted for this product");
        }

        if self.engine.submit_vote(product_id).await {
            ActionOutcome::Voted
        } else {
            ActionOutcome::VoteFailed(self.engine.state().last_error)
        }
    }

    pub fn view(&self) -> WidgetView {
        let state = self.engine.state();
        let can_vote = self.engine.can_vote();

        let buttons = self
            .listed_products(&state)
            .into_iter()
            .map(|product| {
                let voted = state.votes.iter().any(|v| v.product_id == product.id);
                VoteButton {
                    enabled: can_vote && !state.loading && !voted,
                    voted,
                    product,
                }
            })
            .collect();

        let results = self.engine.config().show_results.then(|| {
            let mut rows: Vec<ResultRow> = state
                .results
                .iter()
                .map(|result| ResultRow {
                    product_id: result.product_id.clone(),
                    title: self.title_for(&result.product_id),
                    vote_count: result.vote_count,
                })
                .collect();
            rows.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
            rows
        });

        WidgetView {
            container_id: self.container_id.clone(),
            title: self.title.clone(),
            loading: state.loading,
            buttons,
            banner: self.engine.has_voted().then(|| VOTED_BANNER.to_string()),
            error: state.last_error.clone(),
            results,
        }
    }

    fn listed_products(&self, state: &EngineState) -> Vec<Product> {
        if !self.products.is_empty() {
            return self.products.clone();
        }
        state
            .results
            .iter()
            .map(|result| Product {
                id: result.product_id.clone(),
                title: result.product_id.to_string(),
            })
            .collect()
    }

    fn title_for(&self, product_id: &ProductId) -> String {
        self.products
            .iter()
            .find(|product| &product.id == product_id)
            .map(|product| product.title.clone())
            .unwrap_or_else(|| product_id.to_string())
    }
}
