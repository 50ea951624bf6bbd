use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::DEFAULT_API_ENDPOINT;

pub const DEFAULT_APP_NAME: &str = "vote-widget";
pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const FALLBACK_CONTAINER_ID: &str = "app";

lazy_static! {
    static ref APP_CONTAINER_ID: Regex = Regex::new(r"^headless-app-(.+)$").unwrap();
}

/// Page snapshot handed over by the host storefront. `headless_config` is
/// what the theme injects per section, keyed by the part of the container id
/// after `headless-app-`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub elements: Vec<ContainerElement>,
    #[serde(default)]
    pub headless_config: BTreeMap<String, HostConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    pub shop_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub locale: Option<String>,
    pub currency: Option<String>,
    pub customer: Option<HostCustomer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostCustomer {
    // Shopify hands customer ids out as numbers.
    pub id: Option<Value>,
    pub email: Option<String>,
}

impl HostCustomer {
    fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerElement {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Page {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    // Containers to mount: every `headless-app-*` element, or the `app`
    // fallback when there are none.
    pub fn containers(&self) -> Vec<&ContainerElement> {
        let found: Vec<&ContainerElement> = self
            .elements
            .iter()
            .filter(|element| element.section_id().is_some())
            .collect();
        if !found.is_empty() {
            return found;
        }

        match self.elements.iter().find(|e| e.id == FALLBACK_CONTAINER_ID) {
            Some(fallback) => vec![fallback],
            None => {
                warn!("No vote widget container found");
                Vec::new()
            }
        }
    }

    pub fn host_config(&self, element: &ContainerElement) -> Option<&HostConfig> {
        element
            .section_id()
            .and_then(|section| self.headless_config.get(section))
    }
}

impl ContainerElement {
    pub fn section_id(&self) -> Option<&str> {
        APP_CONTAINER_ID
            .captures(&self.id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    // `data-*` attributes keyed the way the browser's `dataset` keys them:
    // `data-api-endpoint` becomes `apiEndpoint`.
    pub fn dataset(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|rest| (camel_case(rest), value.clone()))
            })
            .collect()
    }
}

fn camel_case(kebab: &str) -> String {
    let mut out = String::with_capacity(kebab.len());
    let mut upper_next = false;
    for c in kebab.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// Malformed or empty input yields `None`.
pub fn parse_json(raw: Option<&str>) -> Option<Value> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed custom container data: {}", e);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerConfig {
    pub app_name: String,
    pub api_endpoint: String,
    pub shop_url: String,
    pub shop_domain: String,
    pub locale: String,
    pub currency: String,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub custom: Option<Value>,
}

impl ContainerConfig {
    /// Data attributes win, then the section's host config, then defaults.
    pub fn from_dataset(dataset: &BTreeMap<String, String>, host: Option<&HostConfig>) -> Self {
        let host = host.cloned().unwrap_or_default();
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        let text = |key: &str| present(dataset.get(key).cloned());
        let pick = |key: &str, fallback: Option<String>, default: &str| {
            text(key)
                .or_else(|| present(fallback))
                .unwrap_or_else(|| default.to_string())
        };
        let customer = host.customer.unwrap_or_default();

        Self {
            app_name: pick("appName", None, DEFAULT_APP_NAME),
            api_endpoint: pick("apiEndpoint", host.api_endpoint, DEFAULT_API_ENDPOINT),
            shop_url: pick("shopUrl", host.shop_url, ""),
            shop_domain: pick("shopDomain", None, ""),
            locale: pick("locale", host.locale, DEFAULT_LOCALE),
            currency: pick("currency", host.currency, DEFAULT_CURRENCY),
            customer_id: text("customerId").or_else(|| present(customer.id_text())),
            customer_email: text("customerEmail").or_else(|| present(customer.email)),
            custom: parse_json(dataset.get("custom").map(String::as_str)),
        }
    }
}
