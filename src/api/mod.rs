use log::error;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::models::{Product, ProductId, VoteResult};

pub const VOTE_PATH: &str = "/vote";
pub const RESULTS_PATH: &str = "/results";
pub const STOREFRONT_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";
pub const DEFAULT_STOREFRONT_VERSION: &str = "2024-01";

const PRODUCTS_QUERY: &str = r#"
query Products($first: Int!) {
  products(first: $first) {
    edges { node { id title } }
  }
}
"#;

#[derive(Debug, Clone)]
pub struct StorefrontSettings {
    pub api_version: String,
    pub access_token: Option<String>,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_STOREFRONT_VERSION.to_string(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest<'a> {
    pub product_id: &'a ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<&'a str>,
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<VoteResult>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct ProductsData {
    products: ProductConnection,
}

#[derive(Deserialize)]
struct ProductConnection {
    edges: Vec<ProductEdge>,
}

#[derive(Deserialize)]
struct ProductEdge {
    node: Product,
}

// JSON client for the campaign app proxy and the storefront GraphQL API.
#[derive(Debug, Clone)]
pub struct StorefrontApi {
    http: reqwest::Client,
    shop_origin: String,
    base_url: String,
    storefront: StorefrontSettings,
}

impl StorefrontApi {
    /// `api_base_endpoint` is either an absolute URL or a path on the shop
    /// origin (an app proxy prefix such as `/apps/campaign-api`).
    pub fn new(
        http: reqwest::Client,
        shop_origin: &str,
        api_base_endpoint: &str,
        storefront: StorefrontSettings,
    ) -> Self {
        let shop_origin = shop_origin.trim_end_matches('/').to_string();
        let endpoint = api_base_endpoint.trim_end_matches('/');
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{shop_origin}{endpoint}")
        } else {
            format!("{shop_origin}/{endpoint}")
        };

        Self {
            http,
            shop_origin,
            base_url,
            storefront,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_storefront_token(&self) -> bool {
        self.storefront.access_token.is_some()
    }

    pub fn graphql_url(&self) -> String {
        format!(
            "{}/api/{}/graphql.json",
            self.shop_origin, self.storefront.api_version
        )
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let method = options.method.clone();

        let result = self.send(&url, options).await;
        if let Err(e) = &result {
            error!("API Error: {} {}: {}", method, url, e);
        }
        result
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(path, RequestOptions::default()).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions {
            method: Method::POST,
            body: Some(serde_json::to_value(body).map_err(ApiError::Encode)?),
        };
        self.request(path, options).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let mut builder = self
            .http
            .request(options.method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body).map_err(ApiError::Encode)?);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // The first entry of `errors` wins over `data`.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        let token = self
            .storefront
            .access_token
            .as_deref()
            .ok_or(ApiError::MissingStorefrontToken)?;

        let resp = self
            .http
            .post(self.graphql_url())
            .header(CONTENT_TYPE, "application/json")
            .header(STOREFRONT_TOKEN_HEADER, token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body: GraphQlResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(_) if !status.is_success() => return Err(status_error(status)),
            Err(e) => return Err(e.into()),
        };

        if let Some(first) = body.errors.into_iter().next() {
            return Err(ApiError::GraphQl(first.message));
        }

        body.data
            .ok_or_else(|| ApiError::GraphQl("GraphQL response contained no data".to_string()))
    }

    pub async fn fetch_products(&self, first: u32) -> Result<Vec<Product>, ApiError> {
        let data: ProductsData = self
            .graphql(PRODUCTS_QUERY, json!({ "first": first }))
            .await?;
        Ok(data.products.edges.into_iter().map(|edge| edge.node).collect())
    }
}

fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        status_text: status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
    }
}
