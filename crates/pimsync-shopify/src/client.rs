//! HTTP client for the Shopify Admin API.
//!
//! Products and metafields go through the GraphQL Admin API; the default
//! variant and product images go through the REST Admin API, which still
//! owns those update paths. Field mapping lives in `pimsync-core::push`;
//! this crate only transports the assignments.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use pimsync_core::push::{MetafieldAssignment, ProductFields, ProductPush, VariantFields};

use crate::error::ShopifyError;
use crate::retry::retry_with_backoff;
use crate::types::{
    GraphQlError, GraphQlResponse, MetafieldsSetData, ProductByHandleData, ProductCreateData,
    ProductMutationPayload, ProductUpdateData, UserError, VariantsEnvelope,
};

const PRODUCT_CREATE_MUTATION: &str = "\
mutation($input: ProductInput!) {
  productCreate(input: $input) { product { id } userErrors { field message } }
}";

const PRODUCT_UPDATE_MUTATION: &str = "\
mutation($input: ProductInput!) {
  productUpdate(input: $input) { product { id } userErrors { field message } }
}";

const PRODUCT_BY_HANDLE_QUERY: &str =
    "query($handle: String!) { productByHandle(handle: $handle) { id } }";

const METAFIELDS_SET_MUTATION: &str = "\
mutation($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) { metafields { id } userErrors { field message } }
}";

/// How an upsert landed: a fresh product, or an update of the product that
/// already owned the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
}

impl UpsertOutcome {
    /// GraphQL global id of the product, whichever way the upsert went.
    #[must_use]
    pub fn product_id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

/// Client for one Shopify store's Admin API.
///
/// Transient errors (GraphQL `THROTTLED`, HTTP 429, network failures) are
/// retried with exponential backoff up to `max_retries` additional attempts.
#[derive(Debug)]
pub struct ShopifyClient {
    client: Client,
    graphql_url: String,
    rest_base: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl ShopifyClient {
    /// Creates a client for `https://{domain}/admin/api/{api_version}`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShopifyError::Api`] if the access token
    /// is not a valid header value.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        domain: &str,
        token: &str,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ShopifyError> {
        Self::with_base_url(
            &format!("https://{domain}"),
            token,
            api_version,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_secs,
        )
    }

    /// Like [`Self::new`] but with an explicit base URL. Point it at a mock
    /// server for tests.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    #[allow(clippy::too_many_arguments)]
    pub fn with_base_url(
        base_url: &str,
        token: &str,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();
        let mut token_value = HeaderValue::from_str(token)
            .map_err(|_| ShopifyError::Api("access token is not a valid header value".into()))?;
        token_value.set_sensitive(true);
        headers.insert("X-Shopify-Access-Token", token_value);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        let api_base = format!(
            "{}/admin/api/{api_version}",
            base_url.trim_end_matches('/'),
        );

        Ok(Self {
            client,
            graphql_url: format!("{api_base}/graphql.json"),
            rest_base: api_base,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates the product or, when its handle is already taken, updates the
    /// product that owns the handle.
    ///
    /// Only the product-level fields are written here; the variant,
    /// metafields, and image have their own calls so one failing step does
    /// not mask the others.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::UserErrors`] if Shopify rejects the mutation for a
    ///   reason other than a handle conflict.
    /// - [`ShopifyError::Api`] if the conflicting handle cannot be resolved
    ///   to an existing product.
    /// - Plus the transport errors of [`Self::execute_graphql`].
    pub async fn upsert_product(&self, push: &ProductPush) -> Result<UpsertOutcome, ShopifyError> {
        match self.create_product(&push.product).await {
            Ok(id) => Ok(UpsertOutcome::Created(id)),
            Err(ShopifyError::HandleTaken) => {
                let handle = &push.product.handle;
                tracing::info!(handle, "handle already taken, updating existing product");
                let existing = self
                    .find_product_by_handle(handle)
                    .await?
                    .ok_or_else(|| {
                        ShopifyError::Api(format!(
                            "handle {handle} reported taken but no product owns it"
                        ))
                    })?;
                let id = self.update_product(&existing, &push.product).await?;
                Ok(UpsertOutcome::Updated(id))
            }
            Err(err) => Err(err),
        }
    }

    /// Runs `productCreate`. A handle conflict in `userErrors` surfaces as
    /// [`ShopifyError::HandleTaken`] so the caller can fall back to an
    /// update.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::HandleTaken`], [`ShopifyError::UserErrors`], or the
    /// transport errors of [`Self::execute_graphql`].
    pub async fn create_product(&self, product: &ProductFields) -> Result<String, ShopifyError> {
        let variables = serde_json::json!({ "input": product });
        let data: ProductCreateData = self
            .execute_graphql(PRODUCT_CREATE_MUTATION, variables, "productCreate")
            .await?;
        unwrap_product_payload(data.product_create, "productCreate")
    }

    /// Looks up a product's GraphQL id by handle. `Ok(None)` means no
    /// product owns the handle.
    ///
    /// # Errors
    ///
    /// The transport errors of [`Self::execute_graphql`].
    pub async fn find_product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<String>, ShopifyError> {
        let variables = serde_json::json!({ "handle": handle });
        let data: ProductByHandleData = self
            .execute_graphql(PRODUCT_BY_HANDLE_QUERY, variables, "productByHandle")
            .await?;
        Ok(data.product_by_handle.map(|p| p.id))
    }

    /// Runs `productUpdate` against an existing product id.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::UserErrors`] or the transport errors of
    /// [`Self::execute_graphql`].
    pub async fn update_product(
        &self,
        product_id: &str,
        product: &ProductFields,
    ) -> Result<String, ShopifyError> {
        let mut input = serde_json::to_value(product).map_err(|source| {
            ShopifyError::Deserialize {
                context: "productUpdate input".to_string(),
                source,
            }
        })?;
        if let Some(obj) = input.as_object_mut() {
            obj.insert(
                "id".to_string(),
                serde_json::Value::String(product_id.to_string()),
            );
        }
        let variables = serde_json::json!({ "input": input });
        let data: ProductUpdateData = self
            .execute_graphql(PRODUCT_UPDATE_MUTATION, variables, "productUpdate")
            .await?;
        unwrap_product_payload(data.product_update, "productUpdate")
    }

    /// Writes the variant fields to the product's default variant over REST.
    ///
    /// The GraphQL product mutations do not cover variant price, barcode,
    /// and inventory policy in one call, so the default variant is fetched
    /// and updated through the REST Admin API.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::MissingVariant`] if the product has no variants.
    /// - Plus the transport errors of [`Self::execute_rest`].
    pub async fn sync_variant(
        &self,
        product_id: &str,
        variant: &VariantFields,
    ) -> Result<(), ShopifyError> {
        let numeric_id = numeric_product_id(product_id)?;

        let url = format!("{}/products/{numeric_id}/variants.json", self.rest_base);
        let body = self
            .execute_rest(Method::GET, &url, None, "variant listing")
            .await?;
        let envelope: VariantsEnvelope =
            serde_json::from_value(body).map_err(|source| ShopifyError::Deserialize {
                context: "variant listing".to_string(),
                source,
            })?;

        let variant_id = envelope
            .variants
            .first()
            .map(|v| v.id)
            .ok_or_else(|| ShopifyError::MissingVariant {
                product_id: product_id.to_string(),
            })?;

        let mut fields = serde_json::json!({
            "id": variant_id,
            "sku": variant.sku,
            "inventory_management": if variant.tracked { "shopify".into() } else { serde_json::Value::Null },
            "inventory_policy": if variant.sell_when_out_of_stock { "continue" } else { "deny" },
        });
        if let Some(obj) = fields.as_object_mut() {
            if let Some(price) = variant.price {
                obj.insert(
                    "price".to_string(),
                    serde_json::Value::String(format!("{price:.2}")),
                );
            }
            if let Some(barcode) = &variant.barcode {
                obj.insert(
                    "barcode".to_string(),
                    serde_json::Value::String(barcode.clone()),
                );
            }
        }

        let url = format!("{}/variants/{variant_id}.json", self.rest_base);
        let payload = serde_json::json!({ "variant": fields });
        self.execute_rest(Method::PUT, &url, Some(payload), "variant update")
            .await?;
        Ok(())
    }

    /// Writes the metafield assignments via `metafieldsSet`. A no-op when
    /// the list is empty.
    ///
    /// # Errors
    ///
    /// [`ShopifyError::UserErrors`] or the transport errors of
    /// [`Self::execute_graphql`].
    pub async fn set_metafields(
        &self,
        product_id: &str,
        metafields: &[MetafieldAssignment],
    ) -> Result<(), ShopifyError> {
        if metafields.is_empty() {
            return Ok(());
        }

        let inputs: Vec<serde_json::Value> = metafields
            .iter()
            .map(|m| {
                serde_json::json!({
                    "ownerId": product_id,
                    "namespace": m.namespace,
                    "key": m.key,
                    "value": m.value,
                    "type": m.value_type,
                })
            })
            .collect();

        let variables = serde_json::json!({ "metafields": inputs });
        let data: MetafieldsSetData = self
            .execute_graphql(METAFIELDS_SET_MUTATION, variables, "metafieldsSet")
            .await?;

        let payload = data
            .metafields_set
            .ok_or_else(|| ShopifyError::Api("no metafieldsSet payload in response".to_string()))?;
        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserErrors(join_user_errors(
                &payload.user_errors,
            )));
        }
        Ok(())
    }

    /// Attaches an image to the product via the REST images endpoint. The
    /// payload is base64-encoded into the request body.
    ///
    /// # Errors
    ///
    /// The transport errors of [`Self::execute_rest`].
    pub async fn upload_image(
        &self,
        product_id: &str,
        image: &[u8],
        filename: &str,
    ) -> Result<(), ShopifyError> {
        let numeric_id = numeric_product_id(product_id)?;
        let url = format!("{}/products/{numeric_id}/images.json", self.rest_base);
        let payload = serde_json::json!({
            "image": {
                "attachment": STANDARD.encode(image),
                "filename": filename,
            }
        });
        self.execute_rest(Method::POST, &url, Some(payload), "image upload")
            .await?;
        Ok(())
    }

    /// Posts one GraphQL request with retry on transient failures and
    /// unwraps the response envelope. GraphQL `THROTTLED` errors and HTTP
    /// 429 both map to [`ShopifyError::Throttled`] and are retried.
    async fn execute_graphql<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
        context: &str,
    ) -> Result<T, ShopifyError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let variables = variables.clone();
            let context = context.to_string();
            async move {
                let payload = serde_json::json!({ "query": query, "variables": variables });
                let response = self
                    .client
                    .post(&self.graphql_url)
                    .json(&payload)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ShopifyError::Throttled);
                }
                if !status.is_success() {
                    return Err(ShopifyError::UnexpectedStatus {
                        status: status.as_u16(),
                        context,
                    });
                }

                let body = response.text().await?;
                let envelope: GraphQlResponse<T> =
                    serde_json::from_str(&body).map_err(|source| ShopifyError::Deserialize {
                        context: context.clone(),
                        source,
                    })?;

                if envelope.errors.iter().any(GraphQlError::is_throttled) {
                    return Err(ShopifyError::Throttled);
                }
                if !envelope.errors.is_empty() {
                    let messages: Vec<String> =
                        envelope.errors.into_iter().map(|e| e.message).collect();
                    return Err(ShopifyError::Api(messages.join("; ")));
                }

                envelope
                    .data
                    .ok_or_else(|| ShopifyError::Api(format!("no data in response for {context}")))
            }
        })
        .await
    }

    /// Sends one REST request with retry on transient failures and returns
    /// the parsed JSON body.
    async fn execute_rest(
        &self,
        http_method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        context: &str,
    ) -> Result<serde_json::Value, ShopifyError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let http_method = http_method.clone();
            let body = body.clone();
            let context = context.to_string();
            async move {
                let mut request = self.client.request(http_method, url);
                if let Some(body) = body {
                    request = request.json(&body);
                }
                let response = request.send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ShopifyError::Throttled);
                }
                if !status.is_success() {
                    return Err(ShopifyError::UnexpectedStatus {
                        status: status.as_u16(),
                        context,
                    });
                }

                let text = response.text().await?;
                serde_json::from_str(&text).map_err(|source| ShopifyError::Deserialize {
                    context: context.clone(),
                    source,
                })
            }
        })
        .await
    }
}

/// Extracts the numeric tail of a product gid
/// (`gid://shopify/Product/42` yields `42`) for REST URLs.
fn numeric_product_id(product_id: &str) -> Result<&str, ShopifyError> {
    product_id
        .rsplit('/')
        .next()
        .filter(|tail| !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| ShopifyError::Api(format!("malformed product id: {product_id}")))
}

/// Unwraps a `productCreate`/`productUpdate` payload into the product id,
/// classifying the handle-conflict user error separately.
fn unwrap_product_payload(
    payload: Option<ProductMutationPayload>,
    context: &str,
) -> Result<String, ShopifyError> {
    let payload =
        payload.ok_or_else(|| ShopifyError::Api(format!("no {context} payload in response")))?;

    if !payload.user_errors.is_empty() {
        if is_handle_taken(&payload.user_errors) {
            return Err(ShopifyError::HandleTaken);
        }
        return Err(ShopifyError::UserErrors(join_user_errors(
            &payload.user_errors,
        )));
    }

    payload
        .product
        .map(|p| p.id)
        .ok_or_else(|| ShopifyError::Api(format!("{context} returned no product and no errors")))
}

/// The handle conflict arrives as a user error on the `handle` field with a
/// "has already been taken" message, not as a dedicated error code.
fn is_handle_taken(errors: &[UserError]) -> bool {
    errors.iter().any(|e| {
        let message = e.message.to_ascii_lowercase();
        let on_handle_field = e
            .field
            .as_ref()
            .is_some_and(|parts| parts.iter().any(|p| p == "handle"));
        (on_handle_field || message.contains("handle")) && message.contains("taken")
    })
}

fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_error(field: Option<Vec<&str>>, message: &str) -> UserError {
        serde_json::from_value(serde_json::json!({
            "field": field,
            "message": message,
        }))
        .expect("user error fixture should parse")
    }

    #[test]
    fn graphql_url_embeds_version() {
        let client = ShopifyClient::new(
            "example.myshopify.com",
            "shpat_test",
            "2024-07",
            30,
            "pimsync/test",
            0,
            0,
        )
        .expect("client construction should not fail");
        assert_eq!(
            client.graphql_url,
            "https://example.myshopify.com/admin/api/2024-07/graphql.json"
        );
    }

    #[test]
    fn numeric_product_id_strips_gid_prefix() {
        assert_eq!(
            numeric_product_id("gid://shopify/Product/84").expect("gid should parse"),
            "84"
        );
    }

    #[test]
    fn numeric_product_id_rejects_non_numeric_tail() {
        assert!(numeric_product_id("gid://shopify/Product/").is_err());
        assert!(numeric_product_id("not-a-gid").is_err());
    }

    #[test]
    fn handle_conflict_is_detected_on_the_handle_field() {
        let errors = vec![user_error(
            Some(vec!["handle"]),
            "Handle has already been taken",
        )];
        assert!(is_handle_taken(&errors));
    }

    #[test]
    fn handle_conflict_is_detected_from_message_alone() {
        let errors = vec![user_error(None, "handle is taken")];
        assert!(is_handle_taken(&errors));
    }

    #[test]
    fn other_user_errors_are_not_handle_conflicts() {
        let errors = vec![user_error(Some(vec!["title"]), "Title can't be blank")];
        assert!(!is_handle_taken(&errors));
    }
}
