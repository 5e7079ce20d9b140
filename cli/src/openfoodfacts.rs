use anyhow::{Context, Result};
use tracing::debug;

use macrolog_core::models::FoodItem;
use macrolog_core::openfoodfacts::{ProductResponse, product_to_food};
use macrolog_core::service::FoodLookupProvider;

const PRODUCT_URL: &str = "https://world.openfoodfacts.org/api/v0/product";

pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    rt: tokio::runtime::Handle,
}

impl OpenFoodFactsClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "macrolog/{} (macro tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            rt: tokio::runtime::Handle::current(),
        })
    }

    pub async fn lookup_barcode_async(&self, barcode: &str) -> Result<Option<FoodItem>> {
        let url = format!("{PRODUCT_URL}/{barcode}.json");
        debug!(%url, "looking up barcode");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?;

        let data: ProductResponse = resp
            .json()
            .await
            .context("Failed to parse OpenFoodFacts barcode response")?;

        if data.status != 1 {
            debug!(barcode, status = data.status, "product not found");
            return Ok(None);
        }

        Ok(data.product.and_then(product_to_food))
    }
}

impl FoodLookupProvider for OpenFoodFactsClient {
    /// Blocks the current worker; call from `tokio::task::block_in_place`.
    fn lookup_barcode(&self, barcode: &str) -> Result<Option<FoodItem>> {
        self.rt.block_on(self.lookup_barcode_async(barcode))
    }
}
