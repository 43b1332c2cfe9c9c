//! `dailyflow clear`

use crate::errors::Result;
use crate::output::write_json;
use dailyflow_cache::{CacheLayer, CacheManager};
use serde_json::json;
use std::io::Write;

/// Clear one layer, or every layer plus legacy keys when `layer` is `None`
pub async fn run<W: Write>(manager: &CacheManager, layer: Option<u8>, out: &mut W) -> Result<()> {
    let cleared: Vec<CacheLayer> = match layer {
        Some(n) => {
            let layer = CacheLayer::try_from(n)?;
            manager.clear_layer(layer).await;
            vec![layer]
        }
        None => {
            manager.clear_all().await;
            CacheLayer::ALL.to_vec()
        }
    };
    write_json(
        out,
        &json!({
            "cleared": cleared,
            "legacyKeys": layer.is_none(),
        }),
    )
}
