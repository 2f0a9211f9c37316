//! Loading of the externally provisioned JSON documents.

use std::path::Path;

use orderbridge_shared::{PipelineError, RawOrder, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    debug!(path = %path.display(), size = body.len(), "loaded source document");
    Ok(serde_json::from_slice(&body)?)
}

/// Load the raw ERP batch, a JSON array of orders.
pub async fn load_raw_orders(path: &Path) -> Result<Vec<RawOrder>> {
    load_json(path).await
}

/// Load the CRM template document.
pub async fn load_template(path: &Path) -> Result<Value> {
    load_json(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = load_template(Path::new("/nonexistent/crm_swagger.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_batch_is_serialization_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("erp_data.json");
        std::fs::write(&path, r#"{"status": "finished"}"#).unwrap();

        let err = load_raw_orders(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Serialization(_)));
    }

    #[tokio::test]
    async fn loads_fixture_batch() {
        let orders = load_raw_orders(Path::new("../../../fixtures/json/erp_data.fixture.json"))
            .await
            .expect("load fixture");
        assert!(!orders.is_empty());
    }
}
