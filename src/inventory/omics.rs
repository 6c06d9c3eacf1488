use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_omics::config::Region;
use aws_sdk_omics::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_omics::Client;

use super::{CatalogError, StoreCatalog, StoreEntry, StoreKind};

/// `StoreCatalog` backed by the HealthOmics API of a single region.
pub struct OmicsCatalog {
    region: String,
    client: Client,
}

impl OmicsCatalog {
    /// Create a regional client from a shared base configuration.
    pub fn new(base: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_omics::config::Builder::from(base)
            .region(Region::new(region.to_string()))
            .build();
        OmicsCatalog {
            region: region.to_string(),
            client: Client::from_conf(conf),
        }
    }
}

/// Error codes that indicate broken credentials rather than a service fault.
fn is_auth_failure(code: &str) -> bool {
    matches!(
        code,
        "UnrecognizedClientException"
            | "AccessDeniedException"
            | "UnauthorizedException"
            | "ExpiredTokenException"
    )
}

fn catalog_error<E>(region: &str, kind: StoreKind, err: SdkError<E>) -> CatalogError
where
    E: ProvideErrorMetadata,
{
    if let Some(code) = err.code() {
        if is_auth_failure(code) {
            return CatalogError::Unauthorized {
                region: region.to_string(),
                kind,
                code: code.to_string(),
            };
        }
    }
    CatalogError::Service {
        region: region.to_string(),
        kind,
        message: err
            .message()
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.to_string()),
    }
}

#[async_trait]
impl StoreCatalog for OmicsCatalog {
    fn region(&self) -> &str {
        &self.region
    }

    async fn list_stores(&self, kind: StoreKind) -> Result<Vec<StoreEntry>, CatalogError> {
        match kind {
            StoreKind::Sequence => {
                let response = self
                    .client
                    .list_sequence_stores()
                    .send()
                    .await
                    .map_err(|e| catalog_error(&self.region, kind, e))?;
                Ok(response
                    .sequence_stores()
                    .iter()
                    .map(|store| StoreEntry {
                        id: store.id().to_string(),
                        name: store.name().unwrap_or_default().to_string(),
                    })
                    .collect())
            }
            StoreKind::Annotation => {
                let response = self
                    .client
                    .list_annotation_stores()
                    .send()
                    .await
                    .map_err(|e| catalog_error(&self.region, kind, e))?;
                Ok(response
                    .annotation_stores()
                    .iter()
                    .map(|store| StoreEntry {
                        id: store.id().to_string(),
                        name: store.name().to_string(),
                    })
                    .collect())
            }
            StoreKind::Variant => {
                let response = self
                    .client
                    .list_variant_stores()
                    .send()
                    .await
                    .map_err(|e| catalog_error(&self.region, kind, e))?;
                Ok(response
                    .variant_stores()
                    .iter()
                    .map(|store| StoreEntry {
                        id: store.id().to_string(),
                        name: store.name().to_string(),
                    })
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_codes() {
        assert!(is_auth_failure("UnrecognizedClientException"));
        assert!(is_auth_failure("AccessDeniedException"));
        assert!(!is_auth_failure("ThrottlingException"));
        assert!(!is_auth_failure("ValidationException"));
    }
}
