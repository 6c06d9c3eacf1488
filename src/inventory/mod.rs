use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use indicatif::ProgressBar;
use snafu::prelude::*;
use tracing::{debug, error};

mod omics;
pub mod regions;
pub mod report;

pub use omics::OmicsCatalog;

/// The three kinds of HealthOmics data stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sequence,
    Annotation,
    Variant,
}

impl StoreKind {
    /// All kinds in query order.
    pub const ALL: [StoreKind; 3] = [StoreKind::Sequence, StoreKind::Annotation, StoreKind::Variant];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Sequence => "sequence",
            StoreKind::Annotation => "annotation",
            StoreKind::Variant => "variant",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invalid store type: {value}
#[derive(Debug, Snafu)]
pub struct InvalidStoreKind {
    value: String,
}

impl FromStr for StoreKind {
    type Err = InvalidStoreKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequence" => Ok(StoreKind::Sequence),
            "annotation" => Ok(StoreKind::Annotation),
            "variant" => Ok(StoreKind::Variant),
            other => InvalidStoreKindSnafu { value: other }.fail(),
        }
    }
}

/// A single store as returned by a list call, before consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub id: String,
    pub name: String,
}

/// One consolidated inventory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub kind: StoreKind,
    pub date: NaiveDate,
    pub name: String,
    pub region: String,
    pub store_id: String,
}

/// Failure of a single per-region list call.
#[derive(Debug, Clone, Snafu)]
pub enum CatalogError {
    /// Not authorized to list {kind} stores in {region}
    Unauthorized {
        region: String,
        kind: StoreKind,
        code: String,
    },

    /// Listing {kind} stores in {region} failed: {message}
    Service {
        region: String,
        kind: StoreKind,
        message: String,
    },
}

/// Per-region access to the HealthOmics store listing APIs.
///
/// The seam between the consolidation loop and the AWS SDK; tests
/// substitute their own implementations.
#[async_trait]
pub trait StoreCatalog {
    fn region(&self) -> &str;

    /// List the stores of one kind in this catalog's region.
    ///
    /// A response without the expected store collection yields an
    /// empty list, not an error.
    async fn list_stores(&self, kind: StoreKind) -> Result<Vec<StoreEntry>, CatalogError>;
}

/// Collect all store records for one region, querying the three kinds
/// in order.
///
/// A failed list call degrades to an empty result for that kind: one
/// poisoned or inaccessible region must not prevent collection from
/// the rest. Authorization failures get a dedicated diagnostic.
pub async fn collect_region<C: StoreCatalog + ?Sized>(
    catalog: &C,
    date: NaiveDate,
) -> Vec<StoreRecord> {
    let region = catalog.region().to_string();
    let mut records = Vec::new();
    for kind in StoreKind::ALL {
        let entries = match catalog.list_stores(kind).await {
            Ok(entries) => entries,
            Err(e @ CatalogError::Unauthorized { .. }) => {
                error!(
                    "{}. Check your AWS credentials and configuration.",
                    snafu::Report::from_error(e)
                );
                continue;
            }
            Err(e) => {
                error!(
                    "Unexpected error retrieving {} stores in {}: {}",
                    kind,
                    region,
                    snafu::Report::from_error(e)
                );
                continue;
            }
        };
        debug!("{} {} stores in {}", entries.len(), kind, region);
        records.extend(entries.into_iter().map(|entry| StoreRecord {
            kind,
            date,
            name: entry.name,
            region: region.clone(),
            store_id: entry.id,
        }));
    }
    records
}

/// Flatten per-region results into one table, preserving
/// region-then-kind order. No dedup, no sort.
pub async fn collect_inventory<C: StoreCatalog + ?Sized>(
    catalogs: &[Box<C>],
    date: NaiveDate,
    progress_bar: Option<&ProgressBar>,
) -> Vec<StoreRecord> {
    let mut records = Vec::new();
    for catalog in catalogs {
        records.extend(collect_region(catalog.as_ref(), date).await);
        if let Some(pb) = progress_bar {
            pb.inc(1);
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeCatalog {
        region: String,
        responses: HashMap<&'static str, Result<Vec<StoreEntry>, CatalogError>>,
    }

    impl FakeCatalog {
        fn new(region: &str) -> Self {
            FakeCatalog {
                region: region.to_string(),
                responses: HashMap::new(),
            }
        }

        fn with(mut self, kind: StoreKind, entries: Vec<StoreEntry>) -> Self {
            self.responses.insert(kind.as_str(), Ok(entries));
            self
        }

        fn with_error(mut self, kind: StoreKind, error: CatalogError) -> Self {
            self.responses.insert(kind.as_str(), Err(error));
            self
        }
    }

    #[async_trait]
    impl StoreCatalog for FakeCatalog {
        fn region(&self) -> &str {
            &self.region
        }

        async fn list_stores(&self, kind: StoreKind) -> Result<Vec<StoreEntry>, CatalogError> {
            match self.responses.get(kind.as_str()) {
                Some(response) => response.clone(),
                None => Ok(vec![]),
            }
        }
    }

    fn entry(id: &str, name: &str) -> StoreEntry {
        StoreEntry {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn store_kind_parses_known_values() {
        assert_eq!("sequence".parse::<StoreKind>().unwrap(), StoreKind::Sequence);
        assert_eq!(
            "annotation".parse::<StoreKind>().unwrap(),
            StoreKind::Annotation
        );
        assert_eq!("variant".parse::<StoreKind>().unwrap(), StoreKind::Variant);
    }

    #[test]
    fn store_kind_rejects_unknown_values() {
        let err = "reference".parse::<StoreKind>().unwrap_err();
        assert!(err.to_string().contains("Invalid store type: reference"));
        assert!("Sequence".parse::<StoreKind>().is_err());
        assert!("".parse::<StoreKind>().is_err());
    }

    #[tokio::test]
    async fn missing_store_collection_yields_empty_not_error() {
        let catalog = FakeCatalog::new("eu-west-1");
        let records = collect_region(&catalog, date()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_region_degrades_to_empty_and_continues() {
        let catalog = FakeCatalog::new("ap-southeast-1")
            .with_error(
                StoreKind::Sequence,
                CatalogError::Unauthorized {
                    region: "ap-southeast-1".to_string(),
                    kind: StoreKind::Sequence,
                    code: "UnrecognizedClientException".to_string(),
                },
            )
            .with(StoreKind::Annotation, vec![entry("as-1", "annots")])
            .with(StoreKind::Variant, vec![entry("vs-1", "variants")]);

        let records = collect_region(&catalog, date()).await;
        // sequence degraded, the remaining kinds still collected
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, StoreKind::Annotation);
        assert_eq!(records[1].kind, StoreKind::Variant);
    }

    #[tokio::test]
    async fn service_error_also_degrades() {
        let catalog = FakeCatalog::new("us-east-1").with_error(
            StoreKind::Variant,
            CatalogError::Service {
                region: "us-east-1".to_string(),
                kind: StoreKind::Variant,
                message: "throttled".to_string(),
            },
        );
        let records = collect_region(&catalog, date()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn consolidation_preserves_region_then_kind_order_and_counts() {
        let catalogs: Vec<Box<FakeCatalog>> = vec![
            Box::new(
                FakeCatalog::new("us-east-1")
                    .with(
                        StoreKind::Sequence,
                        vec![entry("seq-1", "reads-a"), entry("seq-2", "reads-b")],
                    )
                    .with(StoreKind::Variant, vec![entry("var-1", "calls")]),
            ),
            Box::new(
                FakeCatalog::new("us-west-2").with(StoreKind::Annotation, vec![entry("ann-1", "clinvar")]),
            ),
        ];

        let records = collect_inventory(&catalogs, date(), None).await;
        // row count equals the sum of per-region, per-kind counts
        assert_eq!(records.len(), 4);
        let summary: Vec<(&str, &str, &str)> = records
            .iter()
            .map(|r| (r.kind.as_str(), r.region.as_str(), r.store_id.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("sequence", "us-east-1", "seq-1"),
                ("sequence", "us-east-1", "seq-2"),
                ("variant", "us-east-1", "var-1"),
                ("annotation", "us-west-2", "ann-1"),
            ]
        );
        assert!(records.iter().all(|r| r.date == date()));
    }

    #[tokio::test]
    async fn consolidation_ticks_the_progress_bar_per_region() {
        let catalogs: Vec<Box<FakeCatalog>> = vec![
            Box::new(FakeCatalog::new("us-east-1")),
            Box::new(FakeCatalog::new("eu-west-1")),
        ];
        let progress = ProgressBar::hidden();
        let _ = collect_inventory(&catalogs, date(), Some(&progress)).await;
        assert_eq!(progress.position(), 2);
    }
}
