//! Regions with HealthOmics availability.
//!
//! The AWS SDK for Rust carries no queryable per-service region
//! metadata, so the service's regional footprint is pinned here.

/// Regions where the HealthOmics service is offered, in iteration order.
pub const OMICS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "il-central-1",
];
