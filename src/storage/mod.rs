use s3::creds::Credentials;
use s3::{Bucket, Region};
use snafu::prelude::*;
use tracing::{debug, info};

/// S3 storage configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region of the bucket
    pub region: String,
    /// AWS access key ID; falls back to the default credential chain
    pub access_key: Option<String>,
    /// AWS secret access key
    pub secret_key: Option<String>,
    /// S3 endpoint (e.g., "http://localhost:9000" for MinIO)
    pub endpoint: Option<String>,
}

#[derive(Debug, Snafu)]
pub enum Error {
    /// Could not resolve S3 credentials
    Credentials { source: s3::creds::error::CredentialsError },

    /// Could not create handle for bucket {bucket}
    CreateBucket {
        bucket: String,
        source: s3::error::S3Error,
    },

    /// Could not list objects under prefix {prefix:?}
    ListObjects {
        prefix: String,
        source: s3::error::S3Error,
    },

    /// Could not fetch object {key}
    GetObject {
        key: String,
        source: s3::error::S3Error,
    },

    /// Unexpected HTTP status {code} fetching object {key}
    GetObjectStatus { key: String, code: u16 },
}

/// Build an S3 bucket instance from configuration.
///
/// A custom endpoint switches the bucket to path-style addressing,
/// which MinIO-type stores require.
pub fn build_bucket(config: &S3Config) -> Result<Bucket, Error> {
    let credentials = match (&config.access_key, &config.secret_key) {
        (Some(access), Some(secret)) => {
            Credentials::new(Some(access), Some(secret), None, None, None)
                .context(CredentialsSnafu)?
        }
        _ => Credentials::default().context(CredentialsSnafu)?,
    };

    let bucket = match &config.endpoint {
        Some(endpoint) => {
            let region = Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            };
            Bucket::new(&config.bucket, region, credentials)
                .context(CreateBucketSnafu {
                    bucket: config.bucket.clone(),
                })?
                .with_path_style()
        }
        None => {
            let region = Region::Custom {
                region: config.region.clone(),
                endpoint: format!("https://s3.{}.amazonaws.com", config.region),
            };
            Bucket::new(&config.bucket, region, credentials).context(CreateBucketSnafu {
                bucket: config.bucket.clone(),
            })?
        }
    };
    Ok(*bucket)
}

/// List object keys in the bucket under the given prefix.
pub async fn list_objects(bucket: &Bucket, prefix: &str) -> Result<Vec<String>, Error> {
    let results = bucket
        .list(prefix.to_string(), None)
        .await
        .context(ListObjectsSnafu {
            prefix: prefix.to_string(),
        })?;

    let mut keys = Vec::new();
    for page in results {
        for obj in page.contents {
            keys.push(obj.key);
        }
    }
    debug!("Listed {} objects under prefix '{}'", keys.len(), prefix);
    Ok(keys)
}

/// Fetch an object's bytes from the bucket.
pub async fn get_object(bucket: &Bucket, key: &str) -> Result<Vec<u8>, Error> {
    let response = bucket
        .get_object(key)
        .await
        .context(GetObjectSnafu { key: key.to_string() })?;
    let code = response.status_code();
    ensure!(
        code == 200,
        GetObjectStatusSnafu {
            key: key.to_string(),
            code,
        }
    );
    let bytes = response.bytes().to_vec();
    info!("Downloaded S3 object '{}': {} bytes", key, bytes.len());
    Ok(bytes)
}
