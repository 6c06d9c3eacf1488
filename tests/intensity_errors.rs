//! Error wiring of the intensity pipeline as seen from outside the crate.

use snafu::IntoError;

use omics_tools::intensity::{self, StorageSnafu};
use omics_tools::storage;

#[test]
fn storage_failures_wrap_into_intensity_errors() {
    // the context selector is applied from the binary crate, so it has
    // to be usable here as well
    let inner = storage::Error::GetObjectStatus {
        key: "series/0001.dcm".to_string(),
        code: 403,
    };
    let err = StorageSnafu.into_error(inner);
    assert!(matches!(err, intensity::Error::Storage { .. }));
    assert!(err.to_string().contains("Object storage error"));
}

#[test]
fn empty_directory_error_is_explicit_about_its_location() {
    let dir = tempfile::tempdir().unwrap();
    let err = intensity::collect_dir_statistics(dir.path(), false).unwrap_err();
    assert!(matches!(err, intensity::Error::NoObjects { .. }));
    assert!(err.to_string().starts_with("No objects found in directory"));
}
