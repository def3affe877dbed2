//! Package-product inference.
//!
//! Package products are usually registered with their source repository URL
//! as the subtitle, but some ingestion paths cannot tell what kind they are
//! and report [`LibraryKind::Unknown`]. This step reclassifies those as
//! [`LibraryKind::PackageProduct`] so kind-based filters see them.
//!
//! The rule is content-based and can misfire (any subtitle containing the
//! marker qualifies). It runs exactly once, at the start of the filter stage,
//! and its result persists in the filtered graph's metadata.

use tracing::debug;

use crate::graph::store::GraphStore;
use crate::model::{LibraryKind, LibraryMeta};

/// Substring (matched case-insensitively) that marks a subtitle as a URL.
pub const PACKAGE_URL_MARKER: &str = "http";

/// Whether `meta` would be reclassified as a package product.
#[must_use]
pub fn looks_like_package_product(meta: &LibraryMeta) -> bool {
    meta.kind == LibraryKind::Unknown
        && meta
            .subtitle
            .as_deref()
            .is_some_and(|sub| sub.to_ascii_lowercase().contains(PACKAGE_URL_MARKER))
}

impl GraphStore {
    /// Reclassify unknown-kind libraries with a URL subtitle as package
    /// products. Returns the reclassified names in ascending order.
    pub fn infer_package_products(&mut self) -> Vec<String> {
        let mut inferred = Vec::new();
        for (name, meta) in &mut self.libraries {
            if looks_like_package_product(meta) {
                meta.kind = LibraryKind::PackageProduct;
                debug!(library = %name, "inferred package product from subtitle");
                inferred.push(name.clone());
            }
        }
        inferred
    }
}
