// Bump CACHE_NAME whenever any of the cached files change.

/// Name of the current cache bucket
pub const CACHE_NAME: &str = "static-cache-v1";

/// Worker revision, for humans only
pub const VERSION: u32 = 3;

/// Page served to navigations while offline. Root-absolute, like the asset
/// list, so it resolves to the URL install stored it under for any scope.
pub const OFFLINE_PAGE: &str = "/offline.html";

pub const FILES_TO_CACHE: &[&str] = &[
    "/offline.html",
    "/manifest.json",
    "/index.html",
    "/favicon.png",
    "/build/bundle.css",
    "/build/bundle.js",
    "/build/bundle.js.map",
    "/images/icons/icon-32x32.png",
    "/images/icons/icon-128x128.png",
    "/images/icons/icon-144x144.png",
    "/images/icons/icon-152x152.png",
    "/images/icons/icon-192x192.png",
    "/images/icons/icon-256x256.png",
    "/images/icons/icon-512x512.png",
    "/images/icons/maskable_icon.png",
];

/// What the worker caches and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    pub cache_name: String,
    pub files: Vec<String>,
    pub offline_page: String,
}

impl AssetManifest {
    pub fn new(
        cache_name: impl Into<String>,
        files: impl IntoIterator<Item = impl Into<String>>,
        offline_page: impl Into<String>,
    ) -> Self {
        Self {
            cache_name: cache_name.into(),
            files: files.into_iter().map(Into::into).collect(),
            offline_page: offline_page.into(),
        }
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new(CACHE_NAME, FILES_TO_CACHE.iter().copied(), OFFLINE_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.cache_name, "static-cache-v1");
        assert_eq!(manifest.files.len(), 15);
        assert_eq!(manifest.offline_page, "/offline.html");
        assert!(manifest.files.iter().any(|f| *f == manifest.offline_page));
    }

    #[test]
    fn test_asset_list_has_no_duplicates() {
        let mut files: Vec<&str> = FILES_TO_CACHE.to_vec();
        files.sort_unstable();
        files.dedup();
        assert_eq!(files.len(), FILES_TO_CACHE.len());
    }
}
