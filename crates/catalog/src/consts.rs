use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// `<ruid>.mod`, `<ruid>.<suffix>.mod` or `<ruid>.<ext>`.
regex!(CACHE_FILE_REGEX, r"^([0-9A-Fa-f]{32})(?:\.([A-Za-z0-9_]+))?\.([A-Za-z0-9_]+)$");
regex!(TAG_SEPARATOR_REGEX, r"[|,]");
// Naive datetimes as emitted by the catalog API, e.g. `2023-04-05 06:07:08`.
regex!(NAIVE_DATETIME_REGEX, r"^(\d{4})-(\d{2})-(\d{2})[ T](\d{2}):(\d{2}):(\d{2})$");

/// Subcategory that means "no subcategory" in the catalog.
pub(crate) const ALL_SUBCATEGORIES: &str = "all";
/// Suffix of container files in the cache.
pub(crate) const CONTAINER_EXTENSION: &str = "mod";
