mod catalog;
mod enriched;
mod location;

pub(crate) use self::catalog::RawCatalogRow;
pub use self::catalog::{CatalogEntry, DeclaredType, normalise_date, split_tags};
pub use self::enriched::{EnrichedEntry, SuffixPriority, dedup, join};
pub use self::location::{CacheLocation, ObservedType, SourceKind};
