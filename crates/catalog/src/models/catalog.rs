use crate::consts::{ALL_SUBCATEGORIES, NAIVE_DATETIME_REGEX, TAG_SEPARATOR_REGEX};
use ruidex_container::models::Ruid;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Asset type declared by the catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    Sprite,
    AnimationClip,
    AudioClip,
    AvatarItem,
    Other,
}

impl DeclaredType {
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "sprite" => Self::Sprite,
            "animationclip" => Self::AnimationClip,
            "audioclip" => Self::AudioClip,
            "avataritem" => Self::AvatarItem,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sprite => "sprite",
            Self::AnimationClip => "animationclip",
            Self::AudioClip => "audioclip",
            Self::AvatarItem => "avataritem",
            Self::Other => "other",
        }
    }
}

/// A row as the catalog collector writes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCatalogRow {
    #[serde(rename = "RUID")]
    pub ruid: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Tags")]
    pub tags: String,
}

/// One identifier from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub identifier: Ruid,
    pub category: String,
    pub subcategory: String,
    /// Output directory relative to the output root (forward slashes).
    pub output_subdir: String,
    pub declared_type: DeclaredType,
    /// Normalised tags in first-seen order.
    pub tags: Vec<String>,
    /// RFC 3339 when the catalog date could be parsed, otherwise verbatim.
    pub published_at: Option<String>,
}

impl CatalogEntry {
    /// `None` when the row's identifier isn't exactly 32 hex characters.
    pub(crate) fn from_raw(row: RawCatalogRow) -> Option<Self> {
        let identifier: Ruid = row.ruid.parse().ok()?;
        let category = row.category.trim().to_string();
        let subcategory = row.subcategory.trim().to_string();
        Some(Self {
            identifier,
            output_subdir: output_subdir(&category, &subcategory),
            declared_type: DeclaredType::from_category(&category),
            tags: split_tags(&row.tags),
            published_at: normalise_date(&row.date),
            category,
            subcategory,
        })
    }
}

fn output_subdir(category: &str, subcategory: &str) -> String {
    if subcategory.is_empty() || subcategory.eq_ignore_ascii_case(ALL_SUBCATEGORIES) {
        category.to_string()
    } else {
        format!("{category}/{subcategory}")
    }
}

/// Split a `|` or `,` delimited tag string into distinct lowercase tags.
pub fn split_tags(tags: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TAG_SEPARATOR_REGEX
        .split(tags)
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// Normalise a catalog date to RFC 3339 (UTC) when it's recognisable.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS` (taken as UTC) and Unix
/// timestamps in seconds. Anything else is kept as written.
pub fn normalise_date(date: &str) -> Option<String> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    let parsed = if let Ok(seconds) = date.parse::<i64>() {
        OffsetDateTime::from_unix_timestamp(seconds).ok()
    } else if let Ok(datetime) = OffsetDateTime::parse(date, &Rfc3339) {
        Some(datetime)
    } else {
        parse_naive(date)
    };
    Some(
        parsed
            .and_then(|datetime| datetime.to_offset(UtcOffset::UTC).format(&Rfc3339).ok())
            .unwrap_or_else(|| date.to_string()),
    )
}

fn parse_naive(date: &str) -> Option<OffsetDateTime> {
    let captures = NAIVE_DATETIME_REGEX.captures(date)?;
    let number = |i: usize| captures.get(i).and_then(|m| m.as_str().parse::<i32>().ok());
    let month = Month::try_from(u8::try_from(number(2)?).ok()?).ok()?;
    let day = Date::from_calendar_date(number(1)?, month, u8::try_from(number(3)?).ok()?).ok()?;
    let time = Time::from_hms(
        u8::try_from(number(4)?).ok()?,
        u8::try_from(number(5)?).ok()?,
        u8::try_from(number(6)?).ok()?,
    )
    .ok()?;
    Some(PrimitiveDateTime::new(day, time).assume_utc())
}
