use crate::consts::{CACHE_FILE_REGEX, CONTAINER_EXTENSION};
use crate::table::Row;
use ruidex_container::models::Ruid;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// What a cache file holds, judged from its file name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedType {
    Sprite,
    AnimationClip,
    Model,
    AvatarItem,
    Thumbnail,
    AudioClip,
    /// A standalone raster file (PNG or JPEG).
    Raster,
    /// A standalone audio file.
    Audio,
    Other,
}

impl ObservedType {
    fn from_container_suffix(suffix: &str) -> Self {
        match suffix {
            CONTAINER_EXTENSION | "sprite" => Self::Sprite,
            "animationclip" => Self::AnimationClip,
            "model" => Self::Model,
            "avataritem" => Self::AvatarItem,
            "thumbnail" => Self::Thumbnail,
            "audioclip" => Self::AudioClip,
            _ => Self::Other,
        }
    }

    fn from_extension(extension: &str) -> Self {
        match extension {
            "png" | "jpg" | "jpeg" => Self::Raster,
            "ogg" | "mp3" | "wav" => Self::Audio,
            _ => Self::Other,
        }
    }

    /// Whether the file holds a single image.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Sprite | Self::AvatarItem | Self::Thumbnail | Self::Raster)
    }

    /// Whether the file holds an animation clip.
    pub fn is_animation(&self) -> bool {
        matches!(self, Self::AnimationClip | Self::Model)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sprite => "sprite",
            Self::AnimationClip => "animationclip",
            Self::Model => "model",
            Self::AvatarItem => "avataritem",
            Self::Thumbnail => "thumbnail",
            Self::AudioClip => "audioclip",
            Self::Raster => "raster",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }
}

impl Display for ObservedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Whether a cache file is a container or a plain file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Container,
    Raw,
}
impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Raw => "raw",
        }
    }
}

/// One file in the cache tree that belongs to an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheLocation {
    pub identifier: Ruid,
    /// Path relative to the cache root, forward slashes.
    pub relative_path: String,
    /// Lowercase format suffix (`mod` for bare containers).
    pub format_suffix: String,
    pub observed_type: ObservedType,
    pub source_kind: SourceKind,
}

impl Row for CacheLocation {
    const HEADERS: &'static [&'static str] =
        &["identifier", "relative_path", "format_suffix", "observed_type", "source_kind"];
}

impl CacheLocation {
    /// Classify a cache file by its name; `None` for files that don't belong
    /// to an identifier.
    ///
    /// ```
    /// use ruidex_catalog::models::{CacheLocation, ObservedType, SourceKind};
    /// let location = CacheLocation::from_relative_path(
    ///     "ab/0123456789abcdef0123456789abcdef.animationclip.mod",
    /// ).unwrap();
    /// assert_eq!(location.format_suffix, "animationclip");
    /// assert_eq!(location.observed_type, ObservedType::AnimationClip);
    /// assert_eq!(location.source_kind, SourceKind::Container);
    /// ```
    pub fn from_relative_path(relative_path: impl Into<String>) -> Option<Self> {
        let relative_path = relative_path.into();
        let file_name = relative_path.rsplit('/').next()?;
        let captures = CACHE_FILE_REGEX.captures(file_name)?;
        let identifier: Ruid = captures.get(1)?.as_str().parse().ok()?;
        let last = captures.get(3)?.as_str().to_ascii_lowercase();
        let (format_suffix, observed_type, source_kind) = match captures.get(2) {
            Some(suffix) if last == CONTAINER_EXTENSION => {
                let suffix = suffix.as_str().to_ascii_lowercase();
                let observed = ObservedType::from_container_suffix(&suffix);
                (suffix, observed, SourceKind::Container)
            },
            // Two extensions, but not a container.
            Some(_) => return None,
            None if last == CONTAINER_EXTENSION => (last, ObservedType::Sprite, SourceKind::Container),
            None => {
                let observed = ObservedType::from_extension(&last);
                (last, observed, SourceKind::Raw)
            },
        };
        Some(Self { identifier, relative_path, format_suffix, observed_type, source_kind })
    }

    /// File name of the output this location decodes to, without directory.
    ///
    /// Audio keeps its own extension; everything else becomes PNG.
    pub fn output_filename(&self) -> String {
        match self.observed_type {
            ObservedType::Audio => format!("{}.{}", self.identifier, self.format_suffix),
            _ => format!("{}.png", self.identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ID: &str = "0123456789abcdef0123456789abcdef";

    #[rstest]
    #[case("{ID}.mod", "mod", ObservedType::Sprite, SourceKind::Container)]
    #[case("x/{ID}.sprite.mod", "sprite", ObservedType::Sprite, SourceKind::Container)]
    #[case("x/{ID}.AnimationClip.mod", "animationclip", ObservedType::AnimationClip, SourceKind::Container)]
    #[case("{ID}.model.mod", "model", ObservedType::Model, SourceKind::Container)]
    #[case("{ID}.avataritem.mod", "avataritem", ObservedType::AvatarItem, SourceKind::Container)]
    #[case("{ID}.thumbnail.mod", "thumbnail", ObservedType::Thumbnail, SourceKind::Container)]
    #[case("{ID}.audioclip.mod", "audioclip", ObservedType::AudioClip, SourceKind::Container)]
    #[case("{ID}.font.mod", "font", ObservedType::Other, SourceKind::Container)]
    #[case("a/b/{ID}.PNG", "png", ObservedType::Raster, SourceKind::Raw)]
    #[case("{ID}.jpeg", "jpeg", ObservedType::Raster, SourceKind::Raw)]
    #[case("{ID}.ogg", "ogg", ObservedType::Audio, SourceKind::Raw)]
    #[case("{ID}.bin", "bin", ObservedType::Other, SourceKind::Raw)]
    fn classifies(
        #[case] path: &str,
        #[case] suffix: &str,
        #[case] observed: ObservedType,
        #[case] kind: SourceKind,
    ) {
        let path = path.replace("{ID}", ID);
        let location = CacheLocation::from_relative_path(path.clone()).unwrap();
        assert_eq!(location.identifier.as_str(), ID);
        assert_eq!(location.relative_path, path);
        assert_eq!(location.format_suffix, suffix);
        assert_eq!(location.observed_type, observed);
        assert_eq!(location.source_kind, kind);
    }

    #[rstest]
    #[case("readme.txt")]
    #[case("{ID}")]
    #[case("{ID}.png.bak")]
    #[case("x{ID}.mod")]
    #[case("0123456789abcdef.mod")]
    #[case("{ID}.mod/child")]
    fn ignores(#[case] path: &str) {
        assert!(CacheLocation::from_relative_path(path.replace("{ID}", ID)).is_none());
    }

    #[test]
    fn uppercase_identifiers_are_lowered() {
        let location = CacheLocation::from_relative_path(format!("{}.mod", ID.to_uppercase())).unwrap();
        assert_eq!(location.identifier.as_str(), ID);
    }

    #[rstest]
    #[case("{ID}.sprite.mod", "{ID}.png")]
    #[case("{ID}.jpg", "{ID}.png")]
    #[case("{ID}.ogg", "{ID}.ogg")]
    fn output_filenames(#[case] path: &str, #[case] expected: &str) {
        let location = CacheLocation::from_relative_path(path.replace("{ID}", ID)).unwrap();
        assert_eq!(location.output_filename(), expected.replace("{ID}", ID));
    }
}
