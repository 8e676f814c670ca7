//! Payload location inside an opaque container.
//!
//! Each container kind has an ordered list of [`Probe`]s; the first probe
//! that finds a signature wins. Every probe is bounded by a fixed window, so
//! the cost per container never depends on its total size.

use crate::consts::{
    AVATAR_ITEM_TEXTURE_OFFSET, DEFAULT_SEARCH_WINDOW, RASTER_FALLBACK_WINDOW, RASTER_SIGNATURE, TEXTURE_SIGNATURE,
    THUMBNAIL_TEXTURE_OFFSET, WIDE_SEARCH_WINDOW,
};
use crate::error::{ErrorKind, Result};
use memchr::memmem;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Encoding of an embedded image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// A complete PNG stream.
    Raster,
    /// A DDS texture (usually block compressed).
    Texture,
}
impl PayloadKind {
    fn signature(&self) -> &'static [u8; 4] {
        match self {
            Self::Raster => &RASTER_SIGNATURE,
            Self::Texture => &TEXTURE_SIGNATURE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Texture => "texture",
        }
    }
}
impl Display for PayloadKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Where the payload starts, and what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    pub offset: usize,
    pub kind: PayloadKind,
}

#[derive(Debug, Clone, Copy)]
enum Probe {
    /// Signature of `kind` exactly at `offset`.
    Fixed { offset: usize, kind: PayloadKind },
    /// Earliest signature of either kind starting within `window`.
    Scan { window: usize },
    /// Earliest signature of `kind` starting within `window`.
    ScanFor { kind: PayloadKind, window: usize },
}
impl Probe {
    fn run(&self, blob: &[u8]) -> Option<Payload> {
        match *self {
            Probe::Fixed { offset, kind } => blob
                .get(offset..offset + 4)
                .filter(|bytes| *bytes == kind.signature())
                .map(|_| Payload { offset, kind }),
            Probe::Scan { window } => {
                let raster = scan(blob, PayloadKind::Raster, window);
                let texture = scan(blob, PayloadKind::Texture, window);
                match (raster, texture) {
                    (Some(r), Some(t)) => Some(if t.offset < r.offset { t } else { r }),
                    (r, t) => r.or(t),
                }
            },
            Probe::ScanFor { kind, window } => scan(blob, kind, window),
        }
    }

    fn window(&self) -> usize {
        match *self {
            Probe::Fixed { offset, .. } => offset + 4,
            Probe::Scan { window } | Probe::ScanFor { window, .. } => window,
        }
    }
}

fn scan(blob: &[u8], kind: PayloadKind, window: usize) -> Option<Payload> {
    // A signature *starting* inside the window counts, even if it ends past it.
    let end = blob.len().min(window.saturating_add(3));
    memmem::find(&blob[..end], kind.signature()).map(|offset| Payload { offset, kind })
}

/// Known container layouts, each with its own probing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PayloadLayout {
    /// Plain single-image container: scan the default window.
    #[default]
    Sprite,
    /// Texture expected at a fixed offset, otherwise scan a wider window.
    AvatarItem,
    /// Texture expected at a fixed offset, then a wide scan, then a raster-only
    /// scan over an even wider window.
    Thumbnail,
}
impl PayloadLayout {
    fn probes(&self) -> &'static [Probe] {
        const SPRITE: &[Probe] = &[Probe::Scan { window: DEFAULT_SEARCH_WINDOW }];
        const AVATAR_ITEM: &[Probe] = &[
            Probe::Fixed { offset: AVATAR_ITEM_TEXTURE_OFFSET, kind: PayloadKind::Texture },
            Probe::Scan { window: WIDE_SEARCH_WINDOW },
        ];
        const THUMBNAIL: &[Probe] = &[
            Probe::Fixed { offset: THUMBNAIL_TEXTURE_OFFSET, kind: PayloadKind::Texture },
            Probe::Scan { window: WIDE_SEARCH_WINDOW },
            Probe::ScanFor { kind: PayloadKind::Raster, window: RASTER_FALLBACK_WINDOW },
        ];
        match self {
            Self::Sprite => SPRITE,
            Self::AvatarItem => AVATAR_ITEM,
            Self::Thumbnail => THUMBNAIL,
        }
    }

    /// Largest number of bytes any probe of this layout will look at.
    pub fn window(&self) -> usize {
        self.probes().iter().map(Probe::window).max().unwrap_or(DEFAULT_SEARCH_WINDOW)
    }

    /// Find the payload inside `blob`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::PayloadNotFound`] when no probe matches.
    pub fn locate(&self, blob: &[u8]) -> Result<Payload> {
        match self.probes().iter().find_map(|probe| probe.run(blob)) {
            Some(payload) => Ok(payload),
            None => exn::bail!(ErrorKind::PayloadNotFound(self.window())),
        }
    }
}
