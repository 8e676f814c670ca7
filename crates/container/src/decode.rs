//! Single-image containers: header inspection, decoding and output.

use crate::error::{ErrorKind, Result};
use crate::locate::{Payload, PayloadKind, PayloadLayout};
use crate::models::{Pivot, Placement};
use crate::pivot::extract_pivot;
use crate::texture::TextureHeader;
use exn::{OptionExt, ResultExt};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage, imageops};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::instrument;

/// Everything known about a container's image without decoding its pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageHeader {
    pub payload: Payload,
    pub width: u32,
    pub height: u32,
    /// `None` when no pivot record was found in the header region.
    pub pivot: Option<Pivot>,
}

impl ImageHeader {
    pub fn pivot_or_default(&self) -> Pivot {
        self.pivot.unwrap_or_default()
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.width, self.height, self.pivot_or_default())
    }
}

#[derive(Debug, Clone)]
enum Pixels {
    /// A standard PNG stream, written out verbatim.
    Encoded(Vec<u8>),
    /// Decompressed pixels, top row first.
    Rgba(RgbaImage),
}

/// A decoded single-image container.
#[derive(Debug, Clone)]
pub struct ContainerImage {
    header: ImageHeader,
    pixels: Pixels,
}

/// Locate the payload and read its dimensions and pivot.
///
/// Cheap compared to [`decode`]: texture blocks are never decompressed.
#[instrument(level = "debug", skip(blob), fields(blob_size = blob.len()))]
pub fn inspect(blob: &[u8], layout: PayloadLayout) -> Result<ImageHeader> {
    let payload = layout.locate(blob)?;
    let stream = &blob[payload.offset..];
    let (width, height) = match payload.kind {
        PayloadKind::Raster => raster_dimensions(stream)?,
        PayloadKind::Texture => {
            let texture = TextureHeader::parse(stream)?;
            (texture.width, texture.height)
        },
    };
    Ok(ImageHeader { payload, width, height, pivot: extract_pivot(blob, payload.offset, width) })
}

/// Fully decode the image held by a container.
#[instrument(skip(blob), fields(blob_size = blob.len()))]
pub fn decode(blob: &[u8], layout: PayloadLayout) -> Result<ContainerImage> {
    let header = inspect(blob, layout)?;
    let stream = &blob[header.payload.offset..];
    let pixels = match header.payload.kind {
        PayloadKind::Raster => Pixels::Encoded(stream.to_vec()),
        PayloadKind::Texture => {
            let texture = TextureHeader::parse(stream)?;
            let rgba = texture.decode(stream)?;
            let mut image = RgbaImage::from_raw(texture.width, texture.height, rgba)
                .ok_or_raise(|| ErrorKind::decode("pixel buffer does not match dimensions"))?;
            // Textures are stored bottom row first.
            imageops::flip_vertical_in_place(&mut image);
            Pixels::Rgba(image)
        },
    };
    Ok(ContainerImage { header, pixels })
}

fn raster_dimensions(stream: &[u8]) -> Result<(u32, u32)> {
    let (width, height) = ImageReader::with_format(Cursor::new(stream), ImageFormat::Png)
        .into_dimensions()
        .or_raise(|| ErrorKind::decode("malformed raster header"))?;
    if width == 0 || height == 0 {
        exn::bail!(ErrorKind::decode("zero-sized image"));
    }
    Ok((width, height))
}

impl ContainerImage {
    /// Wrap a raw raster file from the cache (no container header, no pivot).
    ///
    /// PNG files are kept verbatim; other raster formats are re-encoded.
    pub fn from_raster(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).or_raise(|| ErrorKind::UnsupportedFormat("raw raster".into()))?;
        let (pixels, width, height) = if format == ImageFormat::Png {
            let (width, height) = raster_dimensions(&bytes)?;
            (Pixels::Encoded(bytes), width, height)
        } else {
            let image = image::load_from_memory_with_format(&bytes, format)
                .or_raise(|| ErrorKind::decode(format!("malformed {format:?} raster")))?
                .into_rgba8();
            let (width, height) = image.dimensions();
            (Pixels::Rgba(image), width, height)
        };
        let payload = Payload { offset: 0, kind: PayloadKind::Raster };
        Ok(Self { header: ImageHeader { payload, width, height, pivot: None }, pixels })
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn placement(&self) -> Placement {
        self.header.placement()
    }

    /// Write the image as PNG, creating parent directories as needed.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent(path)?;
        match &self.pixels {
            Pixels::Encoded(bytes) => fs::write(path, bytes).or_raise(|| ErrorKind::Io)?,
            Pixels::Rgba(image) => image.save_with_format(path, ImageFormat::Png).or_raise(|| ErrorKind::Io)?,
        }
        Ok(())
    }

    /// Write a copy scaled down to fit within `max_edge` pixels on both sides.
    ///
    /// Images that already fit are written at their original size.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn write_thumbnail(&self, path: impl AsRef<Path>, max_edge: u32) -> Result<()> {
        let path = path.as_ref();
        let image = match &self.pixels {
            Pixels::Encoded(bytes) => image::load_from_memory_with_format(bytes, ImageFormat::Png)
                .or_raise(|| ErrorKind::decode("malformed raster payload"))?,
            Pixels::Rgba(image) => DynamicImage::ImageRgba8(image.clone()),
        };
        let thumbnail = if image.width() <= max_edge && image.height() <= max_edge {
            image
        } else {
            image.thumbnail(max_edge, max_edge)
        };
        create_parent(path)?;
        thumbnail.save_with_format(path, ImageFormat::Png).or_raise(|| ErrorKind::Io)?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Io)?;
    }
    Ok(())
}
