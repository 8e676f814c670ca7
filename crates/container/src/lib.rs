//! Decoding of cached resource containers.
//!
//! A container is an opaque file holding one asset behind an undocumented
//! header. Single-image containers embed a PNG or DDS payload somewhere in
//! their first few kilobytes; animation clip containers list their frames
//! either by identifier or by embedding each frame's content fingerprint.

mod consts;
mod decode;
pub mod error;
mod fingerprint;
mod frames;
mod locate;
pub mod models;
mod pivot;
mod texture;

pub use crate::consts::{DEFAULT_FRAME_DURATION_MS, DEFAULT_SEARCH_WINDOW, FINGERPRINT_HEAD_LEN};
pub use crate::decode::{ContainerImage, ImageHeader, decode, inspect};
pub use crate::fingerprint::{FingerprintMap, fingerprint_of, read_fingerprint};
pub use crate::frames::{AnimationLayout, decode_identifier, encode_identifier, resolve};
pub use crate::locate::{Payload, PayloadKind, PayloadLayout};
pub use crate::pivot::extract_pivot;
pub use crate::texture::{TextureFormat, TextureHeader};
