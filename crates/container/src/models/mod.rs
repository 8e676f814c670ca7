mod fingerprint;
mod frame;
mod pivot;
mod ruid;

pub use self::fingerprint::{FINGERPRINT_LEN, Fingerprint};
pub use self::frame::AnimationFrame;
pub use self::pivot::{Pivot, Placement};
pub use self::ruid::{RUID_BYTES, Ruid};
