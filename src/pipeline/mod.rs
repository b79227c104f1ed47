// Client pipeline status derivation
//
// Pure functions only: callers load a client's stages, hand them to
// `derive_status`, and merge the summary into whatever they render.

pub mod engine;
pub mod status;

pub use engine::*;
pub use status::*;
