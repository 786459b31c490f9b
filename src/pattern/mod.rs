pub(crate) mod cache;
pub(crate) mod color;
pub(crate) mod tiling;
