pub mod geometry;
pub(crate) mod spatial;
