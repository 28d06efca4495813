pub(crate) mod classifier;
pub(crate) mod optimizer;
pub(crate) mod severity;
pub(crate) mod suggest;
