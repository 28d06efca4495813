pub mod channel;
pub mod earfcn;
pub mod propagation;
