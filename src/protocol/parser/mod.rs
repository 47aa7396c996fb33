mod primitives;
mod request;

pub use request::{decode, DecodeError};
