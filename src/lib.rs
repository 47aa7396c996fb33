use std::pin::Pin;

pub mod calc;
pub mod config;
pub mod protocol;
pub mod server;
pub mod statics;

pub type DynFuture<T> = Pin<Box<dyn futures::Future<Output = T> + Send>>;
