pub mod errors;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod writer;

pub use parser::{decode, DecodeError};
pub use request::{Headers, Method, Request, RequestError};
pub use response::{Body, Response};
pub use writer::{serialize, write_response};
