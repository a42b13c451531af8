pub mod attributes;
pub mod bbox;
pub mod classify;
pub mod client;
pub mod html;
pub mod parse;
pub mod resolver;
pub mod result;
pub mod source;

pub use client::WfsClient;
pub use resolver::{Lookup, Resolution, Resolver};
pub use source::Source;
