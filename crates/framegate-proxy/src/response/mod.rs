//! Locally generated responses.

mod builder;
pub mod pages;

pub use builder::ResponseBuilder;
