// Adapters layer: concrete implementations of the domain ports.

pub mod documents;
pub mod http;

pub use documents::LocalDocuments;
pub use http::DefineryClient;
