pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::{DefineryClient, LocalDocuments};
pub use config::ClientConfig;
pub use crate::core::{
    browser::ParameterBrowser,
    import::{BatchImporter, ImportPolicy, ParsedDocument},
    pager::Pager,
    upload::{BatchUploader, UploadSummary},
};
pub use utils::error::{DefineryError, Result};
