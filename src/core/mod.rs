pub mod browser;
pub mod import;
pub mod pager;
pub mod upload;

pub use crate::domain::model::{ImportDecision, ImportRecord, ListScope};
pub use crate::domain::ports::{BatchIdSource, DocumentProvider, ParameterStore};
pub use crate::utils::error::Result;
