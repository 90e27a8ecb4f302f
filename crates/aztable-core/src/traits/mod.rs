//! Core traits for table service behavior.

mod page_stream;
mod table_service;

pub use page_stream::PageStream;
pub use table_service::TableService;
