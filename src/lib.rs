pub mod config;
pub mod errors;
pub mod manager;
pub mod mock;
pub mod parser;
pub mod tables;

pub use config::MockConfig;
pub use manager::DataSourceManager;
pub use mock::MockService;
pub use parser::parse_file;
pub use tables::{DataSource, ParsedFile, ParsedTable, UploadedFile};
