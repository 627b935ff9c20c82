mod settings;

pub use settings::{
    ApiConfig, DatabaseConfig, LoggingConfig, OtelConfig, PaginationConfig, ServerConfig,
    Settings, StorageConfig,
};
