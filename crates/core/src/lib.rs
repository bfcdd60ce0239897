//! Club portal core types and utilities

pub mod config;
pub mod error;
pub mod navigation;
pub mod paths;
pub mod session;
pub mod storage;

pub use config::{ApiConfig, ClientConfig, PathsConfig, StorageConfig};
pub use error::{CoreError, CoreResult};
pub use navigation::{MemoryNavigator, Navigator};
pub use paths::{PathRule, PublicPaths, normalize_path};
pub use session::{Session, SessionStore};
pub use storage::{ACCESS_TOKEN_KEY, FileStorage, MemoryStorage, REFRESH_TOKEN_KEY, TokenStorage};
