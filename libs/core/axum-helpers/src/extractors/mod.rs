//! Custom extractors that reject with [`AppError`](crate::errors::AppError).

pub mod uuid_path;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
