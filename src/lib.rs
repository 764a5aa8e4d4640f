//! Housing Prep - очистка данных и генерация признаков для регрессии цен на жильё

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use config::*;
pub use error::PrepError;
pub use pipeline::PreparationPipeline;
pub use preprocessing::*;
pub use types::*;
