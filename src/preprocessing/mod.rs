/// Модуль предобработки данных

pub mod cleaning;
pub mod feature_engineering;
pub mod imputation;
pub mod statistics;

pub use cleaning::DataCleaner;
pub use feature_engineering::FeatureEngineer;
pub use imputation::MissingValueImputer;
