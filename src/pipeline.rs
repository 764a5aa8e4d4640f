//! Полный цикл подготовки: очистка, затем генерация признаков

use crate::config::CleanerConfig;
use crate::error::Result;
use crate::preprocessing::{DataCleaner, FeatureEngineer};
use crate::types::{Dataset, PreparationReport};

#[derive(Debug, Clone, Default)]
pub struct PreparationPipeline {
    cleaner: DataCleaner,
    engineer: FeatureEngineer,
}

impl PreparationPipeline {
    pub fn new(config: CleanerConfig) -> Result<Self> {
        Ok(Self {
            cleaner: DataCleaner::new(config)?,
            engineer: FeatureEngineer::new(),
        })
    }

    pub fn cleaner(&self) -> &DataCleaner {
        &self.cleaner
    }

    pub fn engineer(&self) -> &FeatureEngineer {
        &self.engineer
    }

    /// Ошибка очистки прерывает цикл до генерации признаков
    pub fn run(&self, dataset: &mut Dataset) -> Result<PreparationReport> {
        let cleaning = self.cleaner.clean(dataset)?;
        let features = self.engineer.build(dataset);

        Ok(PreparationReport { cleaning, features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;
    use crate::types::Column;

    #[test]
    fn test_run_cleans_then_builds() {
        let n = 50;
        let mut dataset = Dataset::from_columns(vec![
            Column::numeric("price", (1..=n).map(|i| Some(i as f64 * 10000.0)).collect()),
            Column::numeric("livingarea", (1..=n).map(|_| Some(100.0)).collect()),
            Column::numeric("surfaceoftheplot", (1..=n).map(|_| None).collect()),
            Column::numeric("postal_code", (1..=n).map(|_| Some(1000.0)).collect()),
        ])
        .unwrap();

        let report = PreparationPipeline::default().run(&mut dataset).unwrap();

        assert_eq!(report.cleaning.rows_after, 48);
        assert_eq!(report.cleaning.dropped_columns, vec!["postal_code".to_string()]);
        // surfaceoftheplot пустая: Total_Area без значений, price_per_sqm = 0
        assert_eq!(report.cleaning.imputation.unfillable_columns, vec!["surfaceoftheplot".to_string()]);
        assert_eq!(dataset.column("Total_Area").unwrap().data.missing_count(), 48);
        assert!(dataset.numeric_array("price_per_sqm").unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_run_stops_on_missing_price() {
        let mut dataset =
            Dataset::from_columns(vec![Column::numeric("livingarea", vec![Some(80.0)])]).unwrap();

        let err = PreparationPipeline::default().run(&mut dataset).unwrap_err();

        assert_eq!(err, PrepError::MissingColumn("price".to_string()));
        assert!(!dataset.has_column("Total_Area"));
    }
}
