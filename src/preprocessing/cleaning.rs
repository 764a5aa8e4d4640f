//! Очистка данных: пропуски, лишние колонки, выбросы по цене

use crate::config::CleanerConfig;
use crate::error::{PrepError, Result};
use crate::preprocessing::imputation::MissingValueImputer;
use crate::preprocessing::statistics::quantile;
use crate::types::{CleaningReport, ColumnData, Dataset};

#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleanerConfig,
}

impl DataCleaner {
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Полный цикл очистки, набор меняется на месте:
    /// 1. пропуски (медиана / мода)
    /// 2. удаление колонок-идентификаторов
    /// 3. отсечение выбросов по квантилям целевой колонки
    pub fn clean(&self, dataset: &mut Dataset) -> Result<CleaningReport> {
        let rows_before = dataset.n_rows();

        let imputation = MissingValueImputer::impute(dataset);
        let dropped_columns = self.drop_columns(dataset);
        let bounds = self.remove_outliers(dataset)?;

        let report = CleaningReport {
            imputation,
            dropped_columns,
            rows_before,
            rows_after: dataset.n_rows(),
            lower_bound: bounds.map(|(lower, _)| lower),
            upper_bound: bounds.map(|(_, upper)| upper),
        };

        tracing::info!(
            "Cleaned dataset: {} -> {} rows, {} values imputed, {} columns dropped",
            report.rows_before,
            report.rows_after,
            report.imputation.numeric_filled + report.imputation.categorical_filled,
            report.dropped_columns.len()
        );

        Ok(report)
    }

    pub fn drop_columns(&self, dataset: &mut Dataset) -> Vec<String> {
        let dropped = dataset.drop_columns(&self.config.drop_columns);
        if !dropped.is_empty() {
            tracing::debug!("Dropped columns: {:?}", dropped);
        }
        dropped
    }

    /// Оставляет строки, где значение целевой колонки строго между нижним и
    /// верхним квантилем. Строки на границах и строки с пропуском удаляются.
    /// Возвращает границы, `None` если наблюдений нет.
    pub fn remove_outliers(&self, dataset: &mut Dataset) -> Result<Option<(f64, f64)>> {
        let target = &self.config.target_column;
        let column = dataset
            .column(target)
            .ok_or_else(|| PrepError::MissingColumn(target.clone()))?;

        let values = match &column.data {
            ColumnData::Numeric(values) => values,
            ColumnData::Categorical(_) => return Err(PrepError::NotNumeric(target.clone())),
        };

        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        let bounds = quantile(&observed, self.config.lower_quantile)
            .zip(quantile(&observed, self.config.upper_quantile));

        let mask: Vec<bool> = match bounds {
            Some((lower, upper)) => values
                .iter()
                .map(|v| matches!(v, Some(x) if *x > lower && *x < upper))
                .collect(),
            None => vec![false; values.len()],
        };

        let removed = dataset.retain_rows(&mask)?;
        tracing::debug!("Removed {} outlier rows by '{}' with bounds {:?}", removed, target, bounds);

        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn prices(values: impl IntoIterator<Item = f64>) -> Column {
        Column::numeric("price", values.into_iter().map(Some).collect())
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CleanerConfig {
            lower_quantile: 0.9,
            upper_quantile: 0.1,
            ..CleanerConfig::default()
        };
        assert!(DataCleaner::new(config).is_err());
    }

    #[test]
    fn test_new_keeps_valid_config() {
        let config = CleanerConfig {
            target_column: "price_eur".to_string(),
            ..CleanerConfig::default()
        };
        let cleaner = DataCleaner::new(config.clone()).unwrap();
        assert_eq!(cleaner.config(), &config);
    }

    #[test]
    fn test_clean_requires_price() {
        let mut dataset =
            Dataset::from_columns(vec![Column::numeric("livingarea", vec![Some(80.0)])]).unwrap();

        let err = DataCleaner::default().clean(&mut dataset).unwrap_err();
        assert_eq!(err, PrepError::MissingColumn("price".to_string()));
    }

    #[test]
    fn test_categorical_price_is_rejected() {
        let mut dataset = Dataset::from_columns(vec![Column::categorical(
            "price",
            vec![Some("cheap".to_string())],
        )])
        .unwrap();

        let err = DataCleaner::default().clean(&mut dataset).unwrap_err();
        assert_eq!(err, PrepError::NotNumeric("price".to_string()));
    }

    #[test]
    fn test_drop_columns_removes_identifiers() {
        let mut dataset = Dataset::from_columns(vec![
            Column::numeric("Unnamed: 0", vec![Some(0.0)]),
            Column::numeric("postal_code", vec![Some(9000.0)]),
            Column::numeric("price", vec![Some(1.0)]),
        ])
        .unwrap();

        let dropped = DataCleaner::default().drop_columns(&mut dataset);

        assert_eq!(dropped, vec!["Unnamed: 0".to_string(), "postal_code".to_string()]);
        assert_eq!(dataset.column_names(), vec!["price"]);
    }

    #[test]
    fn test_outliers_outside_percentiles_are_removed() {
        let mut dataset =
            Dataset::from_columns(vec![prices((1..=100).map(|i| (i * 10) as f64))]).unwrap();

        let bounds = DataCleaner::default()
            .remove_outliers(&mut dataset)
            .unwrap()
            .unwrap();

        assert!((bounds.0 - 19.9).abs() < 1e-9);
        assert!((bounds.1 - 990.1).abs() < 1e-9);
        assert_eq!(dataset.n_rows(), 98);

        let kept = dataset.numeric_array("price").unwrap();
        assert_eq!(kept[0], 20.0);
        assert_eq!(kept[kept.len() - 1], 990.0);
    }

    #[test]
    fn test_rows_on_bounds_are_excluded() {
        // все значения равны: обе границы совпадают с ними
        let mut dataset = Dataset::from_columns(vec![prices([5.0, 5.0, 5.0])]).unwrap();

        DataCleaner::default().remove_outliers(&mut dataset).unwrap();

        assert_eq!(dataset.n_rows(), 0);
    }

    #[test]
    fn test_empty_dataset_stays_empty() {
        let mut dataset = Dataset::from_columns(vec![prices(Vec::new())]).unwrap();

        let report = DataCleaner::default().clean(&mut dataset).unwrap();

        assert_eq!(report.rows_after, 0);
        assert_eq!(report.lower_bound, None);
    }

    #[test]
    fn test_clean_imputes_before_filtering() {
        let mut values: Vec<Option<f64>> = (1..=100).map(|i| Some(i as f64)).collect();
        values[10] = None;
        let mut dataset = Dataset::from_columns(vec![
            Column::numeric("price", values),
            Column::categorical("locality", vec![Some("Gent".to_string()); 100]),
        ])
        .unwrap();

        let report = DataCleaner::default().clean(&mut dataset).unwrap();

        assert_eq!(report.imputation.numeric_filled, 1);
        assert_eq!(report.dropped_columns, vec!["locality".to_string()]);
        assert_eq!(report.rows_before, 100);
        // квантили считаются уже по заполненной цене (медиана 51)
        assert_eq!(report.rows_after, 98);
        assert!((report.lower_bound.unwrap() - 1.99).abs() < 1e-9);
        assert!((report.upper_bound.unwrap() - 99.01).abs() < 1e-9);
        assert_eq!(dataset.missing_count(), 0);

        // строка с ценой 1 отсечена, бывший пропуск теперь на позиции 9
        let kept = dataset.numeric_array("price").unwrap();
        assert_eq!(kept[9], 51.0);
    }
}
