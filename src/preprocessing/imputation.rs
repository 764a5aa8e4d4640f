//! Заполнение пропусков: медиана для числовых колонок, мода для категориальных

use crate::preprocessing::statistics::{median, mode};
use crate::types::{is_missing, ColumnData, Dataset, ImputationReport};

pub struct MissingValueImputer;

impl MissingValueImputer {
    /// Заполняет пропуски на месте. Статистики считаются по непустым значениям
    /// колонки на момент вызова. Колонка без наблюдений остаётся как есть.
    pub fn impute(dataset: &mut Dataset) -> ImputationReport {
        let mut report = ImputationReport::default();

        for column in dataset.columns_mut() {
            let missing = column.data.missing_count();
            if missing == 0 {
                continue;
            }

            let filled = match &mut column.data {
                ColumnData::Numeric(values) => {
                    let observed: Vec<f64> = values.iter().flatten().copied().collect();
                    median(&observed).map(|fill| {
                        values.iter_mut().filter(|v| is_missing(v)).for_each(|v| *v = Some(fill));
                        tracing::debug!("Filled {} values in '{}' with median {}", missing, column.name, fill);
                        report.numeric_filled += missing;
                    })
                }
                ColumnData::Categorical(values) => {
                    let fill = mode(values.iter().flatten().map(String::as_str)).map(str::to_owned);
                    fill.map(|fill| {
                        tracing::debug!("Filled {} values in '{}' with mode '{}'", missing, column.name, fill);
                        values
                            .iter_mut()
                            .filter(|v| v.is_none())
                            .for_each(|v| *v = Some(fill.clone()));
                        report.categorical_filled += missing;
                    })
                }
            };

            if filled.is_none() {
                tracing::warn!("Column '{}' has no observed values, leaving it unfilled", column.name);
                report.unfillable_columns.push(column.name.clone());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn text(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_numeric_missing_filled_with_median() {
        let mut dataset = Dataset::from_columns(vec![Column::numeric(
            "livingarea",
            vec![Some(100.0), None, Some(50.0), Some(80.0), None],
        )])
        .unwrap();

        let report = MissingValueImputer::impute(&mut dataset);

        assert_eq!(report.numeric_filled, 2);
        assert_eq!(
            dataset.column("livingarea").unwrap().data,
            ColumnData::Numeric(vec![Some(100.0), Some(80.0), Some(50.0), Some(80.0), Some(80.0)])
        );
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let mut dataset = Dataset::from_columns(vec![Column::numeric(
            "price",
            vec![Some(f64::NAN), Some(1.0), None],
        )])
        .unwrap();

        let report = MissingValueImputer::impute(&mut dataset);

        assert_eq!(report.numeric_filled, 2);
        assert_eq!(dataset.missing_count(), 0);
        assert_eq!(
            dataset.column("price").unwrap().data,
            ColumnData::Numeric(vec![Some(1.0), Some(1.0), Some(1.0)])
        );
    }

    #[test]
    fn test_nan_written_directly_is_filled() {
        let mut dataset = Dataset::from_columns(vec![Column::numeric("price", vec![Some(2.0), Some(4.0)])]).unwrap();
        dataset.columns_mut()[0].data = ColumnData::Numeric(vec![Some(f64::NAN), Some(4.0)]);

        let report = MissingValueImputer::impute(&mut dataset);

        assert_eq!(report.numeric_filled, 1);
        assert_eq!(
            dataset.column("price").unwrap().data,
            ColumnData::Numeric(vec![Some(4.0), Some(4.0)])
        );
    }

    #[test]
    fn test_categorical_missing_filled_with_mode() {
        let mut dataset = Dataset::from_columns(vec![Column::categorical(
            "type",
            text(&[Some("HOUSE"), None, Some("APARTMENT"), Some("HOUSE")]),
        )])
        .unwrap();

        let report = MissingValueImputer::impute(&mut dataset);

        assert_eq!(report.categorical_filled, 1);
        assert_eq!(
            dataset.column("type").unwrap().data,
            ColumnData::Categorical(text(&[Some("HOUSE"), Some("HOUSE"), Some("APARTMENT"), Some("HOUSE")]))
        );
    }

    #[test]
    fn test_categorical_tie_uses_smallest_value() {
        let mut dataset = Dataset::from_columns(vec![Column::categorical(
            "province",
            text(&[Some("Namur"), Some("Antwerp"), None]),
        )])
        .unwrap();

        MissingValueImputer::impute(&mut dataset);

        assert_eq!(
            dataset.column("province").unwrap().data,
            ColumnData::Categorical(text(&[Some("Namur"), Some("Antwerp"), Some("Antwerp")]))
        );
    }

    #[test]
    fn test_all_missing_column_reported_unfillable() {
        let mut dataset = Dataset::from_columns(vec![
            Column::numeric("empty", vec![None, None]),
            Column::numeric("full", vec![Some(1.0), Some(2.0)]),
        ])
        .unwrap();

        let report = MissingValueImputer::impute(&mut dataset);

        assert_eq!(report.unfillable_columns, vec!["empty".to_string()]);
        assert_eq!(report.numeric_filled, 0);
        assert_eq!(dataset.missing_count(), 2);
    }

    #[test]
    fn test_impute_is_idempotent() {
        let mut dataset = Dataset::from_columns(vec![Column::numeric(
            "bedrooms",
            vec![Some(1.0), None, Some(3.0)],
        )])
        .unwrap();

        MissingValueImputer::impute(&mut dataset);
        let once = dataset.clone();
        let report = MissingValueImputer::impute(&mut dataset);

        assert_eq!(dataset, once);
        assert_eq!(report, ImputationReport::default());
    }
}
