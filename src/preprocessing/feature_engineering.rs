//! Feature engineering для регрессии цен

use ndarray::{stack, Array1, ArrayView1, Axis, Zip};

use crate::preprocessing::imputation::MissingValueImputer;
use crate::types::{Column, Dataset, FeatureReport, ImputationReport};

pub const TOTAL_AREA: &str = "Total_Area";
pub const TOTAL_PROPERTY_FEATURES: &str = "total_property_features";
pub const AVERAGE_ROOM_SIZE: &str = "average_room_Size";
pub const PRICE_PER_SQM: &str = "price_per_sqm";

/// Удобства, из которых складывается `total_property_features`
pub const PROPERTY_FEATURE_COLUMNS: [&str; 6] =
    ["kitchen", "loft", "terrace", "garden", "pool", "gardensurface"];

type FeatureStep = fn(&FeatureEngineer, &mut Dataset) -> bool;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngineer;

impl FeatureEngineer {
    pub fn new() -> Self {
        Self
    }

    /// Все шаги по порядку. Признак без исходных колонок просто пропускается,
    /// поэтому сборка никогда не падает.
    pub fn build(&self, dataset: &mut Dataset) -> FeatureReport {
        let mut report = FeatureReport {
            imputation: self.handle_missing_values(dataset),
            ..FeatureReport::default()
        };

        // порядок важен: price_per_sqm читает Total_Area
        let steps: [(&str, FeatureStep); 4] = [
            (TOTAL_AREA, Self::total_area),
            (TOTAL_PROPERTY_FEATURES, Self::add_property_features_count),
            (AVERAGE_ROOM_SIZE, Self::add_average_room_size),
            (PRICE_PER_SQM, Self::price_per_sqm),
        ];

        for (name, step) in steps {
            if step(self, dataset) {
                report.added.push(name.to_string());
            } else {
                report.skipped.push(name.to_string());
            }
        }

        tracing::info!(
            "Feature engineering: added {:?}, skipped {:?}",
            report.added,
            report.skipped
        );

        report
    }

    pub fn handle_missing_values(&self, dataset: &mut Dataset) -> ImputationReport {
        MissingValueImputer::impute(dataset)
    }

    /// Total_Area = livingarea + surfaceoftheplot
    pub fn total_area(&self, dataset: &mut Dataset) -> bool {
        let (Some(living), Some(plot)) = (
            numeric_input(dataset, TOTAL_AREA, "livingarea"),
            numeric_input(dataset, TOTAL_AREA, "surfaceoftheplot"),
        ) else {
            return false;
        };

        store(dataset, TOTAL_AREA, &(&living + &plot))
    }

    /// Сумма по строке всех шести удобств; нужны все шесть колонок
    pub fn add_property_features_count(&self, dataset: &mut Dataset) -> bool {
        let Some(inputs) = PROPERTY_FEATURE_COLUMNS
            .iter()
            .map(|name| numeric_input(dataset, TOTAL_PROPERTY_FEATURES, name))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };

        let views: Vec<ArrayView1<f64>> = inputs.iter().map(|a| a.view()).collect();
        let stacked = match stack(Axis(1), &views) {
            Ok(stacked) => stacked,
            Err(e) => {
                tracing::warn!("Cannot stack property features: {}", e);
                return false;
            }
        };

        // пропуски в сумме не участвуют
        let total = stacked
            .mapv(|v| if v.is_nan() { 0.0 } else { v })
            .sum_axis(Axis(1));

        store(dataset, TOTAL_PROPERTY_FEATURES, &total)
    }

    /// livingarea / bedrooms, 0 если спален нет
    pub fn add_average_room_size(&self, dataset: &mut Dataset) -> bool {
        let (Some(living), Some(bedrooms)) = (
            numeric_input(dataset, AVERAGE_ROOM_SIZE, "livingarea"),
            numeric_input(dataset, AVERAGE_ROOM_SIZE, "bedrooms"),
        ) else {
            return false;
        };

        store(dataset, AVERAGE_ROOM_SIZE, &safe_ratio(&living, &bedrooms))
    }

    /// price / Total_Area, 0 если площадь не положительная
    pub fn price_per_sqm(&self, dataset: &mut Dataset) -> bool {
        let (Some(price), Some(area)) = (
            numeric_input(dataset, PRICE_PER_SQM, "price"),
            numeric_input(dataset, PRICE_PER_SQM, TOTAL_AREA),
        ) else {
            return false;
        };

        store(dataset, PRICE_PER_SQM, &safe_ratio(&price, &area))
    }
}

/// Исходная колонка признака. `None`, если колонки нет или она не числовая.
fn numeric_input(dataset: &Dataset, feature: &str, name: &str) -> Option<Array1<f64>> {
    let Some(column) = dataset.column(name) else {
        tracing::debug!("Skipping {}: column '{}' is absent", feature, name);
        return None;
    };

    if !column.data.is_numeric() {
        tracing::warn!("Skipping {}: column '{}' is not numeric", feature, name);
        return None;
    }
    dataset.numeric_array(name)
}

fn safe_ratio(numerator: &Array1<f64>, denominator: &Array1<f64>) -> Array1<f64> {
    Zip::from(numerator)
        .and(denominator)
        .map_collect(|&n, &d| if d > 0.0 { n / d } else { 0.0 })
}

fn store(dataset: &mut Dataset, name: &str, values: &Array1<f64>) -> bool {
    match dataset.set_column(Column::from_array(name, values)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Cannot store {}: {}", name, e);
            false
        }
    }
}
