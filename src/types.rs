/// Типы данных для модуля предобработки

use std::collections::HashSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::CleanerConfig;
use crate::error::{PrepError, Result};

/// Одна строка набора данных в JSON-представлении
pub type Record = Map<String, Value>;

/// Значения колонки; `None` - пропуск
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.iter().filter(|v| is_missing(v)).count(),
            ColumnData::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    fn retain(&mut self, mask: &[bool]) {
        match self {
            ColumnData::Numeric(values) => retain_by_mask(values, mask),
            ColumnData::Categorical(values) => retain_by_mask(values, mask),
        }
    }

    fn json_value(&self, row: usize) -> Value {
        match self {
            ColumnData::Numeric(values) => match values.get(row).copied().flatten() {
                // Целые значения отдаём как целые, чтобы не превращать 3 в 3.0
                Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Value::from(v as i64),
                Some(v) => serde_json::Number::from_f64(v)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                None => Value::Null,
            },
            ColumnData::Categorical(values) => match values.get(row) {
                Some(Some(s)) => Value::String(s.clone()),
                _ => Value::Null,
            },
        }
    }
}

/// Пропуск в числовой колонке: `None` или NaN
pub(crate) fn is_missing(value: &Option<f64>) -> bool {
    value.map_or(true, f64::is_nan)
}

fn retain_by_mask<T>(values: &mut Vec<T>, mask: &[bool]) {
    let mut keep = mask.iter();
    values.retain(|_| keep.next().copied().unwrap_or(false));
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// NaN приводится к `None`, пропуск хранится только одним способом
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect();
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Колонка из массива ndarray; NaN становится пропуском
    pub fn from_array(name: impl Into<String>, array: &Array1<f64>) -> Self {
        Self::numeric(name, array.iter().map(|v| Some(*v)).collect())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Табличный набор данных: именованные колонки одинаковой длины.
///
/// Хранится по колонкам, снаружи адресуется по строкам.
/// Имена колонок уникальны.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut dataset = Self::new();
        for column in columns {
            if dataset.has_column(&column.name) {
                return Err(PrepError::DuplicateColumn(column.name));
            }
            dataset.check_length(&column)?;
            dataset.columns.push(column);
        }
        Ok(dataset)
    }

    /// Построение набора из JSON-строк.
    ///
    /// Порядок колонок - порядок первого появления ключа. Колонка числовая,
    /// если все непустые значения - числа или bool (true = 1, false = 0),
    /// иначе категориальная. Отсутствующий ключ - пропуск.
    pub fn from_records(records: &[Record]) -> Result<Self> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| column_from_records(name, records))
            .collect::<Result<Vec<_>>>()?;

        Self::from_columns(columns)
    }

    pub fn to_records(&self) -> Vec<Record> {
        (0..self.n_rows())
            .map(|row| {
                let mut record = Record::new();
                for column in &self.columns {
                    record.insert(column.name.clone(), column.data.json_value(row));
                }
                record
            })
            .collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Заменяет колонку с тем же именем на месте или добавляет новую в конец
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        self.check_length(&column)?;
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Удаляет перечисленные колонки; отсутствующие пропускаются.
    /// Возвращает имена реально удалённых колонок.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let mut dropped = Vec::new();
        self.columns.retain(|c| {
            let drop = names.iter().any(|n| n.as_ref() == c.name);
            if drop {
                dropped.push(c.name.clone());
            }
            !drop
        });
        dropped
    }

    /// Оставляет строки, для которых `mask[i] == true`. Возвращает число удалённых строк.
    pub fn retain_rows(&mut self, mask: &[bool]) -> Result<usize> {
        let n_rows = self.n_rows();
        if mask.len() != n_rows {
            return Err(PrepError::LengthMismatch {
                column: "row mask".to_string(),
                expected: n_rows,
                got: mask.len(),
            });
        }

        for column in &mut self.columns {
            column.data.retain(mask);
        }

        Ok(n_rows - self.n_rows())
    }

    /// Числовая колонка как массив; пропуски - NaN.
    /// `None`, если колонки нет или она категориальная.
    pub fn numeric_array(&self, name: &str) -> Option<Array1<f64>> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Some(
                values
                    .iter()
                    .map(|v| v.filter(|x| !x.is_nan()).unwrap_or(f64::NAN))
                    .collect::<Array1<f64>>(),
            ),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(|c| c.data.missing_count()).sum()
    }

    fn check_length(&self, column: &Column) -> Result<()> {
        if self.columns.is_empty() || column.len() == self.n_rows() {
            return Ok(());
        }
        Err(PrepError::LengthMismatch {
            column: column.name.clone(),
            expected: self.n_rows(),
            got: column.len(),
        })
    }
}

fn column_from_records(name: String, records: &[Record]) -> Result<Column> {
    let cells: Vec<Option<&Value>> = records
        .iter()
        .map(|r| r.get(&name).filter(|v| !v.is_null()))
        .collect();

    if cells
        .iter()
        .flatten()
        .any(|v| matches!(v, Value::Array(_) | Value::Object(_)))
    {
        return Err(PrepError::InvalidValue {
            column: name,
            reason: "nested arrays and objects are not supported".to_string(),
        });
    }

    let numeric = cells
        .iter()
        .flatten()
        .all(|v| matches!(v, Value::Number(_) | Value::Bool(_)));

    if numeric {
        let values = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            })
            .collect();
        Ok(Column::numeric(name, values))
    } else {
        let values = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            })
            .collect();
        Ok(Column::categorical(name, values))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputationReport {
    pub numeric_filled: usize,
    pub categorical_filled: usize,
    /// Колонки без единого наблюдения: заполнить нечем
    #[serde(default)]
    pub unfillable_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub imputation: ImputationReport,
    pub dropped_columns: Vec<String>,
    pub rows_before: usize,
    pub rows_after: usize,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub imputation: ImputationReport,
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparationReport {
    pub cleaning: CleaningReport,
    pub features: FeatureReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRequest {
    pub rows: Vec<Record>,
    #[serde(default)]
    pub config: Option<CleanerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetResponse<R> {
    pub rows: Vec<Record>,
    pub report: R,
}
