use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// One value of a mart row. Integers from the warehouse land in `Number`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl Cell {
    /// Numeric view; `NaN` is treated like a null.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null) || matches!(self, Cell::Number(v) if v.is_nan())
    }

    pub fn matches_id(&self, id: i64) -> bool {
        self.as_f64().is_some_and(|v| v == id as f64)
    }

    pub(crate) fn group_key(&self) -> CellKey {
        match self {
            Cell::Number(v) if !v.is_nan() => CellKey::Number(v.to_bits()),
            Cell::Text(s) => CellKey::Text(s.clone()),
            _ => CellKey::Null,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Number(f64::from(v))
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CellKey {
    Number(u64),
    Text(String),
    Null,
}

/// Whether a larger value is a better performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// Maps a value onto an axis where larger is always better.
    pub fn orient(self, v: f64) -> f64 {
        match self {
            Direction::HigherIsBetter => v,
            Direction::LowerIsBetter => -v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMetrics {
    values: BTreeMap<String, Cell>,
}

impl EntityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Cell>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Cell>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.values.get(name)
    }

    /// Typed lookup: `None` when the metric is absent, null or non-numeric.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Cell::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Cell)> for EntityMetrics {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a MetricTable,
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.index.get(column).map(|&idx| &self.cells[idx])
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    pub fn to_entity(&self) -> EntityMetrics {
        self.table
            .columns
            .iter()
            .cloned()
            .zip(self.cells.iter().cloned())
            .collect()
    }
}

/// A population of records sharing one column universe.
///
/// Every row holds a cell for every column; absent values are explicit
/// `Cell::Null`. Tables are immutable once built: derived tables are new
/// values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
    directions: HashMap<String, Direction>,
}

impl MetricTable {
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(StatsError::DuplicateColumn(name.clone()));
            }
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(StatsError::RaggedRow {
                    row,
                    got: cells.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self {
            columns,
            index,
            rows,
            directions: HashMap::new(),
        })
    }

    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Cell>)>) -> Result<Self> {
        let n = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<Cell>> = (0..n).map(|_| Vec::with_capacity(columns.len())).collect();
        for (name, values) in columns {
            let name: String = name.into();
            if values.len() != n {
                return Err(StatsError::RaggedRow {
                    row: values.len().min(n),
                    got: values.len(),
                    expected: n,
                });
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            names.push(name);
        }
        Self::from_rows(names, rows)
    }

    /// Builds a table from loose records; columns a record lacks become `Null`.
    pub fn from_records(records: &[EntityMetrics]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            for (name, _) in record.iter() {
                if !index.contains_key(name) {
                    index.insert(name.to_string(), columns.len());
                    columns.push(name.to_string());
                }
            }
        }
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|name| record.get(name).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            columns,
            index,
            rows,
            directions: HashMap::new(),
        }
    }

    pub fn with_direction(mut self, metric: &str, direction: Direction) -> Self {
        self.directions.insert(metric.to_string(), direction);
        self
    }

    pub fn with_directions<'a>(
        mut self,
        directions: impl IntoIterator<Item = (&'a str, Direction)>,
    ) -> Self {
        for (metric, direction) in directions {
            self.directions.insert(metric.to_string(), direction);
        }
        self
    }

    pub fn direction(&self, metric: &str) -> Direction {
        self.directions.get(metric).copied().unwrap_or_default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef {
            table: self,
            cells: cells.as_slice(),
        })
    }

    pub fn row(&self, idx: usize) -> Option<RowRef<'_>> {
        self.rows.get(idx).map(|cells| RowRef {
            table: self,
            cells: cells.as_slice(),
        })
    }

    pub fn cells(&self, column: &str) -> Result<Vec<&Cell>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn numbers(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row[idx].as_f64()).collect())
    }

    /// Non-null numeric values of a column, or `None` when the column is absent.
    pub fn present_values(&self, column: &str) -> Option<Vec<f64>> {
        let idx = *self.index.get(column)?;
        Some(self.rows.iter().filter_map(|row| row[idx].as_f64()).collect())
    }

    /// A column counts as a metric when it carries at least one number.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        self.index
            .get(column)
            .is_some_and(|&idx| self.rows.iter().any(|row| row[idx].as_f64().is_some()))
    }

    pub fn has_text(&self, column: &str) -> bool {
        self.index
            .get(column)
            .is_some_and(|&idx| self.rows.iter().any(|row| matches!(row[idx], Cell::Text(_))))
    }

    pub fn find_entity(&self, id_column: &str, id: i64) -> Option<EntityMetrics> {
        self.rows()
            .find(|row| row.get(id_column).is_some_and(|c| c.matches_id(id)))
            .map(|row| row.to_entity())
    }

    pub fn filter(&self, mut keep: impl FnMut(&RowRef<'_>) -> bool) -> MetricTable {
        let rows = self
            .rows
            .iter()
            .filter(|cells| {
                keep(&RowRef {
                    table: self,
                    cells: cells.as_slice(),
                })
            })
            .cloned()
            .collect();
        MetricTable {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
            directions: self.directions.clone(),
        }
    }

    /// Returns a copy with `name` added (or replaced) by `values`.
    pub fn with_column(&self, name: &str, values: Vec<Cell>) -> Result<MetricTable> {
        if values.len() != self.rows.len() {
            return Err(StatsError::RaggedRow {
                row: values.len().min(self.rows.len()),
                got: values.len(),
                expected: self.rows.len(),
            });
        }
        let mut out = self.clone();
        match out.index.get(name).copied() {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.index.insert(name.to_string(), out.columns.len());
                out.columns.push(name.to_string());
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(out)
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| StatsError::UnknownColumn(column.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_padded_with_explicit_nulls() {
        let a = EntityMetrics::new().with("team_id", 1).with("goals", 10.0);
        let b = EntityMetrics::new().with("team_id", 2).with("shots", 40.0);
        let table = MetricTable::from_records(&[a, b]);

        assert_eq!(table.columns(), ["goals", "team_id", "shots"]);
        let row = table.row(1).unwrap();
        assert_eq!(row.get("goals"), Some(&Cell::Null));
        assert_eq!(row.number("shots"), Some(40.0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = MetricTable::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Number(1.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::RaggedRow { row: 0, got: 1, expected: 2 }));
    }

    #[test]
    fn nan_reads_as_null() {
        assert!(Cell::Number(f64::NAN).is_null());
        assert_eq!(Cell::Number(f64::NAN).as_f64(), None);
    }

    #[test]
    fn find_entity_matches_integer_ids() {
        let table = MetricTable::from_columns(vec![
            ("team_id", vec![Cell::from(7), Cell::from(9)]),
            ("goals", vec![Cell::from(1.5), Cell::from(2.5)]),
        ])
        .unwrap();
        let found = table.find_entity("team_id", 9).unwrap();
        assert_eq!(found.number("goals"), Some(2.5));
        assert!(table.find_entity("team_id", 3).is_none());
    }
}
