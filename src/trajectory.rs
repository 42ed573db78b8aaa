/*
 * File: /src/trajectory.rs
 * Created Date: Tuesday, October 13th 2026
 * Author: Zihan
 * -----
 * Last Modified: Friday, 16th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-13		Zihan	Tab-separated trajectory tables
 */

//! Tab-separated trajectory tables.
//!
//! One row per trajectory. Ground-truth files carry at least an `ID` column and
//! a label column (`func`); series columns (`X`, `Y`) hold comma-separated
//! numbers. Clustering outputs are the same table with a `cluster` column
//! appended.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no `{0}` column")]
    MissingColumn(String),
    #[error("row {row}: `{value}` is not a number")]
    NotNumeric { row: usize, value: String },
    #[error("row {row} has {found} values, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("column `{column}` has {found} values for {rows} rows")]
    ColumnLength {
        column: String,
        rows: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TrajectoryTable {
    pub fn read_path(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or_default())
                .collect(),
        )
    }

    /// Append `name`, or overwrite it when already present.
    pub fn with_column(mut self, name: &str, values: Vec<String>) -> Result<Self, TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_string(),
                rows: self.rows.len(),
                found: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(self)
    }

    /// Parse a comma-separated series column into a row-per-trajectory matrix.
    ///
    /// Every trajectory must have the same number of points.
    pub fn numeric_series(&self, name: &str) -> Result<Array2<f64>, TableError> {
        let column = self
            .column(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;

        let mut width = None;
        let mut values = Vec::new();
        for (row, cell) in column.iter().enumerate() {
            let mut found = 0;
            for part in cell.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let v = part.parse::<f64>().map_err(|_| TableError::NotNumeric {
                    row,
                    value: part.to_string(),
                })?;
                values.push(v);
                found += 1;
            }
            match width {
                None => width = Some(found),
                Some(expected) if expected != found => {
                    return Err(TableError::Ragged {
                        row,
                        expected,
                        found,
                    })
                }
                _ => {}
            }
        }

        let shape = (column.len(), width.unwrap_or(0));
        Ok(Array2::from_shape_vec(shape, values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?)
    }

    pub fn write_path(&self, path: &Path) -> Result<(), TableError> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
