//! Required-column check and typed row binding.

use crate::analyzers::types::StudentScores;
use crate::dataset::{Cell, Dataset};
use crate::error::{LoadError, ValidationError};

pub const NAME: &str = "Name";
pub const MATH: &str = "Math";
pub const SCIENCE: &str = "Science";
pub const ENGLISH: &str = "English";

pub const REQUIRED_COLUMNS: [&str; 4] = [NAME, MATH, SCIENCE, ENGLISH];

/// Column positions of the required fields within a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    name: usize,
    math: usize,
    science: usize,
    english: usize,
}

impl Schema {
    /// Resolves every required column, or reports all the missing ones.
    pub fn resolve(dataset: &Dataset) -> Result<Self, ValidationError> {
        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|col| dataset.column_index(col).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        let index = |col: &str| dataset.column_index(col).unwrap_or_default();
        Ok(Self {
            name: index(NAME),
            math: index(MATH),
            science: index(SCIENCE),
            english: index(ENGLISH),
        })
    }

    /// Binds one data row. `row` is 1-based and used only for error messages.
    pub fn bind(&self, row: usize, cells: &[Cell]) -> Result<StudentScores, LoadError> {
        let name = match cells.get(self.name) {
            Some(Cell::Text(s)) => s.clone(),
            Some(Cell::Number(n)) => n.to_string(),
            Some(Cell::Empty) | None => return Err(LoadError::MissingName { row }),
        };

        let score = |column: &'static str, idx: usize| -> Result<f64, LoadError> {
            let cell = cells.get(idx).unwrap_or(&Cell::Empty);
            cell.as_score().ok_or_else(|| LoadError::InvalidScore {
                row,
                column,
                value: cell.to_string(),
            })
        };

        Ok(StudentScores {
            math: score(MATH, self.math)?,
            science: score(SCIENCE, self.science)?,
            english: score(ENGLISH, self.english)?,
            name,
        })
    }
}
