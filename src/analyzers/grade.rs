use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade bands, ordered from best to worst.
///
/// | Average     | Grade |
/// |-------------|-------|
/// | >= 90       | A     |
/// | >= 75       | B     |
/// | >= 60       | C     |
/// | < 60        | F     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    F,
}

impl Grade {
    #[cfg(test)]
    pub const ALL: [Grade; 4] = [Grade::A, Grade::B, Grade::C, Grade::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Converts a (rounded) average score into a letter grade.
pub fn grade(average: f64) -> Grade {
    match average {
        a if a >= 90.0 => Grade::A,
        a if a >= 75.0 => Grade::B,
        a if a >= 60.0 => Grade::C,
        _ => Grade::F,
    }
}
