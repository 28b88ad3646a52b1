//! Grade model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject: String,
    pub term: String,
    /// Percentage score, 0 to 100
    pub score: f64,
    /// Assigned by the grading teacher, e.g. "A-" or "B+"
    pub letter_grade: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGradeRequest {
    pub student_id: i64,
    pub subject: String,
    pub term: String,
    pub score: f64,
    pub letter_grade: String,
    pub remarks: Option<String>,
}

impl CreateGradeRequest {
    pub fn validate(&self) -> crate::utils::errors::Result<()> {
        use crate::utils::errors::SchoolDeskError;

        if !self.score.is_finite() || !(0.0..=100.0).contains(&self.score) {
            return Err(SchoolDeskError::Validation(format!(
                "Score must be between 0 and 100, got {}",
                self.score
            )));
        }
        if self.score.fract() != 0.0 {
            return Err(SchoolDeskError::Validation(format!(
                "Score must be a whole number, got {}",
                self.score
            )));
        }
        if self.subject.trim().is_empty() {
            return Err(SchoolDeskError::Validation("Subject is required".to_string()));
        }
        if self.term.trim().is_empty() {
            return Err(SchoolDeskError::Validation("Term is required".to_string()));
        }
        if self.letter_grade.trim().is_empty() {
            return Err(SchoolDeskError::Validation("Letter grade is required".to_string()));
        }
        Ok(())
    }
}

/// Selection criteria for grade listings. Every set field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeFilter {
    pub student_id: Option<i64>,
    pub term: Option<String>,
    pub subject: Option<String>,
}

impl GradeFilter {
    pub fn for_student(student_id: i64) -> Self {
        Self { student_id: Some(student_id), ..Self::default() }
    }

    pub fn with_term(mut self, term: Option<String>) -> Self {
        self.term = term;
        self
    }

    pub fn matches(&self, grade: &Grade) -> bool {
        self.student_id.map_or(true, |id| grade.student_id == id)
            && self.term.as_deref().map_or(true, |term| grade.term == term)
            && self.subject.as_deref().map_or(true, |subject| grade.subject.eq_ignore_ascii_case(subject))
    }
}
