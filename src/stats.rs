use serde::Serialize;

use crate::model::{Collection, Dataset};

/// Dashboard totals, recomputed from the data set on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_departments: usize,
    pub total_subjects: usize,
    pub total_teachers: usize,
    pub total_students: usize,
}

impl Stats {
    pub fn of(data: &Dataset) -> Self {
        Self {
            total_departments: data.len(Collection::Departments),
            total_subjects: data.len(Collection::Subjects),
            total_teachers: data.len(Collection::Teachers),
            total_students: data.len(Collection::Students),
        }
    }

    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Departments => self.total_departments,
            Collection::Subjects => self.total_subjects,
            Collection::Students => self.total_students,
            Collection::Teachers => self.total_teachers,
        }
    }
}
