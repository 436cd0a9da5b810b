//! The fixed data set used on first start, after `reset`, and whenever the
//! persisted slot cannot be read.

use crate::model::{
    Dataset, Department, Quarter, Student, Subject, SubjectType, Teacher, TeacherStatus,
    CURRENT_VERSION,
};

fn department(id: u64, name: &str, code: &str, students: u32) -> Department {
    Department {
        id,
        name: name.to_string(),
        code: code.to_string(),
        students,
        start_date: None,
    }
}

fn subject(
    id: u64,
    name: &str,
    code: &str,
    kind: SubjectType,
    quarter: Quarter,
    credits: u32,
) -> Subject {
    Subject {
        id,
        name: name.to_string(),
        code: code.to_string(),
        kind,
        quarter,
        department: code.to_string(),
        credits,
    }
}

fn student(id: u64, name: &str, email: &str, department: &str, roll_number: &str) -> Student {
    Student {
        id,
        name: name.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        roll_number: roll_number.to_string(),
    }
}

fn teacher(id: u64, name: &str, email: &str, department: &str, username: &str) -> Teacher {
    Teacher {
        id,
        name: name.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        username: username.to_string(),
        status: TeacherStatus::Active,
    }
}

pub fn initial_data() -> Dataset {
    use Quarter::*;
    use SubjectType::*;

    Dataset {
        version: CURRENT_VERSION,
        departments: vec![
            department(1, "MERN DEC BATCH 01", "mern1dec25", 45),
            department(2, "MERN JAN BATCH 02", "mern2jan26", 32),
            department(3, "MEAN FEB BATCH 01", "mean1feb26", 28),
            department(4, "JAVA FS MAR BATCH 01", "java1mar26", 15),
            department(5, "SDET APR BATCH 01", "sdet1apr26", 20),
        ],
        subjects: vec![
            subject(1, "MERN DEC BATCH 01", "mern1dec25", Practical, Q1, 1),
            subject(2, "MERN JAN BATCH 02", "mern2jan26", Theory, Q1, 2),
            subject(3, "MEAN FEB BATCH 01", "mean1feb26", Practical, Q2, 1),
            subject(4, "JAVA FS MAR BATCH 01", "java1mar26", Theory, Q1, 3),
            subject(5, "SDET APR BATCH 01", "sdet1apr26", Practical, Q2, 2),
        ],
        students: vec![
            student(1, "John Doe", "john@example.com", "MERN", "MERN2024001"),
            student(2, "Jane Smith", "jane@example.com", "MEAN", "MEAN2024001"),
            student(3, "Mike Johnson", "mike@example.com", "JAVA_FS", "JAVA2024001"),
            student(4, "Sarah Wilson", "sarah@example.com", "SDET_JAVA", "SDET2024001"),
            student(5, "Chris Brown", "chris@example.com", "MERN", "MERN2024002"),
        ],
        teachers: vec![
            teacher(1, "Prof. Robert Kumar", "robert@college.edu", "MERN", "robert_k"),
            teacher(2, "Dr. Emily Chen", "emily@college.edu", "MEAN", "emily_c"),
            teacher(3, "Prof. David Lee", "david@college.edu", "JAVA_FS", "david_l"),
            teacher(4, "Dr. Lisa Patel", "lisa@college.edu", "SDET_JAVA", "lisa_p"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Collection;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique_and_positive() {
        let data = initial_data();
        for c in Collection::ALL {
            let ids: HashSet<u64> = data.records(c).iter().map(|r| r.id()).collect();
            assert_eq!(ids.len(), data.len(c));
            assert!(!ids.contains(&0));
        }
    }

    #[test]
    fn test_seed_subjects_reference_department_codes() {
        let data = initial_data();
        for s in &data.subjects {
            assert!(data.departments.iter().any(|d| d.code == s.department));
        }
    }
}
