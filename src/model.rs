//! Typed records for the four collections and the data set that holds them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codes;
use crate::{Error, Result};

/// A loose bag of named field values, as supplied by callers for creates and patches.
pub type Fields = serde_json::Map<String, Value>;

/// Version written into every persisted data set.
pub const CURRENT_VERSION: u32 = 1;

/// One of the four fixed collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Departments,
    Subjects,
    Students,
    Teachers,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Departments,
        Collection::Subjects,
        Collection::Students,
        Collection::Teachers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Departments => "departments",
            Collection::Subjects => "subjects",
            Collection::Students => "students",
            Collection::Teachers => "teachers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::UnknownCollection(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectType {
    Theory,
    Practical,
    Online,
    Classroom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TeacherStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    /// Enrolled student count as entered by staff; not derived from `students`.
    #[serde(default)]
    pub students: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: SubjectType,
    pub quarter: Quarter,
    /// Department code. Not checked against the departments collection.
    pub department: String,
    pub credits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub roll_number: String,
}

/// A teacher account. Passwords are accepted by the console form but never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub status: TeacherStatus,
}

/// A record of any collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Department(Department),
    Subject(Subject),
    Student(Student),
    Teacher(Teacher),
}

impl Record {
    pub fn id(&self) -> u64 {
        match self {
            Record::Department(r) => r.id,
            Record::Subject(r) => r.id,
            Record::Student(r) => r.id,
            Record::Teacher(r) => r.id,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Record::Department(_) => Collection::Departments,
            Record::Subject(_) => Collection::Subjects,
            Record::Student(_) => Collection::Students,
            Record::Teacher(_) => Collection::Teachers,
        }
    }

    /// Returns true when any field other than the id contains `needle`,
    /// ignoring case. An empty needle matches every record.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let Ok(Value::Object(fields)) = serde_json::to_value(self) else {
            return false;
        };
        fields
            .iter()
            .filter(|(k, _)| k.as_str() != "id")
            .any(|(_, v)| {
                let text = match v {
                    Value::String(s) => s.to_lowercase(),
                    Value::Null => return false,
                    other => other.to_string().to_lowercase(),
                };
                text.contains(&needle)
            })
    }
}

/// A concrete record type stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> u64;
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! entity {
    ($ty:ident, $variant:ident, $collection:ident) => {
        impl Entity for $ty {
            const COLLECTION: Collection = Collection::$collection;

            fn id(&self) -> u64 {
                self.id
            }

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$variant(r) => Some(r),
                    _ => None,
                }
            }
        }
    };
}

entity!(Department, Department, Departments);
entity!(Subject, Subject, Subjects);
entity!(Student, Student, Students);
entity!(Teacher, Teacher, Teachers);

/// The complete persisted state: four collections plus a schema version.
///
/// A missing `version` reads as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub version: u32,
    pub departments: Vec<Department>,
    pub subjects: Vec<Subject>,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            departments: Vec::new(),
            subjects: Vec::new(),
            students: Vec::new(),
            teachers: Vec::new(),
        }
    }
}

// Expands `$body` once per collection with `$items` bound to that collection's vector.
macro_rules! each_collection {
    ($collection:expr, mut $data:ident, |$items:ident| $body:expr) => {
        match $collection {
            Collection::Departments => { let $items = &mut $data.departments; $body }
            Collection::Subjects => { let $items = &mut $data.subjects; $body }
            Collection::Students => { let $items = &mut $data.students; $body }
            Collection::Teachers => { let $items = &mut $data.teachers; $body }
        }
    };
    ($collection:expr, $data:ident, |$items:ident| $body:expr) => {
        match $collection {
            Collection::Departments => { let $items = &$data.departments; $body }
            Collection::Subjects => { let $items = &$data.subjects; $body }
            Collection::Students => { let $items = &$data.students; $body }
            Collection::Teachers => { let $items = &$data.teachers; $body }
        }
    };
}

impl Dataset {
    pub fn len(&self, collection: Collection) -> usize {
        each_collection!(collection, self, |items| items.len())
    }

    pub fn records(&self, collection: Collection) -> Vec<Record> {
        each_collection!(collection, self, |items| {
            items.iter().cloned().map(Entity::into_record).collect()
        })
    }

    pub fn find(&self, collection: Collection, id: u64) -> Option<Record> {
        each_collection!(collection, self, |items| {
            items.iter().find(|r| r.id() == id).cloned().map(Entity::into_record)
        })
    }

    /// `max(existing ids, 0) + 1`, or `IdOverflow` once the maximum is `u64::MAX`.
    pub fn next_id(&self, collection: Collection) -> Result<u64> {
        each_collection!(collection, self, |items| next_id(items))
    }

    /// Checks that every id is non-zero and unique within its collection.
    pub fn validate_ids(&self) -> Result<()> {
        for collection in Collection::ALL {
            let checked: Result<()> =
                each_collection!(collection, self, |items| validate_ids(items));
            checked?;
        }
        Ok(())
    }

    /// Appends a record built from `fields` and returns its id.
    pub fn insert(&mut self, collection: Collection, fields: Fields) -> Result<u64> {
        let id = self.next_id(collection)?;
        each_collection!(collection, mut self, |items| {
            items.push(build(fields, id)?);
        });
        Ok(id)
    }

    /// Merges `patch` into the record with `id`. Returns false when no record matches.
    pub fn merge(&mut self, collection: Collection, id: u64, patch: Fields) -> Result<bool> {
        each_collection!(collection, mut self, |items| merge(items, id, patch))
    }

    /// Removes the record with `id`. Returns false when no record matches.
    pub fn remove(&mut self, collection: Collection, id: u64) -> bool {
        each_collection!(collection, mut self, |items| {
            let before = items.len();
            items.retain(|r| r.id() != id);
            items.len() != before
        })
    }
}

fn next_id<E: Entity>(items: &[E]) -> Result<u64> {
    items
        .iter()
        .map(Entity::id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(Error::IdOverflow(E::COLLECTION))
}

fn validate_ids<E: Entity>(items: &[E]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for id in items.iter().map(Entity::id) {
        if id == 0 {
            return Err(Error::InvalidRecord(format!("{}: id 0", E::COLLECTION)));
        }
        if !seen.insert(id) {
            return Err(Error::InvalidRecord(format!("{}: duplicate id {}", E::COLLECTION, id)));
        }
    }
    Ok(())
}

fn invalid<E: Entity>(err: serde_json::Error) -> Error {
    Error::InvalidRecord(format!("{}: {}", E::COLLECTION, err))
}

fn build<E: Entity>(mut fields: Fields, id: u64) -> Result<E> {
    fields.insert("id".to_string(), Value::from(id));
    serde_json::from_value(Value::Object(fields)).map_err(invalid::<E>)
}

fn merge<E: Entity>(items: &mut [E], id: u64, patch: Fields) -> Result<bool> {
    let Some(existing) = items.iter_mut().find(|r| r.id() == id) else {
        return Ok(false);
    };
    let mut merged = match serde_json::to_value(&*existing)? {
        Value::Object(map) => map,
        _ => return Err(Error::Internal("record did not serialize to an object".to_string())),
    };
    for (key, value) in patch {
        // id is immutable
        if key != "id" {
            merged.insert(key, value);
        }
    }
    *existing = serde_json::from_value(Value::Object(merged)).map_err(invalid::<E>)?;
    Ok(true)
}

/// Serializes an entity into the field bag accepted by `create`.
pub fn to_fields<E: Entity>(entity: &E) -> Result<Fields> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Internal("record did not serialize to an object".to_string())),
    }
}

/// Parses the credits text entered for a subject.
///
/// Blank text is an explicit 0. Anything else must be a non-negative integer.
pub fn parse_credits(text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| Error::InvalidCredits(text.to_string()))
}

/// The department form: a name and a start date from which the code is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentDraft {
    pub name: String,
    pub start_date: String,
}

impl DepartmentDraft {
    pub fn new(name: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_date: start_date.into(),
        }
    }

    /// Fields for an update; the code is recomputed from the current name and date.
    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::from(self.name.clone()));
        fields.insert(
            "code".to_string(),
            Value::from(codes::generate_department_code(&self.name, &self.start_date)),
        );
        fields.insert("startDate".to_string(), Value::from(self.start_date.clone()));
        fields
    }

    /// Fields for a create: new departments start with no enrolled students.
    pub fn create_fields(&self) -> Fields {
        let mut fields = self.fields();
        fields.insert("students".to_string(), Value::from(0));
        fields
    }
}
