use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::{debug, info};

use crate::engine::{seed, Persistence};
use crate::model::{self, Collection, Dataset, Entity, Fields, Record};
use crate::stats::Stats;
use crate::{RecordReader, RecordWriter, Result, STORAGE_KEY};

/// In-memory store for the four collections.
///
/// Every mutation is applied to a copy of the data set, written to the slot,
/// and only then swapped in, so a failed write leaves the store unchanged.
pub struct RecordStore {
    data: RwLock<Dataset>,
    persistence: Option<Arc<Persistence>>,
}

impl RecordStore {
    pub fn new(initial_data: Dataset, persistence: Option<Arc<Persistence>>) -> Self {
        Self {
            data: RwLock::new(initial_data),
            persistence,
        }
    }

    /// Opens the store from the slot, falling back to the seed data set when
    /// the slot is empty or unreadable.
    pub fn open(persistence: Arc<Persistence>) -> Self {
        let initial_data = match persistence.load(STORAGE_KEY) {
            Some(data) => data,
            None => {
                info!("No usable stored data, starting from seed data");
                seed::initial_data()
            }
        };
        Self::new(initial_data, Some(persistence))
    }

    /// A store holding the seed data set and no slot.
    pub fn in_memory() -> Self {
        Self::new(seed::initial_data(), None)
    }

    fn read(&self) -> RwLockReadGuard<'_, Dataset> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Dataset) -> Result<T>) -> Result<T> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = data.clone();
        let out = op(&mut next)?;
        self.persist(&next)?;
        *data = next;
        Ok(out)
    }

    fn persist(&self, data: &Dataset) -> Result<()> {
        if let Some(p) = &self.persistence {
            p.save(STORAGE_KEY, data)?;
        }
        Ok(())
    }

    /// Replaces the whole state with the seed data set.
    pub fn reset(&self) -> Result<()> {
        self.mutate(|data| {
            *data = seed::initial_data();
            Ok(())
        })?;
        info!("Store reset to seed data");
        Ok(())
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.read())
    }

    /// Records of `collection` with any field containing `query`, ignoring case.
    pub fn search(&self, collection: Collection, query: &str) -> Vec<Record> {
        self.read()
            .records(collection)
            .into_iter()
            .filter(|r| r.matches(query))
            .collect()
    }

    /// A copy of the full data set.
    pub fn snapshot(&self) -> Dataset {
        self.read().clone()
    }

    /// Creates a record from a typed entity. The entity's own id is ignored.
    pub fn insert<E: Entity>(&self, entity: &E) -> Result<u64> {
        self.create(E::COLLECTION, model::to_fields(entity)?)
    }

    pub fn get_as<E: Entity>(&self, id: u64) -> Option<E> {
        self.get(E::COLLECTION, id).and_then(E::from_record)
    }

    pub fn list_as<E: Entity>(&self) -> Vec<E> {
        self.list(E::COLLECTION)
            .into_iter()
            .filter_map(E::from_record)
            .collect()
    }
}

impl RecordReader for RecordStore {
    fn get(&self, collection: Collection, id: u64) -> Option<Record> {
        self.read().find(collection, id)
    }

    fn list(&self, collection: Collection) -> Vec<Record> {
        self.read().records(collection)
    }
}

impl RecordWriter for RecordStore {
    fn create(&self, collection: Collection, fields: Fields) -> Result<u64> {
        let id = self.mutate(|data| data.insert(collection, fields))?;
        debug!("Created {} record {}", collection, id);
        Ok(id)
    }

    fn update(&self, collection: Collection, id: u64, patch: Fields) -> Result<()> {
        let found = self.mutate(|data| data.merge(collection, id, patch))?;
        debug!("Updated {} record {} (found: {})", collection, id, found);
        Ok(())
    }

    fn delete(&self, collection: Collection, id: u64) -> Result<()> {
        let found = self.mutate(|data| Ok(data.remove(collection, id)))?;
        debug!("Deleted {} record {} (found: {})", collection, id, found);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DepartmentDraft, Student, Teacher, TeacherStatus};
    use crate::Error;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn empty_store() -> RecordStore {
        RecordStore::new(Dataset::default(), None)
    }

    #[test]
    fn test_create_ids_strictly_increase() {
        let store = RecordStore::in_memory();
        store.delete(Collection::Teachers, 2).unwrap();
        let mut last = 4;
        for i in 0..5 {
            let teacher = json!({"name": format!("T{}", i), "email": "t@x"});
            let id = store.create(Collection::Teachers, fields(teacher)).unwrap();
            assert_eq!(id, last + 1);
            last = id;
        }
    }

    #[test]
    fn test_get_and_list() {
        let store = empty_store();
        assert!(store.get(Collection::Students, 1).is_none());

        store.create(Collection::Students, fields(json!({"name": "A", "email": "a@x"}))).unwrap();
        store.create(Collection::Students, fields(json!({"name": "B", "email": "b@x"}))).unwrap();

        let names: Vec<String> = store.list_as::<Student>().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(matches!(
            store.get(Collection::Students, 2),
            Some(Record::Student(s)) if s.name == "B"
        ));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let store = RecordStore::in_memory();
        let before = store.snapshot();
        store.update(Collection::Students, 999, fields(json!({"name": "X"}))).unwrap();
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_update_merges_fields() {
        let store = RecordStore::in_memory();
        store
            .update(Collection::Teachers, 1, fields(json!({"status": "Inactive"})))
            .unwrap();
        let t: Teacher = store.get_as(1).unwrap();
        assert_eq!(t.status, TeacherStatus::Inactive);
        assert_eq!(t.username, "robert_k");
    }

    #[test]
    fn test_delete_then_get() {
        let store = RecordStore::in_memory();
        let len = store.list(Collection::Subjects).len();

        store.delete(Collection::Subjects, 3).unwrap();
        assert!(store.get(Collection::Subjects, 3).is_none());
        assert_eq!(store.list(Collection::Subjects).len(), len - 1);

        store.delete(Collection::Subjects, 3).unwrap();
        assert_eq!(store.list(Collection::Subjects).len(), len - 1);
    }

    #[test]
    fn test_delete_has_no_cascade() {
        let store = RecordStore::in_memory();
        store.delete(Collection::Departments, 1).unwrap();
        assert!(store.search(Collection::Subjects, "mern1dec25").len() == 1);
    }

    #[test]
    fn test_invalid_create_leaves_state() {
        let store = RecordStore::in_memory();
        let before = store.snapshot();
        let res = store.create(Collection::Subjects, fields(json!({"name": "No code"})));
        assert!(matches!(res, Err(Error::InvalidRecord(_))));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_insert_typed_department_draft() {
        let store = empty_store();
        let draft = DepartmentDraft::new("MEAN Batch", "2026-03-01");
        let id = store.create(Collection::Departments, draft.create_fields()).unwrap();
        let dept: crate::model::Department = store.get_as(id).unwrap();
        assert_eq!(dept.code, "0103_MEAN");
        assert_eq!(dept.start_date.as_deref(), Some("2026-03-01"));

        let draft = DepartmentDraft::new("JAVA Batch", "2026-03-01");
        store.update(Collection::Departments, id, draft.fields()).unwrap();
        let dept: crate::model::Department = store.get_as(id).unwrap();
        assert_eq!(dept.code, "0103_JAVA");
        assert_eq!(dept.students, 0);
    }

    #[test]
    fn test_search() {
        let store = RecordStore::in_memory();
        let hits = store.search(Collection::Teachers, "DR.");
        assert_eq!(hits.len(), 2);
        assert_eq!(store.search(Collection::Teachers, "").len(), 4);
        assert!(store.search(Collection::Teachers, "nobody").is_empty());
    }

    #[test]
    fn test_reset_restores_seed() {
        let store = empty_store();
        store.reset().unwrap();
        assert_eq!(store.snapshot(), seed::initial_data());
    }

    #[test]
    fn test_every_mutation_persists() {
        let dir = tempdir().unwrap();
        let persistence = Arc::new(Persistence::new(dir.path()).unwrap());
        let store = RecordStore::open(persistence.clone());

        let id = store
            .insert(&Student {
                id: 0,
                name: "Ann".to_string(),
                email: "ann@x".to_string(),
                department: "MERN".to_string(),
                roll_number: "MERN2024003".to_string(),
            })
            .unwrap();
        assert_eq!(persistence.load(STORAGE_KEY).unwrap(), store.snapshot());

        store.update(Collection::Students, id, fields(json!({"name": "Anne"}))).unwrap();
        assert_eq!(persistence.load(STORAGE_KEY).unwrap(), store.snapshot());

        store.delete(Collection::Students, id).unwrap();
        assert_eq!(persistence.load(STORAGE_KEY).unwrap(), store.snapshot());
    }

    #[test]
    fn test_open_falls_back_to_seed_on_corrupt_slot() {
        let dir = tempdir().unwrap();
        let persistence = Arc::new(Persistence::new(dir.path()).unwrap());
        persistence.write(STORAGE_KEY, b"not json").unwrap();

        let store = RecordStore::open(persistence);
        assert_eq!(store.snapshot(), seed::initial_data());
    }

    #[test]
    fn test_open_falls_back_to_seed_on_duplicate_ids() {
        let dir = tempdir().unwrap();
        let persistence = Arc::new(Persistence::new(dir.path()).unwrap());
        let slot = json!({
            "departments": [],
            "subjects": [],
            "teachers": [],
            "students": [
                {"id": 0, "name": "Z", "email": "z@x"},
                {"id": 1, "name": "A", "email": "a@x"},
                {"id": 1, "name": "B", "email": "b@x"}
            ]
        });
        persistence.write(STORAGE_KEY, slot.to_string().as_bytes()).unwrap();

        let store = RecordStore::open(persistence);
        assert_eq!(store.snapshot(), seed::initial_data());
    }

    #[test]
    fn test_create_after_max_id_fails_cleanly() {
        let mut data = Dataset::default();
        data.students.push(Student {
            id: u64::MAX,
            name: "Last".to_string(),
            email: "last@x".to_string(),
            department: String::new(),
            roll_number: String::new(),
        });
        let store = RecordStore::new(data, None);
        let before = store.snapshot();

        let res = store.create(Collection::Students, fields(json!({"name": "A", "email": "a@x"})));
        assert!(matches!(res, Err(Error::IdOverflow(Collection::Students))));
        assert_eq!(store.snapshot(), before);
    }
}
