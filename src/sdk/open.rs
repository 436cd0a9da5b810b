use std::env;
use std::sync::Arc;

use crate::engine::{Persistence, RecordStore};
use crate::Result;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "ATTENDEASE_DATA_DIR";

/// Opens a [`RecordStore`] persisted under `data_dir`.
///
/// The directory is created when missing. Stored data that is absent or
/// cannot be read is replaced by the seed data set; only a failure to create
/// the directory is reported.
///
/// # Examples
///
/// ```no_run
/// use attendease_store::{sdk, RecordReader, Collection};
///
/// fn main() -> anyhow::Result<()> {
///     let store = sdk::open("./data")?;
///     println!("{} students", store.list(Collection::Students).len());
///     Ok(())
/// }
/// ```
pub fn open(data_dir: &str) -> Result<RecordStore> {
    let persistence = Arc::new(Persistence::new(data_dir)?);
    Ok(RecordStore::open(persistence))
}

/// Resolves the data directory: explicit value, then `ATTENDEASE_DATA_DIR`, then `data`.
pub fn data_dir_from_env(explicit: Option<String>) -> String {
    resolve_data_dir(explicit, env::var(DATA_DIR_ENV).ok())
}

fn resolve_data_dir(explicit: Option<String>, from_env: Option<String>) -> String {
    explicit
        .or_else(|| from_env.filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "data".to_string())
}
