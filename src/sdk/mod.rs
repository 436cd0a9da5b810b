/// Entry points for callers that want a ready-to-use persisted store.
pub mod open;

pub use open::{data_dir_from_env, open, DATA_DIR_ENV};
