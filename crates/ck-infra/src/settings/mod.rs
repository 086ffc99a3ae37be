//! Settings persistence adapters.

mod file_repo;

pub use file_repo::FileSettingsRepository;
