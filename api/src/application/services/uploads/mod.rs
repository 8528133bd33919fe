// Profile image ingestion: gate -> storage fallback -> record update.
pub mod profile_record_updater;
pub mod storage_fallback;
pub mod temp_file_gate;
