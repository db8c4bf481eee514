pub mod media_records;
