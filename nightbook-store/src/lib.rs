//! nightbook-store: key-value persistence, the record ledger, and CSV night import

pub mod csv_import;
pub mod error;
pub mod kv;
pub mod ledger;

pub use csv_import::{parse_nights_csv, parse_nights_reader};
pub use error::{Result, StoreError};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use ledger::{BillPatch, EntryPatch, Ledger, SettingsPatch};
