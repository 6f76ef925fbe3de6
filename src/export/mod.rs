//! Ledger export and import: JSON backup documents and CSV reports

pub mod backup;
pub mod csv;

pub use backup::{
    export_json, import_json, load, parse_backup, save, BackupDocument, FORMAT_VERSION,
};
pub use self::csv::{export_partial_sales_csv, export_performance_csv, export_trades_csv};
