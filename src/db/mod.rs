mod clean;
mod dump;
mod restore;

pub use clean::DumpCleaner;
pub use dump::PgDump;
pub use restore::PgRestore;
