// Process monitoring module

mod process;

pub use process::{parse_listing, ProcessRecord, ProcessSource, PsLister, TARGET_PROCESS_SUFFIX};
