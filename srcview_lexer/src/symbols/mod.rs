//! Import tables and namespace resolution
//!
//! Imports are registered from finished namespace-import products and scoped
//! to the active namespace; a new namespace declaration flushes them.

pub mod table;

use crate::grammar::products::NamespaceImport;
use crate::logging::codes;
use crate::{log_debug, log_warning};

pub use table::{last_segment, ImportOutcome, ImportTables, SymbolKind};

/// Register every entry of a finished import declaration.
/// Returns the number of entries accepted.
pub fn apply_import(tables: &mut ImportTables, import: &NamespaceImport) -> usize {
    let mut accepted = 0;

    for entry in &import.entries {
        match tables.add_import(entry.kind, &entry.name, entry.alias.as_deref()) {
            ImportOutcome::Added => accepted += 1,
            ImportOutcome::Replaced(previous) => {
                log_debug!("Import replaced earlier import",
                    "name" => entry.name.as_str(),
                    "previous" => previous.as_str()
                );
                accepted += 1;
            }
            ImportOutcome::LimitReached => {
                log_warning!(code = codes::scanner::IMPORT_ENTRY_LIMIT,
                    "Import ignored, import table is full",
                    "name" => entry.name.as_str(),
                    "kind" => entry.kind.as_str()
                );
            }
        }
    }

    accepted
}
