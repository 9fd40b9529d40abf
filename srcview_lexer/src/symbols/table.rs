//! Import tables and namespace-relative name resolution

use crate::config::compile_time::lexical::MAX_IMPORT_ENTRIES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which import table a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Classes, interfaces, traits, enums and namespaces
    Class,
    Function,
    Constant,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
            SymbolKind::Constant => "constant",
        }
    }

    /// Class and function names are case-insensitive; constants are not.
    fn key(&self, short_name: &str) -> String {
        match self {
            SymbolKind::Constant => short_name.to_string(),
            _ => short_name.to_lowercase(),
        }
    }
}

/// Result of adding an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Added,
    /// Same short name imported again; the newer target wins
    Replaced(String),
    /// Entry limit reached, import ignored
    LimitReached,
}

/// Active namespace plus the three short-name -> full-name import tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportTables {
    namespace: Option<String>,
    classes: BTreeMap<String, String>,
    functions: BTreeMap<String, String>,
    constants: BTreeMap<String, String>,
}

impl ImportTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a new namespace, discarding every import of the previous one.
    /// An empty name selects the global namespace.
    pub fn flush(&mut self, namespace: &str) {
        self.classes.clear();
        self.functions.clear();
        self.constants.clear();

        let namespace = namespace.trim_start_matches('\\');
        self.namespace = (!namespace.is_empty()).then(|| namespace.to_string());
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.functions.len() + self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, kind: SymbolKind) -> &BTreeMap<String, String> {
        match kind {
            SymbolKind::Class => &self.classes,
            SymbolKind::Function => &self.functions,
            SymbolKind::Constant => &self.constants,
        }
    }

    fn table_mut(&mut self, kind: SymbolKind) -> &mut BTreeMap<String, String> {
        match kind {
            SymbolKind::Class => &mut self.classes,
            SymbolKind::Function => &mut self.functions,
            SymbolKind::Constant => &mut self.constants,
        }
    }

    /// Register `name` under its alias, or under its last segment.
    pub fn add_import(&mut self, kind: SymbolKind, name: &str, alias: Option<&str>) -> ImportOutcome {
        let short_name = alias.unwrap_or_else(|| last_segment(name));
        let key = kind.key(short_name);

        if !self.table(kind).contains_key(&key) && self.len() >= MAX_IMPORT_ENTRIES {
            return ImportOutcome::LimitReached;
        }

        match self.table_mut(kind).insert(key, name.to_string()) {
            Some(previous) => ImportOutcome::Replaced(previous),
            None => ImportOutcome::Added,
        }
    }

    /// Imported target for a short name, without its leading separator.
    pub fn lookup(&self, kind: SymbolKind, short_name: &str) -> Option<&str> {
        self.table(kind)
            .get(&kind.key(short_name))
            .map(|target| target.trim_start_matches('\\'))
    }

    pub fn entries(&self, kind: SymbolKind) -> impl Iterator<Item = (&str, &str)> {
        self.table(kind).iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn in_namespace(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}\\{}", namespace, name),
            None => name.to_string(),
        }
    }

    /// Fully-qualified form of `name` as seen from the active namespace.
    ///
    /// Unqualified function and constant names are resolved against the
    /// active namespace only; there is no fallback to the global namespace.
    pub fn resolve(&self, name: &str, kind: SymbolKind) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }

        match name.split_once('\\') {
            Some((first, rest)) if first.eq_ignore_ascii_case("namespace") => {
                self.in_namespace(rest)
            }
            None if name.eq_ignore_ascii_case("namespace") => {
                self.namespace.clone().unwrap_or_default()
            }
            // The first segment of a qualified name is always a namespace or class alias.
            Some((first, rest)) => match self.lookup(SymbolKind::Class, first) {
                Some(target) => format!("{}\\{}", target, rest),
                None => self.in_namespace(name),
            },
            None => match self.lookup(kind, name) {
                Some(target) => target.to_string(),
                None => self.in_namespace(name),
            },
        }
    }
}

/// Last `\`-separated segment of a name
pub fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn models_namespace() -> ImportTables {
        let mut tables = ImportTables::new();
        tables.flush("App\\Models");
        tables.add_import(SymbolKind::Class, "App\\Auth\\User", None);
        tables
    }

    #[test]
    fn test_resolution_rules() {
        let tables = models_namespace();

        assert_eq!(tables.resolve("User", SymbolKind::Class), "App\\Auth\\User");
        assert_eq!(tables.resolve("\\Other\\Thing", SymbolKind::Class), "Other\\Thing");
        assert_eq!(tables.resolve("Order", SymbolKind::Class), "App\\Models\\Order");
        assert_eq!(
            tables.resolve("namespace\\Sub\\Item", SymbolKind::Class),
            "App\\Models\\Sub\\Item"
        );
    }

    #[test]
    fn test_qualified_name_through_alias() {
        let mut tables = models_namespace();
        tables.add_import(SymbolKind::Class, "\\Vendor\\Lib", Some("L"));

        assert_eq!(tables.resolve("L\\Client", SymbolKind::Class), "Vendor\\Lib\\Client");
        assert_eq!(tables.resolve("Unknown\\Client", SymbolKind::Class), "App\\Models\\Unknown\\Client");
    }

    #[test]
    fn test_qualified_prefix_uses_class_imports_for_every_kind() {
        let mut tables = models_namespace();
        tables.add_import(SymbolKind::Function, "Lib\\Tools", None);

        assert_eq!(
            tables.resolve("Tools\\run", SymbolKind::Function),
            "App\\Models\\Tools\\run"
        );

        tables.add_import(SymbolKind::Class, "Lib\\Tools", None);
        assert_eq!(tables.resolve("Tools\\run", SymbolKind::Function), "Lib\\Tools\\run");
    }

    #[test]
    fn test_bare_namespace_keyword() {
        let tables = models_namespace();
        assert_eq!(tables.resolve("namespace", SymbolKind::Class), "App\\Models");
        assert_eq!(ImportTables::new().resolve("NAMESPACE", SymbolKind::Class), "");
    }

    #[test]
    fn test_case_sensitivity_per_kind() {
        let mut tables = ImportTables::new();
        tables.add_import(SymbolKind::Function, "Lib\\helper", None);
        tables.add_import(SymbolKind::Constant, "Lib\\MAX", None);

        assert_eq!(tables.resolve("HELPER", SymbolKind::Function), "Lib\\helper");
        assert_eq!(tables.resolve("MAX", SymbolKind::Constant), "Lib\\MAX");
        assert_eq!(tables.resolve("max", SymbolKind::Constant), "max");
    }

    #[test]
    fn test_flush_clears_imports() {
        let mut tables = models_namespace();
        assert_eq!(tables.len(), 1);

        tables.flush("");
        assert!(tables.is_empty());
        assert_eq!(tables.namespace(), None);
        assert_eq!(tables.resolve("User", SymbolKind::Class), "User");
    }

    #[test]
    fn test_reimport_replaces() {
        let mut tables = models_namespace();
        assert_matches!(
            tables.add_import(SymbolKind::Class, "Other\\User", None),
            ImportOutcome::Replaced(previous) if previous == "App\\Auth\\User"
        );
        assert_eq!(tables.lookup(SymbolKind::Class, "user"), Some("Other\\User"));
    }
}
