// i18n - namespaced string catalog
//
// Components register their string tables under a namespace at mount time.
// Views never see the catalog itself; they receive a Translator closure
// scoped to one namespace (the i18n factory pattern). Missing keys fall back
// to the key so a gap in a table never blanks out a control.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Key -> display string lookup scoped to one namespace
pub type Translator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Namespaced string catalog
#[derive(Debug, Default)]
pub struct Catalog {
    namespaces: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog seeded with user overrides (from config `[strings.<ns>]`)
    ///
    /// Overrides win over strings registered later by components.
    pub fn with_overrides(overrides: &BTreeMap<String, BTreeMap<String, String>>) -> Self {
        let namespaces = overrides
            .iter()
            .map(|(ns, strings)| {
                let table = strings
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (ns.clone(), table)
            })
            .collect();
        Self {
            namespaces: RwLock::new(namespaces),
        }
    }

    /// Register a component's strings under `namespace`
    ///
    /// Keys already present (overrides, earlier registrations) are kept.
    pub fn register(&self, namespace: &str, strings: &[(&str, &str)]) {
        let mut namespaces = self.namespaces.write().unwrap_or_else(|e| e.into_inner());
        let table = namespaces.entry(namespace.to_string()).or_default();
        for (key, text) in strings {
            table
                .entry((*key).to_string())
                .or_insert_with(|| (*text).to_string());
        }
        tracing::trace!(namespace, keys = table.len(), "strings registered");
    }

    /// Look up a single string
    pub fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        self.namespaces
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(namespace)
            .and_then(|table| table.get(key))
            .cloned()
    }

    /// i18n factory: a lookup function bound to `namespace`
    pub fn translator(self: &Arc<Self>, namespace: &str) -> Translator {
        let catalog = Arc::clone(self);
        let namespace = namespace.to_string();
        Arc::new(move |key: &str| match catalog.lookup(&namespace, key) {
            Some(text) => text,
            None => {
                tracing::debug!(namespace = %namespace, key, "missing string, using key");
                key.to_string()
            }
        })
    }
}
