use std::collections::BTreeMap;

use crate::schema::ToolSchema;
use crate::tools::definitions;

/// The static, ordered tool registry (§4.3). Built once; cheap to clone
/// since entries are small and immutable after construction.
pub struct Catalog {
    entries: Vec<ToolSchema>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: definitions(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.entries.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn list(&self) -> &[ToolSchema] {
        &self.entries
    }

    /// `{tools:[{name,description}], categories}` shape for `GET
    /// /api/agent/tools` (§6).
    #[must_use]
    pub fn categories(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        let mut out: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
        for entry in &self.entries {
            out.entry(entry.family.as_str()).or_default().push(entry.name);
        }
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_finds_known_tool() {
        let catalog = Catalog::new();
        assert!(catalog.get("execute_command").is_some());
        assert!(catalog.get("no_such_tool").is_none());
    }

    #[test]
    fn categories_groups_by_family() {
        let catalog = Catalog::new();
        let cats = catalog.categories();
        assert!(cats["filesystem"].contains(&"execute_command"));
        assert!(cats["docker"].contains(&"docker_manage"));
    }
}
