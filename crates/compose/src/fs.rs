//! Filesystem-backed collaborator implementations.
//!
//! Layout conventions:
//!
//! ```text
//! <root>/bindings/<qualified/name>.toml      — direct fragments
//! <source-root>/hiera.toml                   — hierarchical source marker
//! ```
//!
//! A `hiera.toml` names the source's precedence levels, most specific
//! first, each optionally pointing at a data file:
//!
//! ```toml
//! version = 1
//!
//! [[hierarchy]]
//! category = "node"
//! value = "name"
//! path = "data/node/{value}"
//!
//! [[hierarchy]]
//! category = "osfamily"
//! path = "data/{value}"
//! ```
//!
//! When `value` is omitted the level's value is the fact with the
//! category's name, or the empty string if that fact is unset.

use crate::categories::json_type_name;
use crate::expr::parse_expression;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use strata_core::{
    Bindings, Category, CategorySet, ComposeContext, ComposeError, Contribution,
    DiagnosticAcceptor, FragmentLoader, HieraProvider, ModuleDescriptor, ModuleIndex, Result,
};
use tracing::debug;

/// The marker file naming a hierarchical data source.
pub const MARKER_FILE: &str = "hiera.toml";

/// Loads direct fragments from `<root>/bindings/<qualified/name>.toml`.
#[derive(Debug, Default, Clone)]
pub struct FsFragmentLoader;

impl FsFragmentLoader {
    pub fn new() -> Self {
        Self
    }

    // The extension is appended, not set: name segments may contain dots
    // (version suffixes, FQDNs) that are part of the name.
    fn fragment_path(root: &Path, qualified_name: &str) -> PathBuf {
        let mut path = root.join("bindings");
        let mut parts = qualified_name.split("::").peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                path.push(part);
            } else {
                path.push(format!("{part}.toml"));
            }
        }
        path
    }
}

impl FragmentLoader for FsFragmentLoader {
    fn load(&self, root: &Path, qualified_name: &str) -> Result<Option<Bindings>> {
        let path = Self::fragment_path(root, qualified_name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value: toml::Value =
            toml::from_str(&content).map_err(|e| ComposeError::InvalidFragment {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let data = serde_json::to_value(value)?;
        Ok(Some(Bindings::new(path.display().to_string(), data)))
    }

    fn loadable(&self, root: &Path, qualified_name: &str) -> bool {
        Self::fragment_path(root, qualified_name).is_file()
    }
}

/// The on-disk shape of a `hiera.toml`.
#[derive(Debug, Deserialize)]
struct HieraConfig {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    hierarchy: Vec<HieraLevel>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct HieraLevel {
    category: String,
    /// Expression computing the level's value; defaults to the fact named
    /// after the category.
    value: Option<String>,
    /// Data file relative to the source root, without the `.toml`
    /// extension. `{value}` is replaced by the evaluated level value.
    path: Option<String>,
}

/// Resolve the marker file for a source location: the location itself when
/// it already names the marker, otherwise `<location>/hiera.toml`.
fn marker_path(resolved: &Path) -> PathBuf {
    if resolved.file_name().is_some_and(|n| n == MARKER_FILE) {
        resolved.to_path_buf()
    } else {
        resolved.join(MARKER_FILE)
    }
}

/// Loads hierarchical data sources described by `hiera.toml` files.
#[derive(Debug, Default, Clone)]
pub struct TomlHieraProvider;

impl TomlHieraProvider {
    pub fn new() -> Self {
        Self
    }

    fn level_value(level: &HieraLevel, source_id: &str, ctx: &ComposeContext) -> Result<String> {
        match &level.value {
            Some(expression) => {
                let expr = parse_expression(expression).map_err(|reason| {
                    ComposeError::HieraSource {
                        source_id: source_id.to_string(),
                        reason: format!(
                            "bad value expression for category '{}': {reason}",
                            level.category
                        ),
                    }
                })?;
                match expr.evaluate(ctx) {
                    serde_json::Value::String(s) => Ok(s),
                    other => Err(ComposeError::CategoryTypeMismatch {
                        category: level.category.clone(),
                        actual: json_type_name(&other).to_string(),
                    }),
                }
            }
            None => Ok(ctx
                .fact(&level.category)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()),
        }
    }
}

impl HieraProvider for TomlHieraProvider {
    fn loadable(&self, resolved_path: &Path) -> bool {
        marker_path(resolved_path).is_file()
    }

    fn load(
        &self,
        source_id: &str,
        resolved_path: &Path,
        ctx: &ComposeContext,
        _acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution> {
        let marker = marker_path(resolved_path);
        let content =
            std::fs::read_to_string(&marker).map_err(|e| ComposeError::HieraSource {
                source_id: source_id.to_string(),
                reason: format!("cannot read {}: {e}", marker.display()),
            })?;
        let config: HieraConfig =
            toml::from_str(&content).map_err(|e| ComposeError::HieraSource {
                source_id: source_id.to_string(),
                reason: format!("cannot parse {}: {e}", marker.display()),
            })?;
        if config.version != 1 {
            return Err(ComposeError::HieraSource {
                source_id: source_id.to_string(),
                reason: format!("unsupported hiera config version {}", config.version),
            });
        }

        let root = marker.parent().unwrap_or(resolved_path).to_path_buf();
        let mut categories = CategorySet::new();
        let mut levels = Vec::new();
        for level in &config.hierarchy {
            let value = Self::level_value(level, source_id, ctx)?;
            let category = Category::new(level.category.clone(), value);

            let data = match &level.path {
                Some(template) => {
                    let relative = template.replace("{value}", &category.value);
                    // Appended, not set_extension: values like FQDNs contain
                    // dots that belong to the file name.
                    let file = root.join(format!("{relative}.toml"));
                    match std::fs::read_to_string(&file) {
                        Ok(text) => {
                            let value: toml::Value = toml::from_str(&text).map_err(|e| {
                                ComposeError::HieraSource {
                                    source_id: source_id.to_string(),
                                    reason: format!("cannot parse {}: {e}", file.display()),
                                }
                            })?;
                            serde_json::to_value(value)?
                        }
                        // Absent data files are normal: not every level
                        // applies to every node.
                        Err(_) => serde_json::Value::Null,
                    }
                }
                None => serde_json::Value::Null,
            };

            levels.push(serde_json::json!({
                "category": category.name,
                "value": category.value,
                "data": data,
            }));
            categories.push(category);
        }

        debug!(source = source_id, levels = levels.len(), "hiera source loaded");
        let bindings = Bindings::new(
            marker.display().to_string(),
            serde_json::Value::Array(levels),
        );
        Ok(Contribution::with_categories(source_id, bindings, categories))
    }
}

/// Build a [`ModuleIndex`] from the immediate subdirectories of `dir`.
/// A missing directory yields an empty index.
pub fn discover_modules(dir: &Path) -> Result<ModuleIndex> {
    let mut index = ModuleIndex::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            debug!(dir = %dir.display(), "no module directory, index is empty");
            return Ok(index);
        }
    };
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            let name = entry.file_name().to_string_lossy().into_owned();
            index.insert(ModuleDescriptor::new(name, entry.path()));
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::DiagnosticLog;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn fragment_loader_reads_toml_under_bindings() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("bindings/acme/default.toml"),
            "port = 80\nhost = 'localhost'\n",
        );
        let loader = FsFragmentLoader::new();
        assert!(loader.loadable(dir.path(), "acme::default"));
        let bindings = loader.load(dir.path(), "acme::default").unwrap().unwrap();
        assert_eq!(bindings.data["port"], serde_json::json!(80));
        assert!(!loader.loadable(dir.path(), "acme::other"));
        assert!(loader.load(dir.path(), "acme::other").unwrap().is_none());
    }

    #[test]
    fn fragment_names_keep_their_dots() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("bindings/acme/v1.2.toml"), "port = 81\n");
        let loader = FsFragmentLoader::new();
        assert!(loader.loadable(dir.path(), "acme::v1.2"));
        let bindings = loader.load(dir.path(), "acme::v1.2").unwrap().unwrap();
        assert_eq!(bindings.data["port"], serde_json::json!(81));
    }

    #[test]
    fn unparseable_fragment_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("bindings/bad.toml"), "not [valid");
        let loader = FsFragmentLoader::new();
        assert!(loader.loadable(dir.path(), "bad"));
        let err = loader.load(dir.path(), "bad").err().unwrap();
        assert!(matches!(err, ComposeError::InvalidFragment { .. }));
    }

    #[test]
    fn hiera_provider_builds_categories_in_hierarchy_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("hiera.toml"),
            r#"
version = 1

[[hierarchy]]
category = "node"
value = "name"
path = "data/node/{value}"

[[hierarchy]]
category = "osfamily"
path = "data/{value}"
"#,
        );
        write(&dir.path().join("data/node/web01.toml"), "role = 'web'\n");
        write(&dir.path().join("data/debian.toml"), "pkg = 'apt'\n");

        let ctx = ComposeContext::new("web01", "/etc/strata")
            .with_facts(serde_json::json!({"osfamily": "Debian"}));
        let provider = TomlHieraProvider::new();
        assert!(provider.loadable(dir.path()));

        let log = DiagnosticLog::new();
        let c = provider
            .load("confdir-hiera:/hiera.toml", dir.path(), &ctx, &log)
            .unwrap();
        let cats = c.effective_categories.unwrap();
        assert_eq!(cats.index_of("node"), Some(0));
        assert_eq!(cats.index_of("osfamily"), Some(1));
        assert_eq!(cats.value_of("osfamily"), Some("debian"));
        let levels = c.bindings.data.as_array().unwrap();
        assert_eq!(levels[0]["data"]["role"], serde_json::json!("web"));
        assert_eq!(levels[1]["data"]["pkg"], serde_json::json!("apt"));
    }

    #[test]
    fn dotted_level_values_resolve_their_data_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("hiera.toml"),
            "[[hierarchy]]\ncategory = \"node\"\nvalue = \"name\"\npath = \"data/node/{value}\"\n",
        );
        write(
            &dir.path().join("data/node/web01.example.com.toml"),
            "role = 'web'\n",
        );
        let ctx = ComposeContext::new("web01.example.com", "/etc/strata");
        let provider = TomlHieraProvider::new();
        let log = DiagnosticLog::new();
        let c = provider.load("x", dir.path(), &ctx, &log).unwrap();
        assert_eq!(
            c.bindings.data[0]["data"]["role"],
            serde_json::json!("web")
        );
    }

    #[test]
    fn marker_file_path_can_be_named_directly() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("hiera.toml"), "version = 1\n");
        let provider = TomlHieraProvider::new();
        assert!(provider.loadable(&dir.path().join("hiera.toml")));
        assert!(provider.loadable(dir.path()));
        assert!(!provider.loadable(&dir.path().join("elsewhere")));
    }

    #[test]
    fn missing_data_files_are_null_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("hiera.toml"),
            "[[hierarchy]]\ncategory = \"node\"\nvalue = \"name\"\npath = \"data/{value}\"\n",
        );
        let ctx = ComposeContext::new("web01", "/etc/strata");
        let provider = TomlHieraProvider::new();
        let log = DiagnosticLog::new();
        let c = provider.load("x", dir.path(), &ctx, &log).unwrap();
        assert!(c.bindings.data[0]["data"].is_null());
    }

    #[test]
    fn bad_value_expression_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("hiera.toml"),
            "[[hierarchy]]\ncategory = \"node\"\nvalue = \"'oops\"\n",
        );
        let ctx = ComposeContext::new("web01", "/etc/strata");
        let provider = TomlHieraProvider::new();
        let log = DiagnosticLog::new();
        let err = provider.load("x", dir.path(), &ctx, &log).unwrap_err();
        assert!(matches!(err, ComposeError::HieraSource { .. }));
    }

    #[test]
    fn discover_modules_lists_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("acme")).unwrap();
        std::fs::create_dir(dir.path().join("beta")).unwrap();
        std::fs::write(dir.path().join("stray.txt"), "x").unwrap();
        let index = discover_modules(dir.path()).unwrap();
        let names: Vec<_> = index.names().collect();
        assert_eq!(names, vec!["acme", "beta"]);
    }

    #[test]
    fn discover_modules_missing_dir_is_empty() {
        let index = discover_modules(Path::new("/nonexistent/modules")).unwrap();
        assert!(index.is_empty());
    }
}
