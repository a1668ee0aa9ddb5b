#![allow(clippy::module_name_repetitions)]
//! Host-to-container path mappings and the remap rules applied to wrapped command arguments.
//!
//! Rules:
//! - Positional values are rewritten only when they name an existing host path. The value is made
//!   absolute first, then the ordered mappings are tried in turn; each replaces every occurrence
//!   of its host prefix and the first one that changes the string wins. Anything else passes
//!   through verbatim.
//! - Keyword values under a labeled set are rewritten unconditionally with the label's mapping.
//!   Under an ordered set they follow the positional rule.
//! - Keywords render as `label<sep>value`.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::errors::{Result, ShooshError};

/// Predicate deciding whether a positional value names an existing host path.
pub type ExistsOnHost = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Default predicate: ask the host filesystem.
pub fn exists_on_host(value: &str) -> bool {
    !value.is_empty() && Path::new(value).exists()
}

/// One bind mount: `host` prefix as seen on the host, `container` prefix inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathMapping {
    host: String,
    container: String,
}

impl PathMapping {
    pub fn new(host: impl Into<String>, container: impl Into<String>) -> Result<Self> {
        let host = host.into();
        let container = container.into();
        if host.is_empty() || container.is_empty() {
            return Err(ShooshError::InvalidMapping { host, container });
        }
        Ok(Self { host, container })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Replace every occurrence of the host prefix with the container prefix.
    pub fn translate(&self, value: &str) -> String {
        value.replace(self.host.as_str(), &self.container)
    }
}

impl fmt::Display for PathMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

/// Parses `host:container`.
impl FromStr for PathMapping {
    type Err = ShooshError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((host, container)) => PathMapping::new(host, container),
            None => Err(ShooshError::InvalidMapping {
                host: s.to_string(),
                container: String::new(),
            }),
        }
    }
}

impl TryFrom<(&str, &str)> for PathMapping {
    type Error = ShooshError;

    fn try_from((host, container): (&str, &str)) -> Result<Self> {
        PathMapping::new(host, container)
    }
}

/// The mappings held by a configured session. The shape is fixed when the session is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSet {
    /// Tried in order against every positional (and keyword) value.
    Ordered(Vec<PathMapping>),
    /// Applies only to the keyword argument carrying the label.
    Labeled(BTreeMap<String, PathMapping>),
}

impl Default for MappingSet {
    fn default() -> Self {
        MappingSet::Ordered(Vec::new())
    }
}

impl From<PathMapping> for MappingSet {
    fn from(m: PathMapping) -> Self {
        MappingSet::Ordered(vec![m])
    }
}

impl From<Vec<PathMapping>> for MappingSet {
    fn from(v: Vec<PathMapping>) -> Self {
        MappingSet::Ordered(v)
    }
}

impl From<BTreeMap<String, PathMapping>> for MappingSet {
    fn from(m: BTreeMap<String, PathMapping>) -> Self {
        MappingSet::Labeled(m)
    }
}

impl MappingSet {
    pub fn labeled<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, PathMapping)>,
        L: Into<String>,
    {
        MappingSet::Labeled(entries.into_iter().map(|(l, m)| (l.into(), m)).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MappingSet::Ordered(v) => v.is_empty(),
            MappingSet::Labeled(m) => m.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MappingSet::Ordered(v) => v.len(),
            MappingSet::Labeled(m) => m.len(),
        }
    }

    fn ordered(&self) -> &[PathMapping] {
        match self {
            MappingSet::Ordered(v) => v,
            MappingSet::Labeled(_) => &[],
        }
    }

    /// Rewrite one positional value.
    pub fn remap_positional(&self, value: &str, exists: &dyn Fn(&str) -> bool) -> String {
        map_ordered(value, self.ordered(), exists)
    }

    /// Rewrite and render one keyword argument as `label<sep>value`.
    pub fn remap_keyword(
        &self,
        label: &str,
        value: &str,
        sep: &str,
        exists: &dyn Fn(&str) -> bool,
    ) -> String {
        let mapped = match self {
            MappingSet::Labeled(by_label) => match by_label.get(label) {
                Some(m) => m.translate(value),
                None => value.to_string(),
            },
            MappingSet::Ordered(v) => map_ordered(value, v, exists),
        };
        format!("{label}{sep}{mapped}")
    }
}

fn map_ordered(value: &str, maps: &[PathMapping], exists: &dyn Fn(&str) -> bool) -> String {
    if maps.is_empty() || !exists(value) {
        return value.to_string();
    }
    let abs = absolutize(value);
    for m in maps {
        let mapped = m.translate(&abs);
        if mapped != abs {
            return mapped;
        }
    }
    value.to_string()
}

/// Lexical absolute path: relative values are joined to the current directory, `.` is dropped and
/// `..` folded. Symlinks are left alone.
pub fn absolutize(value: &str) -> String {
    let p = Path::new(value);
    let joined = if p.is_absolute() {
        p.to_path_buf()
    } else {
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(p)
    };
    normalize(&joined).to_string_lossy().into_owned()
}

fn normalize(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::Prefix(_) | Component::RootDir => out.push(c.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(s) => out.push(s),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pm(h: &str, c: &str) -> PathMapping {
        PathMapping::new(h, c).expect("valid mapping")
    }

    fn always(_: &str) -> bool {
        true
    }

    fn never(_: &str) -> bool {
        false
    }

    #[test]
    fn test_new_rejects_empty_prefixes() {
        assert!(matches!(
            PathMapping::new("", "/mnt"),
            Err(ShooshError::InvalidMapping { .. })
        ));
        assert!(PathMapping::new("/host", "").is_err());
    }

    #[test]
    fn test_parse_host_container_pair() {
        let m: PathMapping = "/host/data:/mnt/data".parse().unwrap();
        assert_eq!(m.host(), "/host/data");
        assert_eq!(m.container(), "/mnt/data");
        assert_eq!(m.to_string(), "/host/data:/mnt/data");
        assert!("/host/data".parse::<PathMapping>().is_err());
    }

    #[test]
    fn test_positional_first_changing_mapping_wins() {
        let set = MappingSet::from(vec![
            pm("/srv", "/a"),
            pm("/host/data", "/mnt/data"),
            pm("/host", "/mnt/root"),
        ]);
        assert_eq!(
            set.remap_positional("/host/data/file.txt", &always),
            "/mnt/data/file.txt"
        );
        assert_eq!(
            set.remap_positional("/host/other.txt", &always),
            "/mnt/root/other.txt"
        );
    }

    #[test]
    fn test_positional_host_string_inside_path_is_replaced() {
        let set = MappingSet::from(pm("/data", "/mnt/data"));
        assert_eq!(
            set.remap_positional("/home/u/data/f.txt", &always),
            "/home/u/mnt/data/f.txt"
        );
    }

    #[test]
    fn test_positional_replaces_every_occurrence() {
        let set = MappingSet::from(vec![pm("/none", "/x"), pm("/in", "/c")]);
        assert_eq!(set.remap_positional("/in/a/in/b", &always), "/c/a/c/b");
    }

    #[test]
    fn test_positional_missing_path_passes_through() {
        let set = MappingSet::from(pm("/host/data", "/mnt/data"));
        assert_eq!(
            set.remap_positional("/host/data/file.txt", &never),
            "/host/data/file.txt"
        );
        assert_eq!(set.remap_positional("-l", &never), "-l");
    }

    #[test]
    fn test_positional_unmatched_existing_path_is_unchanged() {
        let set = MappingSet::from(pm("/host/data", "/mnt/data"));
        assert_eq!(set.remap_positional("/etc/hosts/../hosts", &always), "/etc/hosts/../hosts");
    }

    #[test]
    fn test_positional_is_normalized_before_mapping() {
        let set = MappingSet::from(pm("/host/data", "/mnt/data"));
        assert_eq!(
            set.remap_positional("/host/./tmp/../data//f", &always),
            "/mnt/data/f"
        );
    }

    #[test]
    fn test_positional_ignored_under_labeled_set() {
        let set = MappingSet::labeled([("infile", pm("/host", "/mnt"))]);
        assert_eq!(set.remap_positional("/host/x", &always), "/host/x");
    }

    #[test]
    fn test_labeled_keyword_is_unconditional() {
        let set = MappingSet::labeled([("infile", pm("/host/data", "/mnt/data"))]);
        assert_eq!(
            set.remap_keyword("infile", "/host/data/x", "=", &never),
            "infile=/mnt/data/x"
        );
        assert_eq!(
            set.remap_keyword("outfile", "/host/data/x", "=", &never),
            "outfile=/host/data/x"
        );
    }

    #[test]
    fn test_labeled_keyword_replaces_host_inside_value() {
        let set = MappingSet::labeled([("in", pm("/host", "/c"))]);
        assert_eq!(
            set.remap_keyword("in", "file:///host/x", "=", &never),
            "in=file:///c/x"
        );
    }

    #[test]
    fn test_ordered_keyword_uses_positional_rule() {
        let set = MappingSet::from(pm("/host/data", "/mnt/data"));
        assert_eq!(
            set.remap_keyword("--in", "/host/data/x", " ", &always),
            "--in /mnt/data/x"
        );
        assert_eq!(
            set.remap_keyword("--in", "/host/data/x", "=", &never),
            "--in=/host/data/x"
        );
    }

    #[test]
    fn test_normalize_folds_parent_at_root() {
        assert_eq!(normalize(Path::new("/../a/./b/..")), PathBuf::from("/a"));
    }

    #[test]
    fn test_absolutize_relative_joins_cwd() {
        let cwd = env::current_dir().unwrap();
        let expect = normalize(&cwd.join("some/rel"));
        assert_eq!(absolutize("./some/rel"), expect.to_string_lossy());
    }
}
