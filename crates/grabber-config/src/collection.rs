use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// A collection to mirror, with an optional version range.
///
/// Instances are validated on construction: namespace and name are non-empty, and a blank
/// constraint is the same as no constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCollectionSpec")]
pub struct CollectionSpec {
    namespace: String,
    #[serde(rename = "collection")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint: Option<String>,
}

#[derive(Deserialize)]
struct RawCollectionSpec {
    namespace: String,
    #[serde(alias = "name")]
    collection: String,
    #[serde(default)]
    constraint: Option<String>,
}

impl TryFrom<RawCollectionSpec> for CollectionSpec {
    type Error = ConfigError;

    fn try_from(raw: RawCollectionSpec) -> Result<Self> {
        Self::new(raw.namespace, raw.collection, raw.constraint)
    }
}

impl CollectionSpec {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        constraint: Option<String>,
    ) -> Result<Self> {
        let namespace = namespace.into().trim().to_string();
        let name = name.into().trim().to_string();

        for (field, value) in [("namespace", &namespace), ("name", &name)] {
            if value.is_empty() {
                return Err(ConfigError::InvalidCollection {
                    input: format!("{namespace}.{name}"),
                    reason: format!("{field} must not be empty"),
                });
            }
            if value.contains(['/', '\\']) || value == "." || value == ".." {
                return Err(ConfigError::InvalidCollection {
                    input: format!("{namespace}.{name}"),
                    reason: format!("{field} must not contain path separators"),
                });
            }
        }

        let constraint = constraint
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            namespace,
            name,
            constraint,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version range expression; `None` selects every version.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

impl fmt::Display for CollectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for CollectionSpec {
    type Err = ConfigError;

    /// Parses `namespace.name` or `namespace.name:constraint`.
    fn from_str(s: &str) -> Result<Self> {
        let (id, constraint) = match s.split_once(':') {
            Some((id, constraint)) => (id, Some(constraint.to_string())),
            None => (s, None),
        };

        let (namespace, name) = id.split_once('.').ok_or_else(|| {
            ConfigError::InvalidCollection {
                input: s.to_string(),
                reason: "expected `namespace.name`".to_string(),
            }
        })?;

        Self::new(namespace, name, constraint).map_err(|err| {
            match err {
                ConfigError::InvalidCollection {
                    reason, ..
                } => {
                    ConfigError::InvalidCollection {
                        input: s.to_string(),
                        reason,
                    }
                }
                other => other,
            }
        })
    }
}

#[derive(Deserialize)]
struct CollectionsFile {
    #[serde(default)]
    collections: Vec<CollectionSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonCollections {
    Wrapped(CollectionsFile),
    Bare(Vec<CollectionSpec>),
}

/// Loads a collection list.
///
/// Files ending in `.json` may hold `{"collections": [...]}` or a bare array; anything else
/// is read as TOML with a `[[collections]]` array of tables.
pub fn load_collections<P: AsRef<Path>>(path: P) -> Result<Vec<CollectionSpec>> {
    let path = path.as_ref();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::CollectionsFileNotFound(
                path.display().to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        match serde_json::from_str(&content)? {
            JsonCollections::Wrapped(file) => Ok(file.collections),
            JsonCollections::Bare(list) => Ok(list),
        }
    } else {
        let file: CollectionsFile = toml::from_str(&content)?;
        Ok(file.collections)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_new_trims_and_normalizes_constraint() {
        let spec = CollectionSpec::new(" community ", "general", Some("  ".into())).unwrap();
        assert_eq!(spec.namespace(), "community");
        assert_eq!(spec.name(), "general");
        assert_eq!(spec.constraint(), None);
        assert_eq!(spec.to_string(), "community.general");
    }

    #[test]
    fn test_new_rejects_empty_and_separators() {
        assert!(CollectionSpec::new("", "general", None).is_err());
        assert!(CollectionSpec::new("community", " ", None).is_err());
        assert!(CollectionSpec::new("../etc", "general", None).is_err());
        assert!(CollectionSpec::new("community", "..", None).is_err());
    }

    #[test]
    fn test_from_str() {
        let spec: CollectionSpec = "community.general".parse().unwrap();
        assert_eq!(spec.constraint(), None);

        let spec: CollectionSpec = "community.general:>=2.0.0, <3.0.0".parse().unwrap();
        assert_eq!(spec.namespace(), "community");
        assert_eq!(spec.name(), "general");
        assert_eq!(spec.constraint(), Some(">=2.0.0, <3.0.0"));

        let err = "community".parse::<CollectionSpec>().unwrap_err();
        assert!(err.to_string().contains("`community`"));

        let err = ".general".parse::<CollectionSpec>().unwrap_err();
        assert!(err.to_string().contains("namespace must not be empty"));
    }

    #[test]
    fn test_deserialize_accepts_name_alias() {
        let spec: CollectionSpec =
            serde_json::from_str(r#"{"namespace": "ansible", "name": "posix"}"#).unwrap();
        assert_eq!(spec.name(), "posix");

        let err = serde_json::from_str::<CollectionSpec>(r#"{"namespace": "", "collection": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_load_collections_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("collections.toml");
        fs::write(
            &path,
            r#"
[[collections]]
namespace = "community"
collection = "general"

[[collections]]
namespace = "ansible"
collection = "posix"
constraint = "~1.5"
"#,
        )
        .unwrap();

        let list = load_collections(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].to_string(), "community.general");
        assert_eq!(list[1].constraint(), Some("~1.5"));
    }

    #[test]
    fn test_load_collections_json_forms() {
        let dir = tempdir().unwrap();

        let wrapped = dir.path().join("wrapped.json");
        fs::write(
            &wrapped,
            r#"{"collections": [{"namespace": "community", "collection": "general", "constraint": ">=2.0.0"}]}"#,
        )
        .unwrap();
        let list = load_collections(&wrapped).unwrap();
        assert_eq!(list[0].constraint(), Some(">=2.0.0"));

        let bare = dir.path().join("bare.JSON");
        fs::write(&bare, r#"[{"namespace": "ansible", "collection": "utils"}]"#).unwrap();
        let list = load_collections(&bare).unwrap();
        assert_eq!(list[0].to_string(), "ansible.utils");
    }

    #[test]
    fn test_load_collections_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_collections(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::CollectionsFileNotFound(_)));
    }
}
