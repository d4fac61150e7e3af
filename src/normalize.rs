//! # Normalization
//!
//! Turns a raw document into the per-repository file set that orchestration
//! writes out. This is the root of the engine; it runs these stages in order:
//!
//! 1. **Validation**: reject malformed input before any merge work.
//! 2. **Content resolution**: for every repo entry and declared file, pick a
//!    mode and compute the content:
//!    - *override* - the repo's content alone, base content ignored;
//!    - *inherit* - the base content unchanged;
//!    - *merge* - the repo's content deep-merged over the base content using
//!      the file's array strategy (or the document default).
//!
//!    Leftover merge directives are stripped in every mode.
//! 3. **Interpolation**: `${...}` expressions are resolved in strict mode. One
//!    missing variable fails the whole run.
//! 4. **Expansion**: every URL of an entry's `git` target becomes its own
//!    [`RepoConfig`] with its own copy of the resolved files.
//!
//! The result depends only on the document and the environment values read,
//! so repeated calls with the same inputs produce equal output.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{FileOverride, FileSpec, RawDocument, RawRepoEntry};
use crate::env::{interpolate_with, EnvSource, InterpolationOptions, ProcessEnv};
use crate::error::{Error, Result};
use crate::merge::{deep_merge, strip_merge_directives, ArrayMergeStrategy};
use crate::validation::{parse_strategy, validate};

/// The normalized result: one entry per target repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Target repositories, in document order with git arrays expanded.
    pub repos: Vec<RepoConfig>,
}

impl Config {
    /// Find the first repository with the given URL.
    pub fn repo(&self, git_url: &str) -> Option<&RepoConfig> {
        self.repos.iter().find(|repo| repo.git_url == git_url)
    }
}

/// The files to materialize in one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConfig {
    /// Clone URL.
    pub git_url: String,
    /// Files in name order; names are unique.
    pub files: Vec<FileContent>,
}

impl RepoConfig {
    /// Look up a file by name.
    pub fn file(&self, file_name: &str) -> Option<&FileContent> {
        self.files.iter().find(|file| file.file_name == file_name)
    }
}

/// One fully resolved file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// Relative path inside the repository.
    pub file_name: String,
    /// Resolved content, free of merge directives.
    pub content: Value,
    /// Whether an existing file must be left untouched.
    pub create_only: bool,
}

/// How a file's content was derived for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Repo content replaces the base content.
    Override,
    /// Base content is used unchanged.
    Inherit,
    /// Repo content is merged over the base content.
    Merge,
}

/// Normalize a document against the process environment.
pub fn normalize(doc: &RawDocument) -> Result<Config> {
    normalize_with_env(doc, &ProcessEnv)
}

/// Normalize a document against an explicit environment.
pub fn normalize_with_env<E>(doc: &RawDocument, env: &E) -> Result<Config>
where
    E: EnvSource + ?Sized,
{
    validate(doc)?;

    let default_strategy = match &doc.merge_strategy {
        Some(value) => parse_strategy(value, "the document default")?,
        None => ArrayMergeStrategy::default(),
    };

    let mut repos = Vec::new();
    for (index, entry) in doc.repos.iter().enumerate() {
        let target = entry.git.as_ref().ok_or(Error::MissingGitField { index })?;
        let files = resolve_entry(doc, index, entry, default_strategy, env)?;

        for url in target.urls() {
            debug!("Repo {} ({}): {} file(s)", index, url, files.len());
            repos.push(RepoConfig {
                git_url: url.to_string(),
                files: files.clone(),
            });
        }
    }

    Ok(Config { repos })
}

fn resolve_entry<E>(
    doc: &RawDocument,
    index: usize,
    entry: &RawRepoEntry,
    default_strategy: ArrayMergeStrategy,
    env: &E,
) -> Result<Vec<FileContent>>
where
    E: EnvSource + ?Sized,
{
    let options = InterpolationOptions { strict: true };
    let mut files = Vec::with_capacity(doc.files.len());

    for (file_name, spec) in &doc.files {
        let file_override = entry.files.get(file_name);
        if file_override.is_some_and(FileOverride::is_excluded) {
            debug!("  {}: excluded", file_name);
            continue;
        }

        let strategy = match &spec.merge_strategy {
            Some(value) => parse_strategy(value, &format!("file '{}'", file_name))?,
            None => default_strategy,
        };
        let (mode, content) = resolve_content(spec, file_override, strategy).ok_or_else(|| {
            Error::MissingContent {
                index,
                file_name: file_name.clone(),
            }
        })?;
        debug!("  {}: {:?} (arrays: {})", file_name, mode, strategy);

        let create_only = file_override
            .and_then(FileOverride::settings)
            .and_then(|settings| settings.create_only)
            .or(spec.create_only)
            .unwrap_or(false);

        files.push(FileContent {
            file_name: file_name.clone(),
            content: interpolate_with(&content, options, env)?,
            create_only,
        });
    }

    Ok(files)
}

/// Compute one file's content for one repository, before interpolation.
///
/// Returns `None` when neither side defines content. The result never
/// contains merge directives.
pub fn resolve_content(
    spec: &FileSpec,
    file_override: Option<&FileOverride>,
    strategy: ArrayMergeStrategy,
) -> Option<(ContentMode, Value)> {
    let settings = file_override.and_then(FileOverride::settings);
    let repo_content = settings.and_then(|settings| settings.content.as_ref());
    let override_base = settings.is_some_and(|settings| settings.override_base);

    match (repo_content, spec.content.as_ref()) {
        (Some(repo), _) if override_base => {
            Some((ContentMode::Override, strip_merge_directives(repo)))
        }
        (Some(repo), base) => {
            let empty = Value::Object(Map::new());
            let merged = deep_merge(base.unwrap_or(&empty), repo, strategy);
            Some((ContentMode::Merge, strip_merge_directives(&merged)))
        }
        (None, Some(base)) => Some((ContentMode::Inherit, strip_merge_directives(base))),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_yaml, OverrideSettings};
    use crate::merge::json::contains_merge_directive;
    use serde_json::json;
    use std::collections::HashMap;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    fn normalize_yaml(yaml: &str) -> Result<Config> {
        normalize_with_env(&parse_yaml(yaml).unwrap(), &no_env())
    }

    mod mode_tests {
        use super::*;

        const BASE: &str = r#"
files:
  config.json:
    content:
      base: v
      nested:
        k: nv
      list: [1, 2]
"#;

        #[test]
        fn test_override_mode_ignores_base() {
            let yaml = format!(
                "{}repos:\n  - git: r\n    files:\n      config.json:\n        override: true\n        content:\n          only: r\n",
                BASE
            );
            let config = normalize_yaml(&yaml).unwrap();
            assert_eq!(config.repos[0].files[0].content, json!({"only": "r"}));
        }

        #[test]
        fn test_inherit_mode_uses_base() {
            let yaml = format!("{}repos:\n  - git: r\n", BASE);
            let config = normalize_yaml(&yaml).unwrap();
            assert_eq!(
                config.repos[0].files[0].content,
                json!({"base": "v", "nested": {"k": "nv"}, "list": [1, 2]})
            );
        }

        #[test]
        fn test_true_toggle_inherits() {
            let yaml = format!("{}repos:\n  - git: r\n    files:\n      config.json: true\n", BASE);
            let config = normalize_yaml(&yaml).unwrap();
            assert_eq!(config.repos[0].files[0].content["base"], json!("v"));
        }

        #[test]
        fn test_merge_mode_combines_base_and_repo() {
            let yaml = format!(
                "{}repos:\n  - git: r\n    files:\n      config.json:\n        content:\n          nested:\n            extra: true\n          list: [3]\n",
                BASE
            );
            let config = normalize_yaml(&yaml).unwrap();
            assert_eq!(
                config.repos[0].files[0].content,
                json!({"base": "v", "nested": {"k": "nv", "extra": true}, "list": [3]})
            );
        }

        #[test]
        fn test_resolve_content_reports_mode() {
            let spec = FileSpec {
                content: Some(json!({"a": 1})),
                ..Default::default()
            };
            let merge = FileOverride::Settings(OverrideSettings {
                content: Some(json!({"b": 2})),
                ..Default::default()
            });
            let replace = FileOverride::Settings(OverrideSettings {
                override_base: true,
                content: Some(json!({"b": 2})),
                ..Default::default()
            });

            let strategy = ArrayMergeStrategy::Replace;
            assert_eq!(
                resolve_content(&spec, None, strategy).unwrap().0,
                ContentMode::Inherit
            );
            assert_eq!(
                resolve_content(&spec, Some(&merge), strategy).unwrap(),
                (ContentMode::Merge, json!({"a": 1, "b": 2}))
            );
            assert_eq!(
                resolve_content(&spec, Some(&replace), strategy).unwrap(),
                (ContentMode::Override, json!({"b": 2}))
            );
        }

        #[test]
        fn test_resolve_content_without_any_content() {
            let spec = FileSpec::default();
            assert!(resolve_content(&spec, None, ArrayMergeStrategy::Replace).is_none());
        }

        #[test]
        fn test_repo_content_without_base() {
            let yaml = r#"
files:
  a.json: {}
repos:
  - git: r
    files:
      a.json:
        content:
          list:
            $arrayMerge: append
            values: [1]
"#;
            let config = normalize_yaml(yaml).unwrap();
            assert_eq!(config.repos[0].files[0].content, json!({"list": [1]}));
        }
    }

    mod strategy_tests {
        use super::*;

        const DOC: &str = r#"
{strategy}
files:
  a.json:
    content:
      items: [1, 2]
    {file_strategy}
repos:
  - git: r
    files:
      a.json:
        content:
          items: [3]
"#;

        fn items_for(strategy: &str, file_strategy: &str) -> Value {
            let yaml = DOC
                .replace("{strategy}", strategy)
                .replace("{file_strategy}", file_strategy);
            normalize_yaml(&yaml).unwrap().repos[0].files[0].content["items"].clone()
        }

        #[test]
        fn test_default_is_replace() {
            assert_eq!(items_for("", ""), json!([3]));
        }

        #[test]
        fn test_document_default_applies() {
            assert_eq!(items_for("mergeStrategy: append", ""), json!([1, 2, 3]));
        }

        #[test]
        fn test_file_strategy_beats_document_default() {
            assert_eq!(
                items_for("mergeStrategy: append", "mergeStrategy: prepend"),
                json!([3, 1, 2])
            );
        }

        #[test]
        fn test_directive_beats_file_strategy() {
            let yaml = r#"
files:
  a.json:
    content:
      items: [1, 2]
    mergeStrategy: prepend
repos:
  - git: r
    files:
      a.json:
        content:
          items:
            $arrayMerge: append
            values: [3]
"#;
            let config = normalize_yaml(yaml).unwrap();
            assert_eq!(config.repos[0].files[0].content["items"], json!([1, 2, 3]));
        }
    }

    mod directive_stripping_tests {
        use super::*;

        #[test]
        fn test_no_directive_survives_any_mode() {
            let yaml = r#"
files:
  a.json:
    content:
      base_list:
        $arrayMerge: append
        values: [b]
repos:
  - git: inherit
  - git: merge
    files:
      a.json:
        content:
          fresh:
            deep:
              $arrayMerge: prepend
              values: [f]
  - git: override
    files:
      a.json:
        override: true
        content:
          only:
            $arrayMerge: append
            values: [o]
"#;
            let config = normalize_yaml(yaml).unwrap();
            for repo in &config.repos {
                for file in &repo.files {
                    assert!(
                        !contains_merge_directive(&file.content),
                        "{} kept a directive: {}",
                        repo.git_url,
                        file.content
                    );
                }
            }
            assert_eq!(config.repo("inherit").unwrap().files[0].content, json!({"base_list": ["b"]}));
            assert_eq!(
                config.repo("merge").unwrap().files[0].content,
                json!({"base_list": ["b"], "fresh": {"deep": ["f"]}})
            );
            assert_eq!(config.repo("override").unwrap().files[0].content, json!({"only": ["o"]}));
        }
    }

    mod expansion_tests {
        use super::*;

        const THREE_URLS: &str = r#"
files:
  shared.json:
    content:
      nested:
        value: 1
repos:
  - git:
      - git@github.com:org/a.git
      - git@github.com:org/b.git
      - git@github.com:org/c.git
"#;

        #[test]
        fn test_git_array_expands_to_independent_repos() {
            let mut config = normalize_yaml(THREE_URLS).unwrap();

            let urls: Vec<&str> = config.repos.iter().map(|r| r.git_url.as_str()).collect();
            assert_eq!(
                urls,
                vec![
                    "git@github.com:org/a.git",
                    "git@github.com:org/b.git",
                    "git@github.com:org/c.git"
                ]
            );
            assert_eq!(config.repos[0].files, config.repos[1].files);
            assert_eq!(config.repos[1].files, config.repos[2].files);

            config.repos[0].files[0].content["nested"]["value"] = json!(99);

            assert_eq!(config.repos[1].files[0].content["nested"]["value"], json!(1));
            assert_eq!(config.repos[2].files[0].content["nested"]["value"], json!(1));
        }

        #[test]
        fn test_entries_keep_document_order() {
            let yaml = r#"
files:
  a.json:
    content: {}
repos:
  - git: z-first
  - git: [a-second, m-third]
  - git: b-fourth
"#;
            let config = normalize_yaml(yaml).unwrap();
            let urls: Vec<&str> = config.repos.iter().map(|r| r.git_url.as_str()).collect();
            assert_eq!(urls, vec!["z-first", "a-second", "m-third", "b-fourth"]);
        }
    }

    mod exclusion_and_flags_tests {
        use super::*;

        const DOC: &str = r#"
files:
  a.json:
    content: {k: a}
    createOnly: true
  b.yaml:
    content: {k: b}
repos:
  - git: plain
  - git: custom
    files:
      a.json:
        createOnly: false
      b.yaml: false
"#;

        #[test]
        fn test_excluded_file_is_skipped() {
            let config = normalize_yaml(DOC).unwrap();
            let custom = config.repo("custom").unwrap();
            assert_eq!(custom.files.len(), 1);
            assert!(custom.file("b.yaml").is_none());
            assert_eq!(config.repo("plain").unwrap().files.len(), 2);
        }

        #[test]
        fn test_create_only_resolution() {
            let config = normalize_yaml(DOC).unwrap();
            let plain = config.repo("plain").unwrap();
            assert!(plain.file("a.json").unwrap().create_only);
            assert!(!plain.file("b.yaml").unwrap().create_only);
            assert!(!config.repo("custom").unwrap().file("a.json").unwrap().create_only);
        }

        #[test]
        fn test_files_are_unique_and_ordered() {
            let config = normalize_yaml(DOC).unwrap();
            let names: Vec<&str> = config.repos[0]
                .files
                .iter()
                .map(|f| f.file_name.as_str())
                .collect();
            assert_eq!(names, vec!["a.json", "b.yaml"]);
        }
    }

    mod interpolation_tests {
        use super::*;

        const DOC: &str = r#"
files:
  a.json:
    content:
      token: ${API_TOKEN}
      region: ${REGION:-eu-west-1}
      port: 8080
repos:
  - git: [r1, r2]
"#;

        #[test]
        fn test_interpolates_after_merge() {
            let env: HashMap<String, String> =
                [("API_TOKEN".to_string(), "secret".to_string())].into();
            let config = normalize_with_env(&parse_yaml(DOC).unwrap(), &env).unwrap();
            for repo in &config.repos {
                assert_eq!(
                    repo.files[0].content,
                    json!({"token": "secret", "region": "eu-west-1", "port": 8080})
                );
            }
        }

        #[test]
        fn test_missing_variable_fails_whole_run() {
            let err = normalize_yaml(DOC).unwrap_err();
            match err {
                Error::MissingEnvVar { name, .. } => assert_eq!(name, "API_TOKEN"),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    mod determinism_tests {
        use super::*;

        #[test]
        fn test_normalize_is_idempotent() {
            let yaml = r#"
mergeStrategy: append
files:
  a.json:
    content:
      list: [1]
      name: ${NAME:-svc}
repos:
  - git: [r1, r2]
    files:
      a.json:
        content:
          list: [2]
"#;
            let doc = parse_yaml(yaml).unwrap();
            let first = normalize_with_env(&doc, &no_env()).unwrap();
            let second = normalize_with_env(&doc, &no_env()).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn test_validation_runs_first() {
            let err = normalize_yaml("files: {}\nrepos: []\n").unwrap_err();
            assert!(matches!(err, Error::MissingRepos));
        }
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = normalize_yaml("files:\n  a.json:\n    content: {}\nrepos:\n  - git: r\n").unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({"repos": [{"gitUrl": "r", "files": [
                {"fileName": "a.json", "content": {}, "createOnly": false}
            ]}]})
        );
    }
}
