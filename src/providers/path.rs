//! Dotted-path extraction from the input document.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{ProviderError, ProviderRegistry, ValueProvider};
use crate::context::ProviderContext;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
    Flatten,
}

/// Extracts values from the document by path.
///
/// Paths are dot-separated keys. A segment may carry bracket suffixes:
/// `[N]` selects an element and `[]` fans out over every element, e.g.
/// `members[].first_name`. Missing keys and `null`s are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPathProvider {
    path: String,
    steps: Vec<Step>,
}

impl DocumentPathProvider {
    pub const TAG: &'static str = "!path";

    /// Parses a path expression.
    pub fn parse(path: &str) -> Result<Self, ProviderError> {
        let invalid = |message: String| ProviderError::InvalidConfiguration {
            tag: Self::TAG.to_string(),
            message,
        };

        if path.trim().is_empty() {
            return Err(invalid("path must not be empty".to_string()));
        }

        let mut steps = Vec::new();
        for segment in path.split('.') {
            let (name, mut rest) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };

            if name.is_empty() && rest.is_empty() {
                return Err(invalid(format!("empty segment in '{}'", path)));
            }
            if !name.is_empty() {
                steps.push(Step::Key(name.to_string()));
            }

            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| invalid(format!("unclosed '[' in '{}'", path)))?;
                let inner = &rest[1..close];
                if inner.is_empty() {
                    steps.push(Step::Flatten);
                } else {
                    let index = inner
                        .parse::<usize>()
                        .map_err(|_| invalid(format!("bad index '[{}]' in '{}'", inner, path)))?;
                    steps.push(Step::Index(index));
                }
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid(format!("unexpected '{}' in '{}'", rest, path)));
                }
            }
        }

        Ok(Self {
            path: path.to_string(),
            steps,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Registers `!path` with `registry`.
    pub fn install(registry: &mut ProviderRegistry) -> Result<(), ProviderError> {
        registry.register(Self::TAG, Box::new(Self::construct))
    }

    pub(crate) fn construct(
        _registry: &ProviderRegistry,
        data: &Value,
    ) -> Result<Arc<dyn ValueProvider>, ProviderError> {
        match data {
            Value::String(path) => Ok(Arc::new(Self::parse(path)?)),
            other => Err(ProviderError::InvalidConfiguration {
                tag: Self::TAG.to_string(),
                message: format!("expected a path string, got {}", other),
            }),
        }
    }

    fn select<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![document];
        for step in &self.steps {
            current = current
                .into_iter()
                .flat_map(|value| -> Vec<&'a Value> {
                    match (step, value) {
                        (Step::Key(key), Value::Object(map)) => map.get(key).into_iter().collect(),
                        (Step::Index(i), Value::Array(items)) => {
                            items.get(*i).into_iter().collect()
                        }
                        (Step::Flatten, Value::Array(items)) => items.iter().collect(),
                        _ => Vec::new(),
                    }
                })
                .filter(|value| !value.is_null())
                .collect();
        }
        current
    }
}

impl fmt::Display for DocumentPathProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Self::TAG, self.path)
    }
}

impl ValueProvider for DocumentPathProvider {
    fn single_value(&self, context: &ProviderContext) -> Option<Value> {
        self.select(&context.document).first().map(|v| (*v).clone())
    }

    fn many_values<'a>(
        &'a self,
        context: &'a ProviderContext,
    ) -> Box<dyn Iterator<Item = Value> + 'a> {
        Box::new(self.select(&context.document).into_iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DesiredIngestion;
    use serde_json::json;

    fn document_context() -> ProviderContext {
        ProviderContext::new(
            json!({
                "team": {"name": "nodestream"},
                "members": [
                    {"first_name": "Zach", "last_name": "Probst"},
                    {"first_name": "Chad", "last_name": "Cloes"}
                ],
                "project": {"tags": ["graphdb", "python"]}
            }),
            DesiredIngestion::default(),
        )
    }

    #[test]
    fn test_nested_key() {
        let provider = DocumentPathProvider::parse("team.name").unwrap();
        assert_eq!(provider.single_value(&document_context()), Some(json!("nodestream")));
    }

    #[test]
    fn test_flatten_many_values() {
        let context = document_context();
        let provider = DocumentPathProvider::parse("members[].first_name").unwrap();

        let names: Vec<_> = provider.many_values(&context).collect();
        assert_eq!(names, vec![json!("Zach"), json!("Chad")]);
        assert_eq!(provider.single_value(&context), Some(json!("Zach")));
    }

    #[test]
    fn test_index() {
        let provider = DocumentPathProvider::parse("project.tags[1]").unwrap();
        assert_eq!(provider.single_value(&document_context()), Some(json!("python")));
    }

    #[test]
    fn test_missing_path_is_absent() {
        let context = document_context();
        let provider = DocumentPathProvider::parse("team.missing.deeper").unwrap();

        assert_eq!(provider.single_value(&context), None);
        assert_eq!(provider.many_values(&context).count(), 0);
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["", "a..b", "a[", "a[x]", "a[0]b"] {
            assert!(DocumentPathProvider::parse(path).is_err(), "{path} should not parse");
        }
    }
}
