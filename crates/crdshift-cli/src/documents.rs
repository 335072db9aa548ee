//! Reading and writing captured manifests
//!
//! Input is either JSON (a single object, an array of objects, or a `List`
//! with `items`) or multi-document YAML. Empty YAML documents are dropped.
//! Documents are written back in the same container they were read from.

use std::io::{Read, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CliError, Result};

/// Serialization used when writing documents back out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

/// How the documents were packaged in the input
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    /// Multi-document YAML stream
    Stream,
    /// A single JSON object
    Object,
    /// A top-level JSON array
    Array,
    /// A JSON `*List` object; `items` is emptied while the documents are split out
    List(Map<String, Value>),
}

/// Documents read from one input, plus how to put them back together
#[derive(Debug, Clone, PartialEq)]
pub struct Manifests {
    pub container: Container,
    pub items: Vec<Value>,
}

impl Manifests {
    /// Top-level values to write, in the input's container shape
    fn reassemble(&self) -> Reassembled<'_> {
        match &self.container {
            Container::List(wrapper) => {
                let mut wrapper = wrapper.clone();
                wrapper.insert("items".to_string(), Value::Array(self.items.clone()));
                Reassembled::One(Value::Object(wrapper))
            }
            Container::Array => Reassembled::Many(&self.items),
            Container::Object | Container::Stream => match self.items.as_slice() {
                [single] => Reassembled::One(single.clone()),
                many => Reassembled::Many(many),
            },
        }
    }
}

enum Reassembled<'a> {
    One(Value),
    Many(&'a [Value]),
}

/// Read all documents from `path`, or from stdin when `path` is `-`
pub fn read_path(path: &Path) -> Result<Manifests> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| CliError::Io {
            message: format!("{}: {}", path.display(), e),
        })?
    };

    parse(&content)
}

/// Parse manifest content, auto-detecting JSON or YAML
pub fn parse(content: &str) -> Result<Manifests> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| CliError::input(format!("invalid JSON: {}", e)))?;
        return Ok(split_json(value));
    }

    let mut items = Vec::new();
    for (i, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document).map_err(|e| {
            CliError::input_with_help(
                format!("invalid YAML in document #{}: {}", i + 1, e),
                "documents must be separated by '---' lines",
            )
        })?;
        if !value.is_null() {
            items.push(value);
        }
    }
    Ok(Manifests {
        container: Container::Stream,
        items,
    })
}

/// Split a top-level array or `*List` object into its items
fn split_json(value: Value) -> Manifests {
    match value {
        Value::Array(items) => Manifests {
            container: Container::Array,
            items,
        },
        Value::Object(mut map)
            if map
                .get("kind")
                .and_then(Value::as_str)
                .is_some_and(|k| k.ends_with("List")) =>
        {
            match map.get_mut("items") {
                Some(Value::Array(items)) => {
                    let items = std::mem::take(items);
                    Manifests {
                        container: Container::List(map),
                        items,
                    }
                }
                _ => Manifests {
                    container: Container::Object,
                    items: vec![Value::Object(map)],
                },
            }
        }
        other => Manifests {
            container: Container::Object,
            items: vec![other],
        },
    }
}

/// Render documents in the requested format, keeping the input's container shape
///
/// JSON output writes a `List` back with its wrapper and an array back as an
/// array. YAML output writes each top-level value as its own document.
pub fn render(manifests: &Manifests, format: Format) -> Result<String> {
    let reassembled = manifests.reassemble();
    match format {
        Format::Json => {
            let rendered = match &reassembled {
                Reassembled::One(value) => serde_json::to_string_pretty(value),
                Reassembled::Many(values) => serde_json::to_string_pretty(values),
            };
            rendered
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| CliError::internal(e.to_string()))
        }
        Format::Yaml => {
            let documents = match &reassembled {
                Reassembled::One(value) => std::slice::from_ref(value),
                Reassembled::Many(values) => *values,
            };
            let mut out = String::new();
            for (i, document) in documents.iter().enumerate() {
                if i > 0 {
                    out.push_str("---\n");
                }
                let yaml =
                    serde_yaml::to_string(document).map_err(|e| CliError::internal(e.to_string()))?;
                out.push_str(&yaml);
            }
            Ok(out)
        }
    }
}

/// Write rendered documents to `path`, or stdout when `None`
pub fn write(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered).map_err(|e| CliError::Io {
            message: format!("{}: {}", path.display(), e),
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
