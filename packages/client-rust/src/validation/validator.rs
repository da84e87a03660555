//! XSD validator seam and the bundled structural checker.

use async_trait::async_trait;
use nfe_core::{Node, TreeError};

/// Raw result of a validator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorReport {
    pub valid: bool,
    /// Whether `valid` covers the full schema, not just document structure.
    pub schema_checked: bool,
    /// Diagnostics in the validator's own format, most relevant first.
    pub messages: Vec<String>,
}

impl ValidatorReport {
    /// The document satisfies the schema.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            schema_checked: true,
            messages: Vec::new(),
        }
    }

    /// No error found, but the schema's content models were not checked.
    #[must_use]
    pub fn well_formed() -> Self {
        Self {
            valid: true,
            schema_checked: false,
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            schema_checked: false,
            messages: vec![message.into()],
        }
    }
}

/// Validates an XML document against an XSD document.
///
/// Messages are expected in libxml style,
/// `[error] <code>: <description> (<line>:<column>)`, so they can be
/// normalized for display.
#[async_trait]
pub trait XsdValidator: Send + Sync {
    /// An `Err` means the validator itself could not run; an invalid
    /// document is an `Ok` report with `valid == false`.
    async fn validate(&self, xml: &str, schema: &str) -> anyhow::Result<ValidatorReport>;
}

/// Checks well-formedness and that the document element is one of the
/// global elements the schema declares.
///
/// Content models, types and facets are not checked, so a passing document
/// is reported as [`ValidatorReport::well_formed`], never as schema-valid.
/// Parsing runs on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct WellFormedValidator;

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn items(node: &Node) -> &[Node] {
    match node {
        Node::Sequence(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// Names of the top-level `element` declarations of an XSD document.
/// Empty when the schema cannot be read.
fn declared_roots(schema: &str) -> Vec<String> {
    let Ok(Node::Mapping(documents)) = nfe_core::to_tree(schema) else {
        return Vec::new();
    };
    let mut roots = Vec::new();
    for (name, node) in &documents {
        let Node::Mapping(fields) = node else {
            continue;
        };
        if local_name(name) != "schema" {
            continue;
        }
        for (key, value) in fields {
            if local_name(key) == "element" {
                roots.extend(
                    items(value)
                        .iter()
                        .filter_map(|element| element.get("@name").and_then(Node::text))
                        .map(str::to_owned),
                );
            }
        }
    }
    roots
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, position: usize) -> (usize, usize) {
    let prefix = &text.as_bytes()[..position.min(text.len())];
    let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(newline) => prefix.len() - newline,
        None => prefix.len() + 1,
    };
    (line, column)
}

fn check_root(xml: &str, tree: &Node, declared: &[String]) -> ValidatorReport {
    let Node::Mapping(roots) = tree else {
        return ValidatorReport::well_formed();
    };
    let Some((root, _)) = roots.first() else {
        return ValidatorReport::well_formed();
    };
    if declared.is_empty()
        || declared
            .iter()
            .any(|name| local_name(name) == local_name(root))
    {
        return ValidatorReport::well_formed();
    }
    let position = xml.find(&format!("<{root}")).unwrap_or(0);
    let (line, column) = line_column(xml, position);
    ValidatorReport::invalid(format!(
        "[error] root: element '{root}' is not declared by the schema ({line}:{column})"
    ))
}

fn check_structure(xml: &str, schema: &str) -> ValidatorReport {
    match nfe_core::to_tree(xml) {
        Ok(tree) => check_root(xml, &tree, &declared_roots(schema)),
        Err(TreeError::Parse { position, message }) => {
            let (line, column) = line_column(xml, position);
            ValidatorReport::invalid(format!("[error] malformed: {message} ({line}:{column})"))
        }
        Err(other) => ValidatorReport::invalid(other.to_string()),
    }
}

#[async_trait]
impl XsdValidator for WellFormedValidator {
    async fn validate(&self, xml: &str, schema: &str) -> anyhow::Result<ValidatorReport> {
        let xml = xml.to_owned();
        let schema = schema.to_owned();
        let report = tokio::task::spawn_blocking(move || check_structure(&xml, &schema)).await?;
        Ok(report)
    }
}
