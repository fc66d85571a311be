//! Clover XML format loader

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::{CoverageNode, FileMetrics, FileRecord, LineKind, LineRecord};

/// Where test runners write their Clover report by default
pub const DEFAULT_REPORT_PATH: &str = "coverage/clover.xml";

/// Errors raised while reading a Clover document
#[derive(Debug, Error)]
pub enum CloverError {
    #[error("malformed coverage XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("expected a <coverage> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("unclosed <{0}> element at end of report")]
    Unclosed(String),

    #[error("coverage report contains no elements")]
    Empty,
}

/// Load and normalize the Clover report at `path`.
///
/// Returns `Ok(None)` when the file does not exist; a report that exists but
/// cannot be parsed is an error.
pub fn load_report(path: &Path) -> Result<Option<CoverageNode>> {
    if !path.exists() {
        debug!(path = %path.display(), "no coverage report found");
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read coverage report: {}", path.display()))?;

    let tree = parse_clover_string(&content)
        .with_context(|| format!("Failed to parse coverage report: {}", path.display()))?;

    debug!(path = %path.display(), files = tree.flatten().len(), "loaded coverage report");
    Ok(Some(tree))
}

/// Parse Clover XML content from a string, unwrapping the `<coverage>` envelope
pub fn parse_clover_string(content: &str) -> std::result::Result<CoverageNode, CloverError> {
    let root = read_element_tree(content)?;
    if root.name != "coverage" {
        return Err(CloverError::UnexpectedRoot(root.name));
    }
    Ok(normalize(&root))
}

/// Minimal owned element tree, the shape the XML pass hands to normalization
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart) -> Self {
        let attributes = start
            .attributes()
            .filter_map(|a| a.ok())
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                let value = match attr.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
                };
                (key, value)
            })
            .collect();

        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).to_string(),
            attributes,
            children: Vec::new(),
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    fn number(&self, key: &str) -> f64 {
        self.attr(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    }
}

fn read_element_tree(content: &str) -> std::result::Result<Element, CloverError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => stack.push(Element::from_start(e)),
            Event::Empty(ref e) => attach(&mut stack, &mut root, Element::from_start(e)),
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(CloverError::Unclosed(open.name));
    }

    root.ok_or(CloverError::Empty)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Project groups win over package groups; a node with neither holds files.
fn normalize(element: &Element) -> CoverageNode {
    for group in ["project", "package"] {
        let children: Vec<CoverageNode> = element.children_named(group).map(normalize).collect();
        if !children.is_empty() {
            return CoverageNode::Group(children);
        }
    }

    CoverageNode::Files(element.children_named("file").map(file_record).collect())
}

fn file_record(element: &Element) -> FileRecord {
    let path = element
        .attr("path")
        .or_else(|| element.attr("name"))
        .unwrap_or_default()
        .to_string();

    let metrics = element
        .children_named("metrics")
        .next()
        .map(|m| FileMetrics {
            statements: m.number("statements"),
            covered_statements: m.number("coveredstatements"),
            conditionals: m.number("conditionals"),
            covered_conditionals: m.number("coveredconditionals"),
            methods: m.number("methods"),
            covered_methods: m.number("coveredmethods"),
        })
        .unwrap_or_default();

    let lines = element
        .children_named("line")
        .map(|line| LineRecord {
            number: line.attr("num").and_then(|v| v.parse().ok()).unwrap_or(0),
            count: line.attr("count").and_then(|v| v.parse().ok()).unwrap_or(0),
            kind: line.attr("type").map(LineKind::from_attr).unwrap_or_default(),
        })
        .collect();

    FileRecord { path, metrics, lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const NESTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<coverage generated="1700000000" clover="3.2.0">
  <project timestamp="1700000000" name="All files">
    <metrics statements="30" coveredstatements="25" conditionals="4" coveredconditionals="2" methods="6" coveredmethods="5"/>
    <package name="src">
      <metrics statements="20" coveredstatements="18"/>
      <file name="one.js" path="/repo/src/one.js">
        <metrics statements="10" coveredstatements="10" conditionals="2" coveredconditionals="1" methods="3" coveredmethods="3"/>
        <line num="1" count="4" type="stmt"/>
        <line num="2" count="0" type="cond" truecount="0" falsecount="1"/>
      </file>
      <file name="two.js" path="/repo/src/two.js">
        <metrics statements="10" coveredstatements="8" conditionals="0" coveredconditionals="0" methods="0" coveredmethods="0"/>
      </file>
    </package>
    <package name="lib">
      <file name="three.js" path="/repo/lib/three.js">
        <metrics statements="10" coveredstatements="7"/>
        <line num="7" count="1" type="method"/>
      </file>
    </package>
  </project>
</coverage>"#;

    fn paths(tree: &CoverageNode) -> Vec<String> {
        tree.flatten().iter().map(|f| f.path.clone()).collect()
    }

    #[test]
    fn test_parse_nested_clover() {
        let tree = parse_clover_string(NESTED).unwrap();

        assert_eq!(
            paths(&tree),
            vec!["/repo/src/one.js", "/repo/src/two.js", "/repo/lib/three.js"]
        );

        let files = tree.flatten();
        let one = files[0];
        assert_eq!(one.metrics.statements, 10.0);
        assert_eq!(one.metrics.covered_conditionals, 1.0);
        assert_eq!(one.lines.len(), 2);
        assert_eq!(one.lines[1].number, 2);
        assert_eq!(one.lines[1].count, 0);
        assert_eq!(one.lines[1].kind, LineKind::Conditional);

        let two = files[1];
        assert!(two.lines.is_empty());
    }

    #[test]
    fn test_missing_metric_attributes_are_nan() {
        let tree = parse_clover_string(NESTED).unwrap();
        let three = tree.flatten()[2];

        assert_eq!(three.metrics.statements, 10.0);
        assert!(three.metrics.conditionals.is_nan());
        assert!(three.metrics.covered_methods.is_nan());
        assert_eq!(three.lines[0].kind, LineKind::Method);
    }

    #[test]
    fn test_parse_files_without_grouping() {
        let xml = r#"<coverage>
  <file path="a.js"><metrics statements="1" coveredstatements="1"/></file>
  <file path="b.js"/>
</coverage>"#;

        let tree = parse_clover_string(xml).unwrap();
        assert!(matches!(tree, CoverageNode::Files(_)));
        assert_eq!(paths(&tree), vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_sibling_projects_and_deep_packages() {
        let xml = r#"<coverage>
  <project name="first">
    <package name="outer">
      <package name="inner">
        <file path="deep.js"/>
      </package>
    </package>
  </project>
  <project name="second">
    <file path="flat.js"/>
  </project>
</coverage>"#;

        let tree = parse_clover_string(xml).unwrap();
        assert_eq!(paths(&tree), vec!["deep.js", "flat.js"]);
    }

    #[test]
    fn test_project_takes_priority_over_package() {
        let xml = r#"<coverage>
  <package name="ignored"><file path="pkg.js"/></package>
  <project name="kept"><file path="proj.js"/></project>
</coverage>"#;

        let tree = parse_clover_string(xml).unwrap();
        assert_eq!(paths(&tree), vec!["proj.js"]);
    }

    #[test]
    fn test_empty_coverage_element() {
        let tree = parse_clover_string("<coverage/>").unwrap();
        assert_eq!(tree, CoverageNode::Files(vec![]));
    }

    #[test]
    fn test_escaped_path_attribute() {
        let xml = r#"<coverage><file path="src/a&amp;b.js"/></coverage>"#;
        let tree = parse_clover_string(xml).unwrap();
        assert_eq!(paths(&tree), vec!["src/a&b.js"]);
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = parse_clover_string("<report><file path=\"a.js\"/></report>").unwrap_err();
        assert!(matches!(err, CloverError::UnexpectedRoot(ref name) if name == "report"));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let err = parse_clover_string("<coverage><project></coverage>").unwrap_err();
        assert!(matches!(err, CloverError::Xml(_)));

        let err = parse_clover_string("<coverage><project>").unwrap_err();
        assert!(matches!(err, CloverError::Unclosed(_) | CloverError::Xml(_)));

        let err = parse_clover_string("").unwrap_err();
        assert!(matches!(err, CloverError::Empty));
    }

    #[test]
    fn test_load_report_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_report(&dir.path().join("coverage/clover.xml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_report_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clover.xml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(NESTED.as_bytes()).unwrap();

        let tree = load_report(&path).unwrap().unwrap();
        assert_eq!(tree.flatten().len(), 3);
    }

    #[test]
    fn test_load_report_parse_failure_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clover.xml");
        fs::write(&path, "<coverage><file>").unwrap();

        let err = load_report(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse coverage report"));
    }
}
