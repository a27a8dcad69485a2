//! Parser for the Graphviz DOT text printed by `terraform graph`.
//!
//! Only the statements that matter for a dependency graph are interpreted:
//! node declarations (`"id" [label = "..."]`) and edges (`"a" -> "b"`).
//! Graph headers, subgraph openers, braces, graph attributes and default
//! attribute statements (`node [...]`) are recognised and skipped.

pub mod lexer;

use std::collections::HashMap;
use tracing::debug;

use crate::error::{TfGraphError, TfGraphResult};
use crate::graph::model::Graph;
use crate::graph::GraphBuilder;
use lexer::{tokenize_line, Token};

/// Options controlling how edge endpoints are resolved.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Create nodes for edge endpoints that are never declared. When false an
    /// undeclared endpoint is an integrity error.
    pub implicit_nodes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { implicit_nodes: true }
    }
}

/// An interpreted DOT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Statement {
    Node {
        name: String,
        label: Option<String>,
    },
    Edge {
        line: usize,
        chain: Vec<String>,
        label: Option<String>,
    },
}

/// Parse DOT text with default options.
pub fn parse_dot(input: &str) -> TfGraphResult<Graph> {
    parse_dot_with(input, &ParseOptions::default())
}

/// Parse DOT text into a canonical graph.
pub fn parse_dot_with(input: &str, options: &ParseOptions) -> TfGraphResult<Graph> {
    let statements = scan(input)?;

    let mut builder = GraphBuilder::new();
    let mut duplicate_edges = 0usize;

    for stmt in &statements {
        match stmt {
            Statement::Node { name, label } => {
                builder.declare_node(name, label.as_deref());
            }
            Statement::Edge { line, chain, label } => {
                let mut ids = Vec::with_capacity(chain.len());
                for endpoint in chain {
                    let id = match builder.lookup(endpoint) {
                        Some(id) => id,
                        None if options.implicit_nodes => builder.declare_node(endpoint, None),
                        None => {
                            return Err(TfGraphError::integrity(format!(
                                "line {}: edge references node '{}' that has not yet been declared",
                                line, endpoint
                            )));
                        }
                    };
                    ids.push(id);
                }

                for pair in ids.windows(2) {
                    if !builder.add_edge(pair[0], pair[1], label.clone()) {
                        duplicate_edges += 1;
                    }
                }
            }
        }
    }

    let graph = builder.build();
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        duplicate_edges,
        "Parsed DOT graph"
    );
    Ok(graph)
}

/// Tokenize every line and keep the node and edge statements.
fn scan(input: &str) -> TfGraphResult<Vec<Statement>> {
    let mut statements = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let tokens = tokenize_line(line, line_no)?;

        for segment in split_segments(&tokens) {
            if let Some(stmt) = interpret(segment, line_no)? {
                statements.push(stmt);
            }
        }
    }

    Ok(statements)
}

/// Split a token line into statement segments on `;`, `{` and `}`, dropping
/// graph and subgraph headers (the segment right before a `{`).
fn split_segments(tokens: &[Token]) -> Vec<&[Token]> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Semicolon | Token::RBrace => {
                segments.push(&tokens[start..i]);
                start = i + 1;
            }
            Token::LBrace => {
                // Whatever precedes `{` is a `digraph`/`subgraph` header.
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&tokens[start..]);

    segments.into_iter().filter(|s| !s.is_empty()).collect()
}

fn interpret(tokens: &[Token], line: usize) -> TfGraphResult<Option<Statement>> {
    let first = &tokens[0];

    // Default attribute statements: node [...], edge [...], graph [...]
    if ["node", "edge", "graph"].iter().any(|kw| first.is_keyword(kw)) {
        return Ok(None);
    }

    // Graph headers without a brace on the same line.
    if ["digraph", "subgraph", "strict"].iter().any(|kw| first.is_keyword(kw)) {
        return Ok(None);
    }

    if tokens.contains(&Token::UndirectedEdge) {
        return Err(TfGraphError::parse(line, "undirected edge '--' in a dependency graph"));
    }

    // Graph attribute: key = value
    if tokens.len() >= 2 && tokens[1] == Token::Equals {
        return Ok(None);
    }

    let Some(name) = first.as_id() else {
        return Err(TfGraphError::parse(line, format!("unexpected token {:?}", first)));
    };

    if tokens.contains(&Token::Arrow) {
        let mut chain = vec![name.to_string()];
        let mut pos = 1;
        while pos < tokens.len() && tokens[pos] == Token::Arrow {
            let endpoint = tokens
                .get(pos + 1)
                .and_then(Token::as_id)
                .ok_or_else(|| TfGraphError::parse(line, "edge is missing its target"))?;
            chain.push(endpoint.to_string());
            pos += 2;
        }

        let attrs = parse_attributes(&tokens[pos..], line)?;
        return Ok(Some(Statement::Edge {
            line,
            chain,
            label: attrs.get("label").cloned(),
        }));
    }

    let attrs = parse_attributes(&tokens[1..], line)?;
    Ok(Some(Statement::Node {
        name: name.to_string(),
        label: attrs.get("label").cloned(),
    }))
}

/// Parse zero or more `[k = v, ...]` lists. Later keys override earlier ones.
fn parse_attributes(tokens: &[Token], line: usize) -> TfGraphResult<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    let mut pos = 0;

    while pos < tokens.len() {
        if tokens[pos] != Token::LBracket {
            return Err(TfGraphError::parse(
                line,
                format!("expected '[' but found {:?}", tokens[pos]),
            ));
        }
        pos += 1;

        loop {
            match tokens.get(pos) {
                Some(Token::RBracket) => {
                    pos += 1;
                    break;
                }
                Some(Token::Comma) => pos += 1,
                Some(Token::Quoted(key)) | Some(Token::Ident(key)) => {
                    if tokens.get(pos + 1) == Some(&Token::Equals) {
                        let value = match tokens.get(pos + 2) {
                            Some(Token::Quoted(v)) | Some(Token::Ident(v)) => v.clone(),
                            _ => {
                                return Err(TfGraphError::parse(
                                    line,
                                    format!("attribute '{}' is missing a value", key),
                                ))
                            }
                        };
                        attrs.insert(key.clone(), value);
                        pos += 3;
                    } else {
                        attrs.insert(key.clone(), "true".to_string());
                        pos += 1;
                    }
                }
                Some(other) => {
                    return Err(TfGraphError::parse(
                        line,
                        format!("unexpected token {:?} in attribute list", other),
                    ))
                }
                None => return Err(TfGraphError::parse(line, "unterminated attribute list")),
            }
        }
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::NodeId;
    use pretty_assertions::assert_eq;

    const EJEMPLO: &str = r#"digraph G {
  rankdir = "RL";
  node [shape = rect, fontname = "sans-serif"];
  "null_resource.ejemplo_1" [label="null_resource.ejemplo_1"];
  "null_resource.ejemplo_2" [label="null_resource.ejemplo_2"];
  "null_resource.ejemplo_3" [label="null_resource.ejemplo_3"];
  "null_resource.ejemplo_final" [label="null_resource.ejemplo_final"];
  "null_resource.ejemplo_2" -> "null_resource.ejemplo_1";
  "null_resource.ejemplo_final" -> "null_resource.ejemplo_2";
  "null_resource.ejemplo_final" -> "null_resource.ejemplo_3";
}
"#;

    const LEGACY: &str = r#"digraph {
	compound = "true"
	newrank = "true"
	subgraph "root" {
		"[root] aws_instance.web (expand)" [label = "aws_instance.web", shape = "box"]
		"[root] aws_security_group.web (expand)" [label = "aws_security_group.web", shape = "box"]
		"[root] provider[\"registry.terraform.io/hashicorp/aws\"]" [label = "provider[\"registry.terraform.io/hashicorp/aws\"]", shape = "diamond"]
		"[root] aws_instance.web (expand)" -> "[root] aws_security_group.web (expand)"
		"[root] aws_instance.web (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] aws_security_group.web (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] root" -> "[root] aws_instance.web (expand)"
	}
}
"#;

    #[test]
    fn test_ejemplo_graph() {
        let graph = parse_dot(EJEMPLO).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let last = graph.node_by_name("null_resource.ejemplo_final").unwrap();
        assert_eq!(graph.out_degree(last.id), 2);
        assert_eq!(graph.in_degree(last.id), 0);

        let first = graph.node_by_name("null_resource.ejemplo_1").unwrap();
        assert_eq!(graph.out_degree(first.id), 0);
        assert_eq!(graph.in_degree(first.id), 1);

        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_legacy_terraform_output() {
        let graph = parse_dot(LEGACY).unwrap();
        // "[root] root" only appears in an edge.
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);

        let provider = graph
            .node_by_name(r#"[root] provider["registry.terraform.io/hashicorp/aws"]"#)
            .unwrap();
        assert_eq!(provider.label, r#"provider["registry.terraform.io/hashicorp/aws"]"#);
        assert_eq!(graph.in_degree(provider.id), 2);

        let root = graph.node_by_name("[root] root").unwrap();
        assert_eq!(root.label, "[root] root");
        assert_eq!(root.id, NodeId(3));
    }

    #[test]
    fn test_empty_input() {
        let graph = parse_dot("").unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);

        let graph = parse_dot("digraph {\n}\n").unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_implicit_node_creation() {
        let graph = parse_dot(r#""a" [label="A"]
"a" -> "b""#)
        .unwrap();
        assert_eq!(graph.node_count(), 2);
        let b = graph.node_by_name("b").unwrap();
        assert_eq!(b.label, "b");
        assert_eq!(graph.edges[0].source, NodeId(0));
        assert_eq!(graph.edges[0].target, b.id);
    }

    #[test]
    fn test_implicit_nodes_disabled() {
        let options = ParseOptions { implicit_nodes: false };
        let err = parse_dot_with("\"a\" [label=\"A\"]\n\"a\" -> \"b\"\n", &options).unwrap_err();
        assert!(matches!(err, TfGraphError::Integrity(_)));
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_later_declaration_does_not_relabel_implicit_node() {
        let graph = parse_dot("\"a\" [label=\"A\"]\n\"a\" -> \"b\"\n\"b\" [label=\"B\"]\n").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_by_name("b").unwrap().label, "b");
        assert_eq!(graph.node_by_name("b").unwrap().id, NodeId(1));
    }

    #[test]
    fn test_forward_reference_rejected_without_implicit_nodes() {
        let options = ParseOptions { implicit_nodes: false };
        let err = parse_dot_with("\"a\"\n\"a\" -> \"b\"\n\"b\" [label=\"B\"]\n", &options).unwrap_err();
        assert!(matches!(err, TfGraphError::Integrity(_)));
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("not yet been declared"));
    }

    #[test]
    fn test_first_label_wins() {
        let graph = parse_dot("\"a\" [label=\"first\"]\n\"a\" [label=\"second\"]\n").unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].label, "first");
    }

    #[test]
    fn test_duplicate_edges_deduplicated() {
        let graph = parse_dot("\"a\" -> \"b\"\n\"a\" -> \"b\"\n\"a\" -> \"b\" [label=\"again\"]\n").unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].label, None);
    }

    #[test]
    fn test_edge_chain_and_label() {
        let graph = parse_dot("a -> b -> c [label = \"uses\"]").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges.iter().all(|e| e.label.as_deref() == Some("uses")));
    }

    #[test]
    fn test_single_line_graph() {
        let graph = parse_dot(r#"digraph { "a" -> "b"; "b" -> "c" }"#).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_unbalanced_quote_names_line() {
        let input = "digraph {\n  \"a\" [label=\"A\"]\n  \"a\" -> \"b\n}\n";
        match parse_dot(input).unwrap_err() {
            TfGraphError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_attributes() {
        let err = parse_dot("\"a\" [label=\"A\"").unwrap_err();
        assert!(matches!(err, TfGraphError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse_dot(LEGACY).unwrap();
        let second = parse_dot(LEGACY).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invariants_hold() {
        for input in [EJEMPLO, LEGACY, "a -> b\nb -> a\na -> b\nc"] {
            let graph = parse_dot(input).unwrap();
            let mut names: Vec<_> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), graph.node_count());
            graph.validate().unwrap();
        }
    }
}
