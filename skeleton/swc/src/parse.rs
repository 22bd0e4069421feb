//! SWC reader.
//!
//! A line whose first token is an integer is a node line
//! `id type x y z radius parent` and must carry exactly seven fields. A
//! `scale sx sy sz` directive (optionally behind a `#`) multiplies the
//! positions of every following node. Every other line is preamble and is
//! kept verbatim.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;
use mesh_types::{Point3, Vector3};
use tracing::{debug, warn};

use crate::error::{SwcError, SwcResult};
use crate::node::{NodeType, SkeletonNode, SkeletonRecord, SwcWarning};
use crate::options::{ParseOptions, RadiusPolicy, RootTypePolicy};

/// A node line before ids are resolved.
struct RawNode {
    line: usize,
    id: i64,
    code: i32,
    position: Point3<f64>,
    radius: f64,
    parent: i64,
}

enum Line {
    Node(RawNode),
    Scale(Vector3<f64>),
    Preamble,
}

/// Parse SWC text.
///
/// # Errors
///
/// Returns a parse error for malformed node lines and a structural error
/// for broken references or unrepairable radii.
///
/// # Example
///
/// ```
/// use swc::{ParseOptions, parse_swc};
///
/// let text = "# soma with one neurite\n1 1 0 0 0 5 -1\n2 2 0 0 20 2 1\n";
/// let record = parse_swc(text, &ParseOptions::default()).unwrap();
/// assert_eq!(record.len(), 2);
/// assert_eq!(record.nodes[1].parent, Some(0));
/// ```
pub fn parse_swc(text: &str, options: &ParseOptions) -> SwcResult<SkeletonRecord> {
    read_swc(text.as_bytes(), options)
}

/// Parse an SWC file.
///
/// # Errors
///
/// As [`parse_swc`], plus I/O errors.
pub fn load_swc<P: AsRef<Path>>(path: P, options: &ParseOptions) -> SwcResult<SkeletonRecord> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading skeleton");
    let file = File::open(path)?;
    read_swc(BufReader::new(file), options)
}

/// Parse SWC text from a reader.
///
/// # Errors
///
/// As [`parse_swc`], plus I/O errors.
pub fn read_swc<R: BufRead>(reader: R, options: &ParseOptions) -> SwcResult<SkeletonRecord> {
    let mut raw = Vec::new();
    let mut preamble = Vec::new();
    let mut scale = Vector3::new(1.0, 1.0, 1.0);

    for (idx, line) in reader.lines().enumerate() {
        let text = line?;
        let number = idx + 1;
        match classify(&text, number)? {
            Line::Node(mut node) => {
                if raw.is_empty() && options.strict_first_root && node.parent > 0 {
                    return Err(SwcError::FirstNodeNotRoot {
                        line: number,
                        parent: node.parent,
                    });
                }
                node.position.coords.component_mul_assign(&scale);
                raw.push(node);
            }
            Line::Scale(s) => scale = s,
            Line::Preamble => preamble.push(text),
        }
    }

    let mut warnings = Vec::new();
    let nodes = resolve(&raw, options, &mut warnings)?;
    debug!(nodes = nodes.len(), preamble = preamble.len(), "parsed skeleton");
    Ok(SkeletonRecord {
        nodes,
        preamble,
        warnings,
    })
}

fn classify(text: &str, line: usize) -> SwcResult<Line> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Ok(Line::Preamble);
    };

    if first.parse::<i64>().is_ok() {
        return parse_node(&tokens, line).map(Line::Node);
    }

    let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    if lower[0] == "scale" {
        return parse_scale(&tokens[1..])
            .map(Line::Scale)
            .ok_or(SwcError::InvalidScale { line });
    }
    if lower[0] == "#" && lower.get(1).is_some_and(|t| t == "scale") {
        if let Some(scale) = parse_scale(&tokens[2..]) {
            return Ok(Line::Scale(scale));
        }
    }
    Ok(Line::Preamble)
}

fn parse_scale(tokens: &[&str]) -> Option<Vector3<f64>> {
    if tokens.len() < 3 {
        return None;
    }
    let x = tokens[0].parse().ok()?;
    let y = tokens[1].parse().ok()?;
    let z = tokens[2].parse().ok()?;
    Some(Vector3::new(x, y, z))
}

fn parse_node(tokens: &[&str], line: usize) -> SwcResult<RawNode> {
    if tokens.len() != 7 {
        return Err(SwcError::FieldCount {
            line,
            found: tokens.len(),
        });
    }

    let id: i64 = field(tokens[0], "id", line)?;
    if id <= 0 {
        return Err(SwcError::InvalidId { line, id });
    }

    Ok(RawNode {
        line,
        id,
        code: field(tokens[1], "type", line)?,
        position: Point3::new(
            field(tokens[2], "x", line)?,
            field(tokens[3], "y", line)?,
            field(tokens[4], "z", line)?,
        ),
        radius: field(tokens[5], "radius", line)?,
        parent: field(tokens[6], "parent", line)?,
    })
}

fn field<T: std::str::FromStr>(token: &str, name: &'static str, line: usize) -> SwcResult<T> {
    token.parse().map_err(|_| SwcError::InvalidField {
        line,
        field: name,
        value: token.to_string(),
    })
}

fn note(warnings: &mut Vec<SwcWarning>, warning: SwcWarning) {
    warn!(%warning, "skeleton repaired");
    warnings.push(warning);
}

fn resolve(
    raw: &[RawNode],
    options: &ParseOptions,
    warnings: &mut Vec<SwcWarning>,
) -> SwcResult<Vec<SkeletonNode>> {
    let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(raw.len());
    for (i, node) in raw.iter().enumerate() {
        if index_of.insert(node.id, i).is_some() {
            return Err(SwcError::DuplicateId { id: node.id });
        }
    }

    let mut nodes = Vec::with_capacity(raw.len());
    for node in raw {
        let parent = if node.parent <= 0 {
            None
        } else {
            Some(
                *index_of
                    .get(&node.parent)
                    .ok_or(SwcError::MissingParent {
                        id: node.id,
                        parent: node.parent,
                    })?,
            )
        };

        let mut node_type = NodeType::from_code(node.code);
        if !(-1..=7).contains(&node.code) {
            note(
                warnings,
                SwcWarning::UnknownType {
                    id: node.id,
                    code: node.code,
                },
            );
        }
        if parent.is_none() && node_type != NodeType::Soma {
            node_type = match options.root_policy {
                RootTypePolicy::SyntheticRoot => {
                    if node_type != NodeType::SyntheticRoot {
                        note(
                            warnings,
                            SwcWarning::SyntheticRoot {
                                id: node.id,
                                original: node.code,
                            },
                        );
                    }
                    NodeType::SyntheticRoot
                }
                RootTypePolicy::Soma => {
                    note(
                        warnings,
                        SwcWarning::RootCoercedToSoma {
                            id: node.id,
                            original: node.code,
                        },
                    );
                    NodeType::Soma
                }
            };
        }

        nodes.push(SkeletonNode::new(
            node.position,
            node.radius,
            node_type,
            parent,
        ));
    }

    repair_radii(raw, &mut nodes, options, warnings)?;
    Ok(nodes)
}

fn repair_radii(
    raw: &[RawNode],
    nodes: &mut [SkeletonNode],
    options: &ParseOptions,
    warnings: &mut Vec<SwcWarning>,
) -> SwcResult<()> {
    let eps = options.radius_epsilon;

    if options.radius_policy == RadiusPolicy::FlipSign {
        for (node, source) in nodes.iter_mut().zip(raw) {
            if node.radius <= -eps {
                node.radius = -node.radius;
                note(
                    warnings,
                    SwcWarning::RadiusSignFlipped {
                        id: source.id,
                        original: source.radius,
                    },
                );
            }
        }
    }

    let mut usable: Vec<bool> = nodes.iter().map(|n| n.radius >= eps).collect();
    for i in 0..nodes.len() {
        if usable[i] {
            continue;
        }
        let source = &raw[i];
        if options.radius_policy == RadiusPolicy::Reject {
            return Err(SwcError::InvalidRadius {
                id: source.id,
                radius: source.radius,
            });
        }

        let unrepairable = SwcError::UnrepairableRadius {
            id: source.id,
            radius: source.radius,
        };
        let mut ancestor = nodes[i].parent;
        let mut steps = 0;
        let repaired = loop {
            let Some(p) = ancestor else {
                return Err(unrepairable);
            };
            if usable[p] {
                break nodes[p].radius;
            }
            steps += 1;
            if steps > nodes.len() {
                return Err(unrepairable);
            }
            ancestor = nodes[p].parent;
        };

        debug!(line = source.line, repaired, "inheriting radius");
        nodes[i].radius = repaired;
        usable[i] = true;
        note(
            warnings,
            SwcWarning::RadiusInherited {
                id: source.id,
                original: source.radius,
                repaired,
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> SwcResult<SkeletonRecord> {
        parse_swc(text, &ParseOptions::default())
    }

    #[test]
    fn three_node_skeleton() {
        let record = parse("1 1 0 0 0 5 -1\n2 2 0 0 10 2 1\n3 2 0 0 20 2 2\n").unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.nodes[0].node_type, NodeType::Soma);
        assert_eq!(record.nodes[2].parent, Some(1));
        assert_relative_eq!(record.nodes[2].position.z, 20.0);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn preamble_kept_verbatim() {
        let text = "# ORIGINAL_SOURCE tracer\n#  spaced   comment \n\n1 1 0 0 0 1 -1\n";
        let record = parse(text).unwrap();
        assert_eq!(
            record.preamble,
            vec!["# ORIGINAL_SOURCE tracer", "#  spaced   comment ", ""]
        );
    }

    #[test]
    fn six_fields_is_a_parse_error() {
        let err = parse("1 1 0 0 0 5 -1\n2 2 0 0 20 2\n").unwrap_err();
        assert!(matches!(err, SwcError::FieldCount { line: 2, found: 6 }));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn non_numeric_field() {
        let err = parse("1 1 0 zero 0 5 -1\n").unwrap_err();
        assert!(matches!(
            err,
            SwcError::InvalidField {
                line: 1,
                field: "y",
                ..
            }
        ));
    }

    #[test]
    fn scale_applies_to_following_nodes() {
        let record = parse("# SCALE 2 1 0.5\n1 1 1 1 1 1 -1\n").unwrap();
        assert_relative_eq!(record.nodes[0].position.x, 2.0);
        assert_relative_eq!(record.nodes[0].position.z, 0.5);
        assert!(record.preamble.is_empty());

        let record = parse("scale 3 3 3\n1 1 1 0 0 1 -1\n").unwrap();
        assert_relative_eq!(record.nodes[0].position.x, 3.0);

        assert!(matches!(
            parse("scale 1 x 1\n"),
            Err(SwcError::InvalidScale { line: 1 })
        ));
    }

    #[test]
    fn strict_first_root() {
        let text = "2 2 0 0 1 1 1\n1 1 0 0 0 1 -1\n";
        assert!(matches!(
            parse(text),
            Err(SwcError::FirstNodeNotRoot { line: 1, parent: 1 })
        ));

        let lenient = ParseOptions::default().with_strict_first_root(false);
        let record = parse_swc(text, &lenient).unwrap();
        assert_eq!(record.nodes[0].parent, Some(1));
    }

    #[test]
    fn non_soma_root_policies() {
        let text = "1 3 0 0 0 1 -1\n2 3 0 0 1 1 1\n";
        let record = parse(text).unwrap();
        assert_eq!(record.nodes[0].node_type, NodeType::SyntheticRoot);
        assert_eq!(
            record.warnings,
            vec![SwcWarning::SyntheticRoot { id: 1, original: 3 }]
        );

        let soma = ParseOptions::default().with_root_policy(RootTypePolicy::Soma);
        let record = parse_swc(text, &soma).unwrap();
        assert_eq!(record.nodes[0].node_type, NodeType::Soma);
        assert!(matches!(
            record.warnings[0],
            SwcWarning::RootCoercedToSoma { id: 1, .. }
        ));
    }

    #[test]
    fn zero_parent_is_a_root() {
        let record = parse("1 1 0 0 0 1 0\n").unwrap();
        assert!(record.nodes[0].is_root());
    }

    #[test]
    fn tiny_radius_inherits_from_parent() {
        let record = parse("1 1 0 0 0 5 -1\n2 2 0 0 1 1e-6 1\n").unwrap();
        assert_relative_eq!(record.nodes[1].radius, 5.0);
        assert!(matches!(
            record.warnings[0],
            SwcWarning::RadiusInherited { id: 2, .. }
        ));
    }

    #[test]
    fn tiny_radius_skips_repaired_ancestors_in_order() {
        let record = parse("1 1 0 0 0 4 -1\n2 2 0 0 1 0 1\n3 2 0 0 2 0 2\n").unwrap();
        assert_relative_eq!(record.nodes[2].radius, 4.0);
        assert_eq!(record.warnings.len(), 2);
    }

    #[test]
    fn tiny_root_radius_is_fatal() {
        let err = parse("1 1 0 0 0 1e-6 -1\n2 2 0 0 1 1 1\n").unwrap_err();
        assert!(matches!(err, SwcError::UnrepairableRadius { id: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn radius_policies() {
        let text = "1 1 0 0 0 2 -1\n2 2 0 0 1 -0.5 1\n";
        let flip = ParseOptions::default().with_radius_policy(RadiusPolicy::FlipSign);
        let record = parse_swc(text, &flip).unwrap();
        assert_relative_eq!(record.nodes[1].radius, 0.5);

        let record = parse(text).unwrap();
        assert_relative_eq!(record.nodes[1].radius, 2.0);

        let reject = ParseOptions::default().with_radius_policy(RadiusPolicy::Reject);
        assert!(matches!(
            parse_swc(text, &reject),
            Err(SwcError::InvalidRadius { id: 2, .. })
        ));
    }

    #[test]
    fn unknown_type_warns() {
        let record = parse("1 1 0 0 0 1 -1\n2 12 0 0 1 1 1\n").unwrap();
        assert_eq!(record.nodes[1].node_type, NodeType::Unknown(12));
        assert_eq!(
            record.warnings,
            vec![SwcWarning::UnknownType { id: 2, code: 12 }]
        );
    }

    #[test]
    fn broken_references() {
        assert!(matches!(
            parse("1 1 0 0 0 1 -1\n2 2 0 0 1 1 7\n"),
            Err(SwcError::MissingParent { id: 2, parent: 7 })
        ));
        assert!(matches!(
            parse("1 1 0 0 0 1 -1\n1 2 0 0 1 1 1\n"),
            Err(SwcError::DuplicateId { id: 1 })
        ));
        assert!(matches!(
            parse("0 1 0 0 0 1 -1\n"),
            Err(SwcError::InvalidId { line: 1, id: 0 })
        ));
    }

    #[test]
    fn sparse_ids_are_resolved() {
        let record = parse("10 1 0 0 0 1 -1\n42 2 0 0 1 1 10\n7 2 0 0 2 1 42\n").unwrap();
        assert_eq!(record.nodes[1].parent, Some(0));
        assert_eq!(record.nodes[2].parent, Some(1));
    }

    #[test]
    fn missing_file() {
        let err = load_swc("/nonexistent/cell.swc", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
