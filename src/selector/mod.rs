//! Fragment selection over a body tree.
//!
//! [`select`] evaluates a [`SelectionExpression`] once against a body snapshot
//! and returns [`FragmentHandle`]s in document order.

pub mod expression;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::body::Element;

pub use expression::{Axis, NameTest, SelectionExpression, Step};

/// Malformed selection expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selection expression is empty")]
    Empty,
    #[error("unexpected '{found}' at position {position} in '{expression}'")]
    UnexpectedToken {
        expression: String,
        position: usize,
        found: String,
    },
    #[error("invalid name test '{0}'")]
    InvalidName(String),
    #[error("invalid position predicate '{0}'")]
    InvalidPredicate(String),
    #[error("'{0}' ends with a path separator")]
    DanglingSeparator(String),
}

/// Address of one selected fragment within the body it was selected from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentHandle {
    /// Child indices from the root element; empty for the root itself.
    pub path: Vec<usize>,
    /// 0-based position in the selection.
    pub ordinal: usize,
}

#[derive(Debug, Clone)]
enum Context {
    Document,
    Element(Vec<usize>),
}

/// Evaluate `expression` against `body`.
///
/// A fragment nested inside another selected fragment is dropped so the
/// returned handles never overlap.
pub fn select(body: &Element, expression: &SelectionExpression) -> Vec<FragmentHandle> {
    let mut kept: Vec<Vec<usize>> = Vec::new();
    for path in evaluate(body, expression) {
        if kept.last().map_or(false, |prev| path.starts_with(prev)) {
            continue;
        }
        kept.push(path);
    }
    kept.into_iter()
        .enumerate()
        .map(|(ordinal, path)| FragmentHandle { path, ordinal })
        .collect()
}

/// Parse `expression` and select in one call.
pub fn select_str(body: &Element, expression: &str) -> Result<Vec<FragmentHandle>, SelectorError> {
    let expression = SelectionExpression::parse(expression)?;
    Ok(select(body, &expression))
}

/// The first selected element, if any.
pub fn first_match<'a>(body: &'a Element, expression: &SelectionExpression) -> Option<&'a Element> {
    evaluate(body, expression)
        .into_iter()
        .next()
        .and_then(|path| body.at_path(&path))
}

fn evaluate(body: &Element, expression: &SelectionExpression) -> BTreeSet<Vec<usize>> {
    let mut contexts = if expression.is_absolute() {
        vec![Context::Document]
    } else {
        vec![Context::Element(Vec::new())]
    };
    let mut matched = BTreeSet::new();

    for step in expression.steps() {
        matched = BTreeSet::new();
        for context in &contexts {
            let candidates = candidates(body, context, step);
            match step.position {
                Some(n) => matched.extend(candidates.into_iter().nth(n - 1)),
                None => matched.extend(candidates),
            }
        }
        contexts = matched.iter().cloned().map(Context::Element).collect();
    }
    matched
}

fn candidates(body: &Element, context: &Context, step: &Step) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    match (context, step.axis) {
        (Context::Document, Axis::Child) => {
            if step.test.matches(&body.name) {
                out.push(Vec::new());
            }
        }
        (Context::Document, Axis::Descendant) => {
            if step.test.matches(&body.name) {
                out.push(Vec::new());
            }
            collect_descendants(body, &mut Vec::new(), &step.test, &mut out);
        }
        (Context::Element(path), axis) => {
            let Some(element) = body.at_path(path) else {
                return out;
            };
            match axis {
                Axis::Child => {
                    for (idx, child) in element.child_elements() {
                        if step.test.matches(&child.name) {
                            let mut child_path = path.clone();
                            child_path.push(idx);
                            out.push(child_path);
                        }
                    }
                }
                Axis::Descendant => {
                    collect_descendants(element, &mut path.clone(), &step.test, &mut out);
                }
            }
        }
    }
    out
}

fn collect_descendants(
    element: &Element,
    path: &mut Vec<usize>,
    test: &NameTest,
    out: &mut Vec<Vec<usize>>,
) {
    for (idx, child) in element.child_elements() {
        path.push(idx);
        if test.matches(&child.name) {
            out.push(path.clone());
        }
        collect_descendants(child, path, test, out);
        path.pop();
    }
}
