//! Parser for selection expressions.
//!
//! Grammar (an XPath subset):
//!
//! ```text
//! expr      := ('/' | '//')? step (('/' | '//') step)*
//! step      := name-test ('[' position ']')?
//! name-test := '*' | NAME | PREFIX ':' NAME | PREFIX ':' '*'
//! ```

use super::SelectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    /// Unprefixed; matches on local name whatever the element's prefix.
    Local(String),
    Qualified { prefix: String, local: String },
    PrefixAny(String),
}

impl NameTest {
    pub fn matches(&self, name: &str) -> bool {
        let (prefix, local) = match name.split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, name),
        };
        match self {
            NameTest::Any => true,
            NameTest::Local(expected) => local == expected,
            NameTest::Qualified {
                prefix: expected_prefix,
                local: expected_local,
            } => prefix == Some(expected_prefix.as_str()) && local == expected_local,
            NameTest::PrefixAny(expected_prefix) => prefix == Some(expected_prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub test: NameTest,
    /// 1-based position among the step's matches for one context node.
    pub position: Option<usize>,
}

/// A parsed selection expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionExpression {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

impl SelectionExpression {
    pub fn parse(expression: &str) -> Result<Self, SelectorError> {
        let source = expression.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }
        let chars: Vec<char> = source.chars().collect();
        let mut pos = 0;

        let (absolute, mut axis) = match read_separator(&chars, &mut pos) {
            Some(axis) => (true, axis),
            None => (false, Axis::Child),
        };

        let mut steps = Vec::new();
        loop {
            if pos >= chars.len() {
                return Err(SelectorError::DanglingSeparator(source.to_string()));
            }
            let test = read_name_test(source, &chars, &mut pos)?;
            let position = read_predicate(&chars, &mut pos)?;
            steps.push(Step {
                axis,
                test,
                position,
            });

            if pos >= chars.len() {
                break;
            }
            axis = read_separator(&chars, &mut pos).ok_or_else(|| {
                SelectorError::UnexpectedToken {
                    expression: source.to_string(),
                    position: pos,
                    found: chars[pos].to_string(),
                }
            })?;
        }

        Ok(Self {
            source: source.to_string(),
            absolute,
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl std::fmt::Display for SelectionExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for SelectionExpression {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn read_separator(chars: &[char], pos: &mut usize) -> Option<Axis> {
    if chars.get(*pos) != Some(&'/') {
        return None;
    }
    if chars.get(*pos + 1) == Some(&'/') {
        *pos += 2;
        Some(Axis::Descendant)
    } else {
        *pos += 1;
        Some(Axis::Child)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '*')
}

fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn read_name_test(
    source: &str,
    chars: &[char],
    pos: &mut usize,
) -> Result<NameTest, SelectorError> {
    let start = *pos;
    while *pos < chars.len() && is_name_char(chars[*pos]) {
        *pos += 1;
    }
    if start == *pos {
        return Err(SelectorError::UnexpectedToken {
            expression: source.to_string(),
            position: start,
            found: chars[start].to_string(),
        });
    }
    let raw: String = chars[start..*pos].iter().collect();

    if raw == "*" {
        return Ok(NameTest::Any);
    }
    match raw.split_once(':') {
        Some((prefix, "*")) if is_ncname(prefix) => Ok(NameTest::PrefixAny(prefix.to_string())),
        Some((prefix, local)) if is_ncname(prefix) && is_ncname(local) => {
            Ok(NameTest::Qualified {
                prefix: prefix.to_string(),
                local: local.to_string(),
            })
        }
        None if is_ncname(&raw) => Ok(NameTest::Local(raw)),
        _ => Err(SelectorError::InvalidName(raw)),
    }
}

fn read_predicate(chars: &[char], pos: &mut usize) -> Result<Option<usize>, SelectorError> {
    if chars.get(*pos) != Some(&'[') {
        return Ok(None);
    }
    let start = *pos + 1;
    let end = chars[start..]
        .iter()
        .position(|c| *c == ']')
        .map(|offset| start + offset)
        .ok_or_else(|| SelectorError::InvalidPredicate(chars[*pos..].iter().collect()))?;
    let raw: String = chars[start..end].iter().collect();
    let position = raw
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| SelectorError::InvalidPredicate(raw.clone()))?;
    *pos = end + 1;
    Ok(Some(position))
}
