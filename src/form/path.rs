use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_json::{Map, Value};

use super::controller::{FormError, FormResult};

/// Largest array index a path may address. Numeric dotted keys above it are
/// object keys, not indices.
pub const MAX_PATH_INDEX: usize = 9_999;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn key(&self) -> String {
        match self {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        }
    }

    fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(key) => key.parse().ok().filter(|index| *index <= MAX_PATH_INDEX),
        }
    }
}

/// Dotted / indexed key path into a nested values tree, e.g.
/// `metadata.creators[0].affiliations`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> FormResult<Self> {
        let invalid = |reason: &'static str| FormError::InvalidPath {
            path: raw.to_string(),
            reason,
        };
        if raw.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };
            if name.is_empty() && rest.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !name.is_empty() {
                segments.push(PathSegment::Key(name.to_string()));
            }
            while !rest.is_empty() {
                let Some(stripped) = rest.strip_prefix('[') else {
                    return Err(invalid("unexpected characters after index"));
                };
                let Some(close) = stripped.find(']') else {
                    return Err(invalid("unterminated index"));
                };
                let index = stripped[..close]
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| invalid("index is not a number"))?;
                if index > MAX_PATH_INDEX {
                    return Err(invalid("index too large"));
                }
                segments.push(PathSegment::Index(index));
                rest = &stripped[close + 1..];
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn get_in<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        let mut current = tree;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => match segment {
                    PathSegment::Key(key) => map.get(key)?,
                    PathSegment::Index(_) => map.get(&segment.key())?,
                },
                Value::Array(items) => items.get(segment.as_index()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn set_in(&self, tree: &mut Value, value: Value) {
        let mut current = tree;
        for segment in &self.segments {
            current = child_slot(current, segment);
        }
        *current = value;
    }
}

fn child_slot<'a>(node: &'a mut Value, segment: &PathSegment) -> &'a mut Value {
    if !node.is_object() && !node.is_array() {
        *node = match segment.as_index() {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Object(Map::new()),
        };
    }
    match (node, segment.as_index()) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (node, _) => {
            // Named keys cannot live in an array; the node becomes an object.
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            &mut node[segment.key().as_str()]
        }
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if position == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
