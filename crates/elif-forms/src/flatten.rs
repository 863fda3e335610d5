//! Flat key restructuring
//!
//! Form bodies arrive as flat `name=value` pairs. Field names use `.` to
//! imply nesting and `[]` to mark repeatable fields:
//!
//! ```text
//! user.name=bob
//! user.tags[]=admin
//! input.test_list.1=b
//! input.test_list.0=a
//! ```
//!
//! decodes to `{"user": {"name": "bob", "tags": ["admin"]},
//! "input": {"test_list": ["a", "b"]}}`. Every leaf stays a string.

use crate::error::{FormError, FormResult};
use crate::value::FormValue;
use std::collections::BTreeMap;

/// Intermediate tree built while pairs are applied.
///
/// `Indexed` collects numbered children of an array container until the
/// whole body has been read; it is ordered by index when finalized and
/// gaps are dropped.
#[derive(Debug)]
enum Slot {
    Leaf(String),
    List(Vec<Slot>),
    Named(BTreeMap<String, Slot>),
    Indexed(BTreeMap<u64, Slot>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Named,
    Indexed,
}

impl Slot {
    fn container(kind: Container) -> Self {
        match kind {
            Container::Named => Slot::Named(BTreeMap::new()),
            Container::Indexed => Slot::Indexed(BTreeMap::new()),
        }
    }

    fn is(&self, kind: Container) -> bool {
        matches!(
            (self, kind),
            (Slot::Named(_), Container::Named) | (Slot::Indexed(_), Container::Indexed)
        )
    }

    /// Child slot addressed by `segment`, created with the `kind` container
    /// when missing. A child of a different shape is replaced.
    fn descend(&mut self, segment: &str, kind: Container) -> Option<&mut Slot> {
        let child = match self {
            Slot::Named(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Slot::container(kind)),
            Slot::Indexed(map) => map
                .entry(parse_index(segment)?)
                .or_insert_with(|| Slot::container(kind)),
            Slot::Leaf(_) | Slot::List(_) => return None,
        };
        if !child.is(kind) {
            tracing::trace!(segment, "replacing conflicting form node with container");
            *child = Slot::container(kind);
        }
        Some(child)
    }

    /// Apply the final segment of a key
    fn assign(&mut self, segment: &str, value: String) {
        match self {
            Slot::Indexed(map) => {
                if let Some(index) = parse_index(segment) {
                    map.insert(index, Slot::Leaf(value));
                }
            }
            Slot::Named(map) => {
                if let Some(name) = segment.strip_suffix("[]") {
                    append(map, name, value);
                } else if let Some(existing) = map.get_mut(segment) {
                    promote(existing, value);
                } else {
                    map.insert(segment.to_string(), Slot::Leaf(value));
                }
            }
            Slot::Leaf(_) | Slot::List(_) => {}
        }
    }

    /// Walk `segments` below this container, creating containers as
    /// needed, and apply the last segment
    fn insert(&mut self, segments: &[&str], value: String) {
        match segments {
            [] => {}
            [last] => self.assign(last, value),
            [segment, rest @ ..] => {
                let kind = if is_index(rest[0]) {
                    Container::Indexed
                } else {
                    Container::Named
                };
                match self.descend(segment, kind) {
                    Some(child) => child.insert(rest, value),
                    None => tracing::trace!(segment, "dropping form key with unusable path"),
                }
            }
        }
    }

    fn finalize(self) -> FormValue {
        match self {
            Slot::Leaf(value) => FormValue::Scalar(value),
            Slot::List(items) => FormValue::Array(items.into_iter().map(Slot::finalize).collect()),
            Slot::Named(map) => {
                FormValue::Object(map.into_iter().map(|(k, v)| (k, v.finalize())).collect())
            }
            Slot::Indexed(map) => FormValue::Array(map.into_values().map(Slot::finalize).collect()),
        }
    }
}

/// `name[]=value`: always an array under `name`, even for one value
fn append(map: &mut BTreeMap<String, Slot>, name: &str, value: String) {
    match map.get_mut(name) {
        Some(Slot::List(items)) => items.push(Slot::Leaf(value)),
        Some(existing) => promote(existing, value),
        None => {
            map.insert(name.to_string(), Slot::List(vec![Slot::Leaf(value)]));
        }
    }
}

/// A repeated key turns the existing value into a list
fn promote(existing: &mut Slot, value: String) {
    if let Slot::List(items) = existing {
        items.push(Slot::Leaf(value));
        return;
    }
    let previous = std::mem::replace(existing, Slot::List(Vec::with_capacity(2)));
    if let Slot::List(items) = existing {
        items.push(previous);
        items.push(Slot::Leaf(value));
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn parse_index(segment: &str) -> Option<u64> {
    if is_index(segment) {
        segment.parse().ok()
    } else {
        None
    }
}

/// Restructure flat dotted keys into a nested object.
///
/// Pairs are applied in order. A segment followed by a numeric segment
/// names an array; numeric positions only order the elements, so sparse
/// or out-of-order submissions yield a dense array. Shapes that conflict
/// (a key used both as a leaf and as a container) never fail here; the
/// later key wins and validators reject whatever results.
pub fn unflatten<I, K, V>(pairs: I) -> FormValue
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut root = Slot::Named(BTreeMap::new());

    for (key, value) in pairs {
        let segments: Vec<&str> = key.as_ref().split('.').collect();
        root.insert(&segments, value.into());
    }

    root.finalize()
}

/// Decode an `application/x-www-form-urlencoded` body and restructure it
pub fn decode_urlencoded(body: &[u8]) -> FormResult<FormValue> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(|e| FormError::MalformedBody(e.to_string()))?;
    Ok(unflatten(pairs))
}
