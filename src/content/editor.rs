//! Path-addressed, copy-on-write edits over a [`Node`] tree.
//!
//! Every page editor (about, placement, admission, fee structure...) manipulates lists of
//! records nested somewhere inside its content document. These helpers are the one place
//! that logic lives. None of them mutate their input: the returned tree shares every
//! container that is not on the path to the edited value.

use super::list;
use super::node::Node;
use super::path::Path;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("`{path}` is not a list")]
    NotAList { path: String },
    #[error("item {index} of `{path}` is not a record")]
    NotARecord { path: String, index: usize },
    #[error("index {index} is out of bounds for `{path}` (len {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("cannot descend into scalar value at `{path}`")]
    ScalarInPath { path: String },
}

pub type EditResult<T> = Result<T, EditError>;

fn prefix(path: &Path, depth: usize) -> String {
    path.segments()[..depth].join(".")
}

/// Rebuilds the containers along `path`, handing the value found at its end to `leaf`.
///
/// Missing keys and nulls on the way down are treated as empty objects, so editors can
/// write into sections the backend has never returned. If `leaf` hands back the same
/// value, the original tree is returned untouched.
fn rebuild(
    node: &Node,
    path: &Path,
    depth: usize,
    leaf: &mut dyn FnMut(&Node) -> EditResult<Node>,
) -> EditResult<Node> {
    let Some(seg) = path.segments().get(depth) else {
        return leaf(node);
    };

    match node {
        Node::Object(fields) => {
            let child = fields.get(seg).cloned().unwrap_or_default();
            let next = rebuild(&child, path, depth + 1, leaf)?;
            let existed = fields.contains_key(seg);
            if (existed && next.same_ref(&child)) || (!existed && next.is_null()) {
                return Ok(node.clone());
            }
            let mut fields = BTreeMap::clone(fields);
            fields.insert(seg.clone(), next);
            Ok(Node::object(fields))
        }
        Node::Null => {
            let next = rebuild(&Node::Null, path, depth + 1, leaf)?;
            if next.is_null() {
                return Ok(Node::Null);
            }
            let mut fields = BTreeMap::new();
            fields.insert(seg.clone(), next);
            Ok(Node::object(fields))
        }
        Node::Array(items) => {
            let index = seg.parse::<usize>().map_err(|_| EditError::ScalarInPath {
                path: prefix(path, depth + 1),
            })?;
            let Some(child) = items.get(index) else {
                return Err(EditError::IndexOutOfBounds {
                    path: prefix(path, depth),
                    index,
                    len: items.len(),
                });
            };
            let next = rebuild(child, path, depth + 1, leaf)?;
            if next.same_ref(child) {
                return Ok(node.clone());
            }
            let mut items = Vec::clone(items);
            items[index] = next;
            Ok(Node::array(items))
        }
        Node::Bool(_) | Node::Number(_) | Node::String(_) => Err(EditError::ScalarInPath {
            path: prefix(path, depth),
        }),
    }
}

/// Value stored at `path`, if every segment resolves.
pub fn get<'a>(root: &'a Node, path: &Path) -> Option<&'a Node> {
    let mut cur = root;
    for seg in path.segments() {
        cur = match cur {
            Node::Object(fields) => fields.get(seg)?,
            Node::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Replaces the value at `path` (plain field edits such as `hero.title`).
pub fn set_value(root: &Node, path: &Path, value: Node) -> EditResult<Node> {
    let mut value = Some(value);
    rebuild(root, path, 0, &mut |_| Ok(value.take().unwrap_or_default()))
}

fn list_items<'a>(node: &'a Node, path: &Path) -> EditResult<&'a [Node]> {
    match node {
        Node::Null => Ok(&[]),
        Node::Array(items) => Ok(items.as_slice()),
        _ => Err(EditError::NotAList {
            path: path.to_string(),
        }),
    }
}

fn out_of_bounds(path: &Path) -> impl Fn(list::OutOfBounds) -> EditError + '_ {
    move |e| EditError::IndexOutOfBounds {
        path: path.to_string(),
        index: e.index,
        len: e.len,
    }
}

/// Appends a copy of `template` to the list at `path`.
pub fn add_item(root: &Node, path: &Path, template: &Node) -> EditResult<Node> {
    rebuild(root, path, 0, &mut |target| {
        let mut items = list_items(target, path)?.to_vec();
        list::add(&mut items, template.clone());
        Ok(Node::array(items))
    })
}

/// Drops the element at `index`, keeping the others in order.
///
/// Removing from an empty (or absent) list is a no-op.
pub fn remove_item(root: &Node, path: &Path, index: usize) -> EditResult<Node> {
    rebuild(root, path, 0, &mut |target| {
        let mut items = list_items(target, path)?.to_vec();
        match list::remove(&mut items, index).map_err(out_of_bounds(path))? {
            Some(_) => Ok(Node::array(items)),
            None => Ok(target.clone()),
        }
    })
}

/// Edits the element at `index`.
///
/// With a `field`, `{field: value}` is merged into the record; without one the element is
/// replaced, which is how lists of plain strings are edited.
pub fn update_item(
    root: &Node,
    path: &Path,
    index: usize,
    field: Option<&str>,
    value: Node,
) -> EditResult<Node> {
    let mut value = Some(value);
    rebuild(root, path, 0, &mut |target| {
        let mut items = list_items(target, path)?.to_vec();
        list::update(&mut items, index, |current| {
            let next = match (field, &*current) {
                (None, _) => value.take().unwrap_or_default(),
                (Some(field), Node::Object(fields)) => {
                    let mut fields = BTreeMap::clone(fields);
                    fields.insert(field.to_string(), value.take().unwrap_or_default());
                    Node::object(fields)
                }
                (Some(field), Node::Null) => {
                    let mut fields = BTreeMap::new();
                    fields.insert(field.to_string(), value.take().unwrap_or_default());
                    Node::object(fields)
                }
                (Some(_), _) => {
                    return Err(EditError::NotARecord {
                        path: path.to_string(),
                        index,
                    })
                }
            };
            *current = next;
            Ok(())
        })
        .map_err(out_of_bounds(path))??;
        Ok(Node::array(items))
    })
}

/// Moves the element at `from` so that it ends up at `to`.
pub fn move_item(root: &Node, path: &Path, from: usize, to: usize) -> EditResult<Node> {
    rebuild(root, path, 0, &mut |target| {
        let mut items = list_items(target, path)?.to_vec();
        list::move_to(&mut items, from, to).map_err(out_of_bounds(path))?;
        if from == to {
            return Ok(target.clone());
        }
        Ok(Node::array(items))
    })
}

/// Empty record shaped like `sample`, used as the template for "Add" buttons.
pub fn blank_template(sample: &Node) -> Node {
    match sample {
        Node::Object(fields) => Node::Object(Arc::new(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), blank_template(v)))
                .collect(),
        )),
        Node::Array(_) => Node::array(Vec::new()),
        Node::String(_) => Node::text(""),
        Node::Bool(_) => Node::Bool(false),
        Node::Number(_) | Node::Null => Node::Null,
    }
}
