//! Index-based edits on plain vectors.
//!
//! The tree editor runs its list operations through these, and the typed record forms
//! (banner images, council members, navigation entries) call them on their own `Vec`s, so
//! bounds and ordering rules are the same everywhere.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("index {index} is out of bounds (len {len})")]
pub struct OutOfBounds {
    pub index: usize,
    pub len: usize,
}

fn check(len: usize, index: usize) -> Result<(), OutOfBounds> {
    if index < len {
        Ok(())
    } else {
        Err(OutOfBounds { index, len })
    }
}

pub fn add<T>(items: &mut Vec<T>, item: T) {
    items.push(item);
}

/// Removes and returns the element at `index`, keeping the rest in order.
///
/// Removing from an empty list is a no-op and returns `None`.
pub fn remove<T>(items: &mut Vec<T>, index: usize) -> Result<Option<T>, OutOfBounds> {
    if items.is_empty() {
        return Ok(None);
    }
    check(items.len(), index)?;
    Ok(Some(items.remove(index)))
}

pub fn update<T, R>(
    items: &mut [T],
    index: usize,
    f: impl FnOnce(&mut T) -> R,
) -> Result<R, OutOfBounds> {
    check(items.len(), index)?;
    Ok(f(&mut items[index]))
}

/// Moves the element at `from` so that it ends up at `to`.
pub fn move_to<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), OutOfBounds> {
    check(items.len(), from)?;
    check(items.len(), to)?;
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}
