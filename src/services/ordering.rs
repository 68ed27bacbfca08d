use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Duplicate project in order: {0}")]
    Duplicate(String),

    #[error("Unknown project in order: {0}")]
    Unknown(String),

    #[error("Expected {expected} projects, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Checks that `requested` is a permutation of `current`.
pub fn validate_permutation(current: &[String], requested: &[String]) -> Result<(), OrderError> {
    if current.len() != requested.len() {
        return Err(OrderError::Length {
            expected: current.len(),
            actual: requested.len(),
        });
    }

    let known: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut seen = HashSet::with_capacity(requested.len());

    for id in requested {
        if !known.contains(id.as_str()) {
            return Err(OrderError::Unknown(id.clone()));
        }
        if !seen.insert(id.as_str()) {
            return Err(OrderError::Duplicate(id.clone()));
        }
    }

    Ok(())
}

/// Moves the element at `from` to position `to`, shifting the ones in
/// between. Out-of-range positions leave the list unchanged.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}
