//! JSON pointer selection over YAML trees (RFC 6901 subset).

use serde_yaml::Value;

/// Select the node addressed by `pointer` (e.g. `/paths/~1movies`).
///
/// An empty pointer selects the whole document. Sequence elements are
/// addressed by decimal index.
pub fn select<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(root);
    }
    let rest = pointer.strip_prefix('/')?;

    let mut node = root;
    for token in rest.split('/') {
        let token = token.replace("~1", "/").replace("~0", "~");
        node = match node {
            Value::Mapping(map) => map.get(token.as_str())?,
            Value::Sequence(items) => items.get(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}
