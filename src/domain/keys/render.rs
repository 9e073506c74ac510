//! authorized_keys rendering

use super::Key;

/// Render keys as `"# <comment>\n<material>\n"` records, in order.
///
/// No header, footer or blank separator lines; no keys renders to no bytes.
pub fn render_authorized_keys(keys: &[Key]) -> Vec<u8> {
    let mut buffer = String::new();

    for key in keys {
        buffer.push_str("# ");
        buffer.push_str(key.comment());
        buffer.push('\n');
        buffer.push_str(key.material());
        buffer.push('\n');
    }

    buffer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keys() -> Vec<Key> {
        vec![
            Key::new("comment-1", "ssh-rsa aaaabbbbcccc"),
            Key::new("comment-2", "ssh-rsa ddddeeeeffffgggg"),
        ]
    }

    #[test]
    fn test_render_authorized_keys() {
        let rendered = render_authorized_keys(&sample_keys());

        let expected = "# comment-1\nssh-rsa aaaabbbbcccc\n# comment-2\nssh-rsa ddddeeeeffffgggg\n";
        assert_eq!(String::from_utf8(rendered).unwrap(), expected);
    }

    #[test]
    fn test_render_empty_is_empty() {
        assert!(render_authorized_keys(&[]).is_empty());
    }

    #[test]
    fn test_render_is_deterministic() {
        let keys = sample_keys();
        assert_eq!(render_authorized_keys(&keys), render_authorized_keys(&keys));
    }

    #[test]
    fn test_render_distributes_over_concatenation() {
        let first = sample_keys();
        let second = vec![Key::new("alice - 1", "ssh-ed25519 AAAAC3Nz")];

        let mut joined = first.clone();
        joined.extend(second.clone());

        let mut expected = render_authorized_keys(&first);
        expected.extend(render_authorized_keys(&second));

        assert_eq!(render_authorized_keys(&joined), expected);
    }
}
