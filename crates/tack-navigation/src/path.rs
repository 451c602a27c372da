/// The path separator.
pub const SEPARATOR: char = '/';

/// Join `root` and `fragment` with exactly one `/` at the junction.
///
/// Only the root's last character and the fragment's first character are
/// looked at. Nothing is escaped, decoded or validated, and interior
/// separators are left alone. A missing first or last character counts as
/// "not a separator", so `join("", "c")` is `"/c"`. Only `join("", "")` is
/// `""`.
///
/// ```
/// use tack_navigation::join;
///
/// assert_eq!(join("/a/b/", "/c"), "/a/b/c");
/// assert_eq!(join("/a/b", "c"), "/a/b/c");
/// assert_eq!(join("/a/b", "/c"), "/a/b/c");
/// assert_eq!(join("/a", ""), "/a/");
/// assert_eq!(join("", ""), "");
/// ```
pub fn join(root: &str, fragment: &str) -> String {
    if root.is_empty() && fragment.is_empty() {
        return String::new();
    }

    let root_sep = root.ends_with(SEPARATOR);
    let fragment_sep = fragment.starts_with(SEPARATOR);

    let mut out = String::with_capacity(root.len() + fragment.len() + 1);
    match (root_sep, fragment_sep) {
        (true, true) => {
            out.push_str(&root[..root.len() - SEPARATOR.len_utf8()]);
        }
        (false, false) => {
            out.push_str(root);
            out.push(SEPARATOR);
        }
        _ => out.push_str(root),
    }
    out.push_str(fragment);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_separator_at_the_junction() {
        assert_eq!(join("/a/b/", "/c"), "/a/b/c");
        assert_eq!(join("/a/b", "c"), "/a/b/c");
        assert_eq!(join("/a/b", "/c"), "/a/b/c");
        assert_eq!(join("/a/b/", "c"), "/a/b/c");
    }

    #[test]
    fn empty_sides() {
        assert_eq!(join("", ""), "");
        assert_eq!(join("", "c"), "/c");
        assert_eq!(join("", "/c"), "/c");
        assert_eq!(join("/a", ""), "/a/");
        assert_eq!(join("/a/", ""), "/a/");
        assert_eq!(join("", "/"), "/");
        assert_eq!(join("/", ""), "/");
    }

    #[test]
    fn bare_separator_fragment() {
        assert_eq!(join("/a", "/"), "/a/");
        assert_eq!(join("/a/", "/"), "/a/");
        assert_eq!(join("/", "/"), "/");
        assert_eq!(join("/", "x"), "/x");
    }

    #[test]
    fn only_the_junction_is_touched() {
        assert_eq!(join("//a//", "//b//"), "//a///b//");
        assert_eq!(join("/users/:id", "edit?tab=1#top"), "/users/:id/edit?tab=1#top");
        assert_eq!(join("/caf\u{e9}", "men\u{fc}"), "/caf\u{e9}/men\u{fc}");
        assert_eq!(join("/\u{e9}/", "/%20"), "/\u{e9}/%20");
    }

    #[test]
    fn junction_has_exactly_one_separator() {
        let roots = ["/a", "/a/", "a", "a/", "/", ""];
        let fragments = ["b", "/b", "b/", "/b/"];
        for root in roots {
            for fragment in fragments {
                let joined = join(root, fragment);
                let head = root.trim_end_matches('/');
                let tail = fragment.trim_start_matches('/');
                assert_eq!(joined, format!("{head}/{tail}"), "join({root:?}, {fragment:?})");
            }
        }
    }
}
