//! Module for handling the [`percent_encoding`] crate.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

/// All ASCII characters in the [component percent-encode
/// set](https://url.spec.whatwg.org/#component-percent-encode-set), but with `/` excluded.
///
/// Branch names can contain `/`, and raw content URLs take them as extra path segments, so
/// encoding a branch name with this leaves its slashes alone while escaping characters like `#`,
/// `?`, and `%` that would otherwise change what the URL refers to.
pub(crate) const PATH_IGNORING_SLASH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'/');

#[cfg(test)]
mod tests {
    use percent_encoding::utf8_percent_encode;

    use super::*;

    #[test]
    fn branch_names_keep_slashes() {
        let encode = |branch| utf8_percent_encode(branch, PATH_IGNORING_SLASH).to_string();

        assert_eq!(encode("main"), "main");
        assert_eq!(encode("feature/new-icons_v1.2"), "feature/new-icons_v1.2");
        assert_eq!(encode("fix#12?x=1"), "fix%2312%3Fx%3D1");
        assert_eq!(encode("100%"), "100%25");
        assert_eq!(encode("ünïcode branch"), "%C3%BCn%C3%AFcode%20branch");
    }
}
