pub mod env;
pub mod tracing;

use std::hint::black_box;

/// Performs `&str` comparisons in constant time in an attempt to close any side-channels that
/// might leak information about a signature
pub fn constant_time_cmp(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let res = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (left, right)| acc | black_box(left ^ right));

    black_box(res) == 0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_const_time_cmp() {
        let expects = "sha256=0123abcd";
        let passing = "sha256=0123abcd";

        let bad_start = "sha257=0123abcd";
        let bad_end = "sha256=0123abce";

        let short = "sha256=0123abc";
        let long = "sha256=0123abcd0";

        assert!(constant_time_cmp(expects, passing));
        assert!(!constant_time_cmp(expects, bad_start));
        assert!(!constant_time_cmp(expects, bad_end));
        assert!(!constant_time_cmp(expects, short));
        assert!(!constant_time_cmp(expects, long));
    }

    #[test]
    fn test_const_time_cmp_empty() {
        assert!(constant_time_cmp("", ""));
        assert!(!constant_time_cmp("", "a"));
    }
}
