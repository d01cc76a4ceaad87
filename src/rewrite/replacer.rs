//! Ordered literal replacement.

/// Replaces literal patterns in a single left-to-right pass.
///
/// At each position the rules are tried in the order they were given and the
/// first one that matches wins; the scan then resumes after the matched text,
/// so replacements never overlap and replaced output is never rescanned.
#[derive(Debug, Clone)]
pub struct Replacer {
    rules: Vec<(String, String)>,
}

impl Replacer {
    /// Build from `(pattern, replacement)` pairs in priority order.
    /// Empty patterns are dropped.
    pub fn new<I, P, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let rules = rules
            .into_iter()
            .map(|(p, r)| (p.into(), r.into()))
            .filter(|(p, _)| !p.is_empty())
            .collect();
        Self { rules }
    }

    pub fn replace(&self, input: &str) -> String {
        if self.rules.is_empty() {
            return input.to_string();
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        'scan: while let Some(c) = rest.chars().next() {
            for (pattern, replacement) in &self.rules {
                if rest.starts_with(pattern.as_str()) {
                    out.push_str(replacement);
                    rest = &rest[pattern.len()..];
                    continue 'scan;
                }
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_wins() {
        let r = Replacer::new([("ab", "1"), ("a", "2"), ("abc", "3")]);
        assert_eq!(r.replace("abc a"), "1c 2");
    }

    #[test]
    fn test_no_rescan_of_output() {
        let r = Replacer::new([("a", "aa")]);
        assert_eq!(r.replace("aba"), "aabaa");
    }

    #[test]
    fn test_non_overlapping() {
        let r = Replacer::new([("aa", "b")]);
        assert_eq!(r.replace("aaa"), "ba");
    }

    #[test]
    fn test_multibyte_passthrough() {
        let r = Replacer::new([("\"/", "\"/v1/")]);
        assert_eq!(r.replace("héllo \"/ü\" ✓"), "héllo \"/v1/ü\" ✓");
    }

    #[test]
    fn test_empty_rules() {
        let r = Replacer::new(Vec::<(String, String)>::new());
        assert_eq!(r.replace("unchanged"), "unchanged");
        let r = Replacer::new([("", "x")]);
        assert_eq!(r.replace("unchanged"), "unchanged");
    }
}
