use std::fmt;
use std::str::FromStr;

/// Dotted address into a content tree, e.g. `sections.0.items`.
///
/// Segments are kept as strings; a numeric segment indexes an array and is an ordinary
/// key on an object, so `"0"` works for both.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn parse(s: &str) -> Self {
        Path(
            s.split('.')
                .map(str::trim)
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut next = self.0.clone();
        next.push(key.to_string());
        Path(next)
    }

    pub fn index(&self, index: usize) -> Self {
        self.key(&index.to_string())
    }

    /// Last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_empty_segments() {
        let p = Path::parse("sections..0.items.");
        assert_eq!(p.segments(), ["sections", "0", "items"]);
        assert_eq!(p.to_string(), "sections.0.items");
    }

    #[test]
    fn test_builders() {
        let p = Path::root().key("curriculum").index(2).key("title");
        assert_eq!(p.to_string(), "curriculum.2.title");
        assert_eq!(p.leaf(), Some("title"));
        assert!(Path::parse("").is_root());
    }
}
