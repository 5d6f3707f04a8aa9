use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NavKind {
    #[default]
    Link,
    Group,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NavItem {
    pub label: String,
    pub link: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NavSection {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

/// Top-level entry of the public site's menu: group → section → item.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NavNode {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: NavKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<NavSection>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("menu entry {index} has no title")]
    MissingTitle { index: usize },
    #[error("link `{title}` has no target")]
    MissingLink { title: String },
    #[error("link `{title}` cannot have sections")]
    LinkWithSections { title: String },
    #[error("group `{title}` cannot link directly")]
    GroupWithLink { title: String },
}

impl NavNode {
    pub fn link(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: NavKind::Link,
            link: Some(link.into()),
            sections: None,
        }
    }

    pub fn group(title: impl Into<String>, sections: Vec<NavSection>) -> Self {
        Self {
            title: title.into(),
            kind: NavKind::Group,
            link: None,
            sections: Some(sections),
        }
    }

    pub fn validate(&self, index: usize) -> Result<(), NavError> {
        if self.title.trim().is_empty() {
            return Err(NavError::MissingTitle { index });
        }
        let title = self.title.clone();
        match self.kind {
            NavKind::Link if self.sections.is_some() => Err(NavError::LinkWithSections { title }),
            NavKind::Link if self.link.as_deref().map_or(true, |l| l.trim().is_empty()) => {
                Err(NavError::MissingLink { title })
            }
            NavKind::Group if self.link.is_some() => Err(NavError::GroupWithLink { title }),
            NavKind::Link | NavKind::Group => Ok(()),
        }
    }

    /// Switches kind, dropping whatever the new kind may not carry.
    pub fn with_kind(mut self, kind: NavKind) -> Self {
        self.kind = kind;
        match kind {
            NavKind::Link => {
                self.sections = None;
                self.link.get_or_insert_with(String::new);
            }
            NavKind::Group => {
                self.link = None;
                self.sections.get_or_insert_with(Vec::new);
            }
        }
        self
    }
}

pub fn validate_tree(nodes: &[NavNode]) -> Result<(), NavError> {
    nodes
        .iter()
        .enumerate()
        .try_for_each(|(i, node)| node.validate(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let tree: Vec<NavNode> = serde_json::from_value(json!([
            {"title": "Home", "type": "link", "link": "/"},
            {"title": "Programs", "type": "group", "sections": [
                {"header": "UG", "items": [{"label": "B.Tech", "link": "/btech"}]}
            ]}
        ]))
        .unwrap();
        assert_eq!(tree[0], NavNode::link("Home", "/"));
        assert_eq!(tree[1].kind, NavKind::Group);
        assert!(validate_tree(&tree).is_ok());

        let out = serde_json::to_value(&tree[0]).unwrap();
        assert!(out.get("sections").is_none());
    }

    #[test]
    fn test_invariants() {
        let mut bad = NavNode::link("Home", "/");
        bad.sections = Some(vec![]);
        assert_eq!(
            bad.validate(0),
            Err(NavError::LinkWithSections {
                title: "Home".into()
            })
        );

        let mut bad = NavNode::group("Programs", vec![]);
        bad.link = Some("/programs".into());
        assert!(matches!(bad.validate(1), Err(NavError::GroupWithLink { .. })));

        assert!(matches!(
            NavNode::link("", "/").validate(4),
            Err(NavError::MissingTitle { index: 4 })
        ));
        assert!(matches!(
            NavNode::link("x", " ").validate(0),
            Err(NavError::MissingLink { .. })
        ));
    }

    #[test]
    fn test_with_kind_keeps_node_valid() {
        let g = NavNode::link("About", "/about").with_kind(NavKind::Group);
        assert!(g.link.is_none());
        assert!(g.validate(0).is_ok());
    }
}
