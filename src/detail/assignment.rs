//! Tag and term assignments on an entity.
//!
//! A trait whose name is dotted (`Taxonomy.Parent.Term`) is a taxonomy term;
//! anything else is a plain tag.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Tag,
    Term,
}

impl std::fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Tag => "tag",
            Self::Term => "term",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub kind: AssignmentKind,
    pub full_name: String,
    /// Last dotted segment; equals `full_name` for tags.
    pub short_name: String,
}

impl Assignment {
    pub fn classify(name: &str) -> Self {
        let segments: Vec<&str> = name.split('.').collect();
        if segments.len() > 1 {
            Self {
                kind: AssignmentKind::Term,
                full_name: name.to_string(),
                short_name: segments.last().copied().unwrap_or(name).to_string(),
            }
        } else {
            Self {
                kind: AssignmentKind::Tag,
                full_name: name.to_string(),
                short_name: name.to_string(),
            }
        }
    }

    pub fn is_term(&self) -> bool {
        self.kind == AssignmentKind::Term
    }
}

/// Split trait names into (tags, terms), each in input order.
pub fn partition_assignments<I, S>(names: I) -> (Vec<Assignment>, Vec<Assignment>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|n| !n.as_ref().is_empty())
        .map(|n| Assignment::classify(n.as_ref()))
        .partition(|a| a.kind == AssignmentKind::Tag)
}

/// Text for the confirmation shown before removing an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
}

impl RemovalPrompt {
    pub fn new(assignment: &Assignment, entity_title: &str) -> Self {
        let title = match assignment.kind {
            AssignmentKind::Tag => "Remove Tag Assignment",
            AssignmentKind::Term => "Remove Term Assignment",
        };
        Self {
            title: title.to_string(),
            message: format!(
                "Remove: {} assignment from {}?",
                assignment.full_name, entity_title
            ),
            confirm_label: "Remove".to_string(),
        }
    }
}
