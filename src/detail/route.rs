//! Navigation targets reachable from the detail page.

use super::assignment::{Assignment, AssignmentKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Attribute page of a tag.
    TagAttributes(String),
    /// Term detail page; holds the dotted term name.
    TermDetail(String),
    /// Previous page in history.
    Back,
}

impl Route {
    pub fn for_assignment(assignment: &Assignment) -> Self {
        match assignment.kind {
            AssignmentKind::Tag => Self::TagAttributes(assignment.full_name.clone()),
            AssignmentKind::Term => Self::TermDetail(assignment.full_name.clone()),
        }
    }

    /// Fragment URL, or `None` for history navigation.
    pub fn to_url(&self) -> Option<String> {
        match self {
            Self::TagAttributes(name) => Some(format!("#!/tag/tagAttribute/{}", name)),
            Self::TermDetail(name) => Some(format!(
                "#!/taxonomy/detailCatalog/api/atlas/v1/taxonomies/{}",
                name.split('.').collect::<Vec<_>>().join("/terms/")
            )),
            Self::Back => None,
        }
    }
}
