/// View/edit state of the entity description box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DescriptionEditor {
    #[default]
    Viewing,
    Editing { draft: String },
}

impl DescriptionEditor {
    /// Enter edit mode, seeding the draft with the current description when
    /// there is one.
    pub fn begin_edit(&mut self, current: Option<&str>) {
        *self = Self::Editing {
            draft: current.unwrap_or_default().to_string(),
        };
    }

    /// Replace the draft; ignored outside edit mode.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Self::Editing { draft } = self {
            *draft = text.into();
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::Viewing;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Editing { draft } => Some(draft),
            Self::Viewing => None,
        }
    }
}
