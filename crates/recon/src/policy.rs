use crate::config::CommentConfig;
use crate::model::{Action, Status};

/// What to do with one working row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    /// Text for the notes column, if the action writes one.
    pub comment: Option<String>,
    /// Synthesized row gets blank identifier and project.
    pub blank_identity: bool,
}

impl Decision {
    fn new(action: Action, comment: Option<&str>) -> Self {
        Self { action, comment: comment.map(str::to_string), blank_identity: false }
    }
}

/// Map a derived status to an action.
///
/// `identifier_valid` is the format check on the row's own identifier and
/// only matters when the status is `Unknown`.
pub fn decide(status: &Status, identifier_valid: bool, comments: &CommentConfig) -> Decision {
    match status {
        Status::Deleted => Decision::new(Action::NoAction, None),
        Status::ToReplace => Decision::new(Action::UpdateToDeleted, Some(&comments.to_replace)),
        Status::Duplicate => Decision::new(Action::AddNewLine, Some(&comments.duplicate)),
        Status::Unknown if identifier_valid => {
            Decision::new(Action::AddNewLineError, Some(&comments.not_found))
        }
        Status::Unknown => Decision {
            blank_identity: true,
            ..Decision::new(Action::AddNewLineError, Some(&comments.format_error))
        },
        Status::Unrecognized(_) => Decision::new(Action::ManualReview, None),
    }
}
