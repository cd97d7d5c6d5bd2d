use std::fmt;

/// Why an edit request was refused. Refused edits change nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditError {
    OutOfBounds { y: i32 },
    ObstructedByViewer,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::OutOfBounds { y } => write!(f, "y={y} is outside the world's vertical range"),
            EditError::ObstructedByViewer => write!(f, "block would overlap the viewer"),
        }
    }
}

impl std::error::Error for EditError {}
