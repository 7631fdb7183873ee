mod subject;
mod target;

pub use subject::{Chapter, Subject, SubjectError};
pub use target::{ChapterRef, StudyTarget, TargetError};
