//! SeaORM entity models
//!
//! Each service owns its own table: `submissions` lives in the storage
//! database, `detection_reports` in the analysis database.

mod detection_report;
mod submission;

pub use submission::{
    Entity as SubmissionEntity,
    Model as SubmissionRecord,
    ActiveModel as SubmissionActiveModel,
    Column as SubmissionColumn,
};

pub use detection_report::{
    Entity as DetectionReportEntity,
    Model as DetectionReportRecord,
    ActiveModel as DetectionReportActiveModel,
    Column as DetectionReportColumn,
};
