use tracing::{info, instrument};

use crate::entity::{Assignment, Grade, Submission, Validate};
use crate::error::AdminError;
use crate::repository::{ApiClient, Repository};

/// Submissions handed in for an assignment, read from its chapter.
pub async fn submissions_for(
    api: &ApiClient,
    assignment: &Assignment,
) -> Result<Vec<Submission>, AdminError> {
    api.chapter_submissions(assignment.chapter_id).await
}

/// Record a score and/or feedback on one submission.
#[instrument(skip(submissions, grade), fields(score = ?grade.assignment_score))]
pub async fn grade_submission(
    submissions: &dyn Repository<Submission>,
    id: i32,
    grade: &Grade,
) -> Result<(), AdminError> {
    grade.validate()?;
    submissions.update(id, grade).await?;
    info!("Submission graded");
    Ok(())
}
