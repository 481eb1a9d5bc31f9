//! Exact-match duplicate decision
//!
//! Submission ids are assigned in upload order, so the lowest qualifying id
//! is the earliest upload and becomes the recorded original.

use antiplagiat_common::models::{AnalyzeRequest, SubmissionSummary, Verdict};

/// Pick the original a submission duplicates, if any.
///
/// Only strictly earlier submissions by a different student qualify.
/// `candidates` may arrive in any order.
pub fn find_original(candidates: &[SubmissionSummary], request: &AnalyzeRequest) -> Option<i64> {
    let mut ordered: Vec<&SubmissionSummary> = candidates.iter().collect();
    ordered.sort_by_key(|candidate| candidate.id);

    ordered
        .into_iter()
        .find(|candidate| {
            candidate.id < request.submission_id && candidate.student_name != request.student_name
        })
        .map(|candidate| candidate.id)
}

/// Decide the verdict for a request against its same-hash candidates
pub fn decide(candidates: &[SubmissionSummary], request: &AnalyzeRequest) -> Verdict {
    Verdict::from_match(find_original(candidates, request))
}
