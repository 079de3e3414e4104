//! Reconciling a survey's stored questions with an update payload.
//!
//! The editor sends the full question list on every save. Questions whose id
//! belongs to the survey are updated in place, everything else in the payload
//! is created, and stored questions that are no longer listed are deleted.
//! Ids that name a question of another survey are treated as new, so an
//! update can never touch questions it does not own.

use std::collections::HashSet;

use crate::survey::QuestionPayload;
use crate::types::DbId;

/// One question to write, with its position in the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuestion<'a> {
    pub position: i32,
    pub payload: &'a QuestionPayload,
}

/// The writes needed to make the stored questions match a payload.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct QuestionSyncPlan<'a> {
    pub create: Vec<PlannedQuestion<'a>>,
    pub update: Vec<(DbId, PlannedQuestion<'a>)>,
    pub delete: Vec<DbId>,
}

impl QuestionSyncPlan<'_> {
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Plan the sync of `incoming` against the ids currently stored for the survey.
///
/// Positions follow payload order. If the payload repeats an id, only the
/// first occurrence updates it and later ones become new questions.
pub fn plan_question_sync<'a>(
    existing: &[DbId],
    incoming: &'a [QuestionPayload],
) -> QuestionSyncPlan<'a> {
    let owned: HashSet<DbId> = existing.iter().copied().collect();
    let mut kept: HashSet<DbId> = HashSet::new();
    let mut plan = QuestionSyncPlan::default();

    for (index, payload) in incoming.iter().enumerate() {
        let planned = PlannedQuestion {
            position: index as i32,
            payload,
        };
        match payload.existing_id() {
            Some(id) if owned.contains(&id) && kept.insert(id) => plan.update.push((id, planned)),
            _ => plan.create.push(planned),
        }
    }

    plan.delete = existing
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    plan
}
