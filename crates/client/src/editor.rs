//! Question and answer editing.
//!
//! Every operation is a pure function of the current question list: it
//! either yields the complete new list as a [`QuestionsChanged`] event or an
//! [`EditorError`], never a partial change.

use tokio::sync::mpsc::UnboundedSender;
use websurvey_core::survey::{Question, QuestionId, QuestionType};

use crate::store::{FormEvent, QuestionsChanged};

/// One editing action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOp {
    /// Insert a blank question at `at`, or append when `None`.
    AddQuestion { at: Option<usize> },
    RemoveQuestion { id: QuestionId },
    ChangeType { id: QuestionId, kind: QuestionType },
    /// Take the question at `from` out and reinsert it at `to`.
    MoveQuestion { from: usize, to: usize },
    /// Exchange the questions at positions `a` and `b`.
    SwapQuestions { a: usize, b: usize },
    EditQuestion { id: QuestionId, text: String },
    EditDescription { id: QuestionId, description: Option<String> },
    SetRequired { id: QuestionId, required: bool },
    AddAnswer { id: QuestionId, text: String },
    EditAnswer { id: QuestionId, index: usize, text: String },
    RemoveAnswer { id: QuestionId, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("No question with id {0}")]
    UnknownQuestion(QuestionId),

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Question {0} does not take answers")]
    NotSelection(QuestionId),

    #[error("The form is no longer listening")]
    Disconnected,
}

/// Applies [`EditorOp`]s and reports the result to the form store.
#[derive(Debug, Clone, Default)]
pub struct QuestionEditor {
    events: Option<UnboundedSender<FormEvent>>,
}

impl QuestionEditor {
    /// An editor that only computes; [`submit`](Self::submit) sends nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// An editor reporting to a store through `events`.
    pub fn bound(events: UnboundedSender<FormEvent>) -> Self {
        Self {
            events: Some(events),
        }
    }

    /// Compute the list that results from `op`.
    pub fn apply(questions: &[Question], op: EditorOp) -> Result<QuestionsChanged, EditorError> {
        let mut next = questions.to_vec();

        match op {
            EditorOp::AddQuestion { at } => {
                let question = Question::blank(next_temporary_id(&next));
                let at = at.unwrap_or(next.len());
                if at > next.len() {
                    return Err(EditorError::IndexOutOfRange {
                        index: at,
                        len: next.len(),
                    });
                }
                next.insert(at, question);
            }
            EditorOp::RemoveQuestion { id } => {
                let index = position(&next, id)?;
                next.remove(index);
            }
            EditorOp::ChangeType { id, kind } => {
                let question = find_mut(&mut next, id)?;
                if !kind.is_selection() {
                    question.answers.clear();
                }
                question.kind = kind;
            }
            EditorOp::MoveQuestion { from, to } => {
                let len = next.len();
                for index in [from, to] {
                    if index >= len {
                        return Err(EditorError::IndexOutOfRange { index, len });
                    }
                }
                let question = next.remove(from);
                next.insert(to, question);
            }
            EditorOp::SwapQuestions { a, b } => {
                let len = next.len();
                for index in [a, b] {
                    if index >= len {
                        return Err(EditorError::IndexOutOfRange { index, len });
                    }
                }
                next.swap(a, b);
            }
            EditorOp::EditQuestion { id, text } => {
                find_mut(&mut next, id)?.question = text;
            }
            EditorOp::EditDescription { id, description } => {
                find_mut(&mut next, id)?.description = description;
            }
            EditorOp::SetRequired { id, required } => {
                find_mut(&mut next, id)?.required = required;
            }
            EditorOp::AddAnswer { id, text } => {
                selection_mut(&mut next, id)?.answers.push(text);
            }
            EditorOp::EditAnswer { id, index, text } => {
                let answers = &mut selection_mut(&mut next, id)?.answers;
                let len = answers.len();
                let answer = answers
                    .get_mut(index)
                    .ok_or(EditorError::IndexOutOfRange { index, len })?;
                *answer = text;
            }
            EditorOp::RemoveAnswer { id, index } => {
                let answers = &mut selection_mut(&mut next, id)?.answers;
                if index >= answers.len() {
                    return Err(EditorError::IndexOutOfRange {
                        index,
                        len: answers.len(),
                    });
                }
                answers.remove(index);
            }
        }

        Ok(QuestionsChanged { questions: next })
    }

    /// Apply `op` and send the resulting event to the bound store.
    ///
    /// Sends exactly one event on success and nothing on failure.
    pub fn submit(&self, questions: &[Question], op: EditorOp) -> Result<(), EditorError> {
        let changed = Self::apply(questions, op)?;
        if let Some(events) = &self.events {
            events
                .send(FormEvent::QuestionsChanged(changed))
                .map_err(|_| EditorError::Disconnected)?;
        }
        Ok(())
    }
}

/// `min(existing ids, 0) - 1`: below every id in the list, never positive.
fn next_temporary_id(questions: &[Question]) -> QuestionId {
    let lowest = questions.iter().map(|q| q.id.0).min().unwrap_or(0).min(0);
    QuestionId(lowest - 1)
}

fn position(questions: &[Question], id: QuestionId) -> Result<usize, EditorError> {
    questions
        .iter()
        .position(|q| q.id == id)
        .ok_or(EditorError::UnknownQuestion(id))
}

fn find_mut(questions: &mut [Question], id: QuestionId) -> Result<&mut Question, EditorError> {
    questions
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or(EditorError::UnknownQuestion(id))
}

fn selection_mut(questions: &mut [Question], id: QuestionId) -> Result<&mut Question, EditorError> {
    let question = find_mut(questions, id)?;
    if !question.kind.is_selection() {
        return Err(EditorError::NotSelection(id));
    }
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    fn q(id: i64, kind: QuestionType, answers: &[&str]) -> Question {
        Question {
            kind,
            question: format!("q{id}"),
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Question::blank(QuestionId(id))
        }
    }

    fn ids(changed: &QuestionsChanged) -> Vec<i64> {
        changed.questions.iter().map(|q| q.id.0).collect()
    }

    #[test]
    fn added_questions_get_decreasing_temporary_ids() {
        let first = QuestionEditor::apply(&[], EditorOp::AddQuestion { at: None }).unwrap();
        assert_eq!(ids(&first), vec![-1]);

        let second =
            QuestionEditor::apply(&first.questions, EditorOp::AddQuestion { at: None }).unwrap();
        assert_eq!(ids(&second), vec![-1, -2]);

        let added = &second.questions[1];
        assert_eq!(added.kind, QuestionType::Text);
        assert!(added.question.is_empty());
        assert!(added.answers.is_empty());
        assert!(!added.required);
    }

    #[test]
    fn temporary_ids_stay_below_server_ids() {
        let existing = vec![q(12, QuestionType::Text, &[]), q(40, QuestionType::Text, &[])];
        let changed = QuestionEditor::apply(&existing, EditorOp::AddQuestion { at: Some(0) }).unwrap();
        assert_eq!(ids(&changed), vec![-1, 12, 40]);
    }

    #[test]
    fn remove_leaves_other_ids_alone() {
        let existing = vec![
            q(1, QuestionType::Text, &[]),
            q(-1, QuestionType::Text, &[]),
            q(2, QuestionType::Text, &[]),
        ];
        let changed = QuestionEditor::apply(
            &existing,
            EditorOp::RemoveQuestion { id: QuestionId(-1) },
        )
        .unwrap();
        assert_eq!(ids(&changed), vec![1, 2]);
    }

    #[test]
    fn leaving_a_selection_type_clears_answers() {
        let existing = vec![q(5, QuestionType::Checkbox, &["a", "b"])];
        let changed = QuestionEditor::apply(
            &existing,
            EditorOp::ChangeType {
                id: QuestionId(5),
                kind: QuestionType::Textarea,
            },
        )
        .unwrap();
        assert_eq!(changed.questions[0].kind, QuestionType::Textarea);
        assert!(changed.questions[0].answers.is_empty());
    }

    #[test]
    fn switching_between_selection_types_keeps_answers() {
        let existing = vec![q(5, QuestionType::Select, &["a", "b"])];
        let changed = QuestionEditor::apply(
            &existing,
            EditorOp::ChangeType {
                id: QuestionId(5),
                kind: QuestionType::Radio,
            },
        )
        .unwrap();
        assert_eq!(changed.questions[0].answers, vec!["a", "b"]);
    }

    #[test]
    fn move_preserves_ids() {
        let existing = vec![
            q(1, QuestionType::Text, &[]),
            q(2, QuestionType::Text, &[]),
            q(3, QuestionType::Text, &[]),
        ];
        let changed =
            QuestionEditor::apply(&existing, EditorOp::MoveQuestion { from: 0, to: 2 }).unwrap();
        assert_eq!(ids(&changed), vec![2, 3, 1]);

        assert_matches!(
            QuestionEditor::apply(&existing, EditorOp::MoveQuestion { from: 0, to: 3 }),
            Err(EditorError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn swap_exchanges_two_positions() {
        let existing = vec![
            q(1, QuestionType::Text, &[]),
            q(2, QuestionType::Text, &[]),
            q(3, QuestionType::Text, &[]),
        ];
        let changed =
            QuestionEditor::apply(&existing, EditorOp::SwapQuestions { a: 0, b: 2 }).unwrap();
        assert_eq!(ids(&changed), vec![3, 2, 1]);

        assert_matches!(
            QuestionEditor::apply(&existing, EditorOp::SwapQuestions { a: 4, b: 0 }),
            Err(EditorError::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn answers_are_addressed_inside_one_question() {
        let existing = vec![
            q(1, QuestionType::Radio, &["yes", "no"]),
            q(2, QuestionType::Radio, &["yes", "no"]),
        ];

        let edited = QuestionEditor::apply(
            &existing,
            EditorOp::EditAnswer {
                id: QuestionId(2),
                index: 1,
                text: "maybe".into(),
            },
        )
        .unwrap();
        assert_eq!(edited.questions[0].answers, vec!["yes", "no"]);
        assert_eq!(edited.questions[1].answers, vec!["yes", "maybe"]);

        let removed = QuestionEditor::apply(
            &edited.questions,
            EditorOp::RemoveAnswer {
                id: QuestionId(1),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(removed.questions[0].answers, vec!["no"]);

        let added = QuestionEditor::apply(
            &removed.questions,
            EditorOp::AddAnswer {
                id: QuestionId(1),
                text: "later".into(),
            },
        )
        .unwrap();
        assert_eq!(added.questions[0].answers, vec!["no", "later"]);
    }

    #[test]
    fn field_edits_touch_only_their_question() {
        let existing = vec![q(1, QuestionType::Text, &[]), q(2, QuestionType::Text, &[])];
        let changed = QuestionEditor::apply(
            &existing,
            EditorOp::EditQuestion {
                id: QuestionId(2),
                text: "How was it?".into(),
            },
        )
        .unwrap();
        let changed = QuestionEditor::apply(
            &changed.questions,
            EditorOp::SetRequired {
                id: QuestionId(2),
                required: true,
            },
        )
        .unwrap();
        let changed = QuestionEditor::apply(
            &changed.questions,
            EditorOp::EditDescription {
                id: QuestionId(2),
                description: Some("be honest".into()),
            },
        )
        .unwrap();

        assert_eq!(changed.questions[0], existing[0]);
        let second = &changed.questions[1];
        assert_eq!(second.question, "How was it?");
        assert!(second.required);
        assert_eq!(second.description.as_deref(), Some("be honest"));
    }

    #[test]
    fn invalid_operations_are_rejected() {
        let existing = vec![q(1, QuestionType::Text, &[]), q(2, QuestionType::Select, &["a"])];

        assert_matches!(
            QuestionEditor::apply(&existing, EditorOp::RemoveQuestion { id: QuestionId(9) }),
            Err(EditorError::UnknownQuestion(QuestionId(9)))
        );
        assert_matches!(
            QuestionEditor::apply(
                &existing,
                EditorOp::AddAnswer {
                    id: QuestionId(1),
                    text: "x".into()
                }
            ),
            Err(EditorError::NotSelection(QuestionId(1)))
        );
        assert_matches!(
            QuestionEditor::apply(
                &existing,
                EditorOp::RemoveAnswer {
                    id: QuestionId(2),
                    index: 1
                }
            ),
            Err(EditorError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_matches!(
            QuestionEditor::apply(&existing, EditorOp::AddQuestion { at: Some(3) }),
            Err(EditorError::IndexOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn bound_editor_sends_one_event_per_valid_op() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let editor = QuestionEditor::bound(tx);

        editor
            .submit(&[], EditorOp::AddQuestion { at: None })
            .unwrap();
        assert!(editor
            .submit(&[], EditorOp::RemoveQuestion { id: QuestionId(1) })
            .is_err());

        assert_matches!(rx.try_recv(), Ok(FormEvent::QuestionsChanged(c)) if c.questions.len() == 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_store_is_reported() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let editor = QuestionEditor::bound(tx);
        assert_eq!(
            editor.submit(&[], EditorOp::AddQuestion { at: None }),
            Err(EditorError::Disconnected)
        );
    }
}
