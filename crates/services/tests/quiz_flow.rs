use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    QuestionCount, QuestionId, QuizQuestion, QuizRequest, SlotOutcome, Stage, StageSlot,
};
use services::{QuizService, QuizServiceError};
use storage::repository::{InMemoryRepository, NewQuestionRecord, QuizRepository, StorageError};

async fn seeded_repo(per_stage: &[(i64, usize)]) -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    for &(stage, n) in per_stage {
        for i in 0..n {
            repo.insert_question(
                NewQuestionRecord::new(Stage::new(stage), format!("stage {stage} question {i}"))
                    .with_answer("A"),
            )
            .await
            .expect("insert");
        }
    }
    repo
}

fn service(repo: Arc<InMemoryRepository>, max: u32) -> QuizService {
    QuizService::new(repo, QuestionCount::new(max))
}

#[tokio::test]
async fn loads_each_slot_from_its_own_stage() {
    let repo = seeded_repo(&[(1, 5), (2, 5), (3, 5)]).await;
    let quiz = service(repo, 100);

    let request = QuizRequest::from_query("stage1=1,2&stage2=2,3&stage3=3,4");
    let selection = quiz.select(&request).await.expect("select");

    let lists = selection.compact();
    assert_eq!(lists.len(), 3);
    for (list, (stage, expected)) in lists.iter().zip([(1, 2), (2, 3), (3, 4)]) {
        assert_eq!(list.len(), expected);
        assert!(list.iter().all(|q| q.stage() == Stage::new(stage)));
    }
}

#[tokio::test]
async fn returns_fewer_when_stage_is_short() {
    let repo = seeded_repo(&[(4, 2)]).await;
    let quiz = service(repo, 100);

    let selection = quiz
        .select(&QuizRequest::from_query("stage1=4,10"))
        .await
        .expect("select");

    let questions = selection
        .outcome(StageSlot::First)
        .and_then(SlotOutcome::questions)
        .expect("loaded");
    assert_eq!(questions.len(), 2);
}

#[tokio::test]
async fn malformed_slot_is_skipped_without_shifting_report() {
    let repo = seeded_repo(&[(1, 3), (3, 3)]).await;
    let quiz = service(repo, 100);

    let request = QuizRequest::from_query("stage1=1,1&stage2=abc&stage3=3,2");
    let selection = quiz.select(&request).await.expect("select");

    assert_eq!(selection.skipped_count(), 1);
    assert!(matches!(
        selection.outcome(StageSlot::Second),
        Some(SlotOutcome::Skipped { .. })
    ));
    let third = selection
        .outcome(StageSlot::Third)
        .and_then(SlotOutcome::questions)
        .expect("third loaded");
    assert!(third.iter().all(|q| q.stage() == Stage::new(3)));

    // The compact form drops the skipped slot, so stage 3 moves up.
    let lists = selection.compact();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].len(), 2);
}

#[tokio::test]
async fn no_slots_yields_empty_selection() {
    let quiz = service(seeded_repo(&[(1, 3)]).await, 100);
    let selection = quiz.select(&QuizRequest::default()).await.expect("select");
    assert!(selection.compact().is_empty());
}

#[tokio::test]
async fn counts_are_capped() {
    let repo = seeded_repo(&[(1, 20)]).await;
    let quiz = service(repo, 5);

    let selection = quiz
        .select(&QuizRequest::from_query("stage1=1,50"))
        .await
        .expect("select");
    match selection.outcome(StageSlot::First) {
        Some(SlotOutcome::Loaded { count, questions, .. }) => {
            assert_eq!(*count, QuestionCount::new(5));
            assert_eq!(questions.len(), 5);
        }
        other => panic!("expected loaded slot, got {other:?}"),
    }
}

struct FailingRepo;

#[async_trait]
impl QuizRepository for FailingRepo {
    async fn random_questions(
        &self,
        _stage: Stage,
        _count: QuestionCount,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        Err(StorageError::Connection("database is gone".into()))
    }

    async fn insert_question(&self, _record: NewQuestionRecord) -> Result<QuestionId, StorageError> {
        Err(StorageError::Connection("database is gone".into()))
    }

    async fn count_for_stage(&self, _stage: Stage) -> Result<u64, StorageError> {
        Err(StorageError::Connection("database is gone".into()))
    }
}

#[tokio::test]
async fn storage_failure_fails_the_whole_selection() {
    let quiz = QuizService::new(Arc::new(FailingRepo), QuestionCount::new(10));
    let err = quiz
        .select(&QuizRequest::from_query("stage1=1,1"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizServiceError::Storage(_)));
}

#[tokio::test]
async fn zero_count_does_not_touch_storage() {
    let quiz = QuizService::new(Arc::new(FailingRepo), QuestionCount::new(10));
    let selection = quiz
        .select(&QuizRequest::from_query("stage1=1,0"))
        .await
        .expect("zero count never queries");
    assert_eq!(selection.compact(), vec![Vec::<QuizQuestion>::new()]);
}
