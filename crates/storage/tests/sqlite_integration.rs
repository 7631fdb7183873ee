use study_core::StudyDay;
use study_core::model::{ChapterRef, StudyTarget, Subject};
use study_core::time::{fixed_clock, fixed_now};
use storage::repository::{StorageError, SubjectRepository, TargetRepository};
use storage::sqlite::SqliteRepository;

fn build_subject(name: &str) -> Subject {
    let mut subject = Subject::new(name, fixed_now()).unwrap();
    subject.add_chapter("Ch1", 50).unwrap();
    subject.add_chapter("Ch2", 30).unwrap();
    subject
}

fn build_target(day: StudyDay, pairs: &[(&str, &str)]) -> StudyTarget {
    let refs = pairs
        .iter()
        .map(|(s, c)| ChapterRef::new(*s, *c).unwrap())
        .collect();
    StudyTarget::new(day, refs)
}

#[tokio::test]
async fn sqlite_roundtrip_persists_subjects_and_chapters() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_subjects?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.insert_subject(&build_subject("Math")).await.unwrap();

    let err = repo.insert_subject(&build_subject("Math")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let mut math = repo.get_subject("Math").await.unwrap().unwrap();
    assert_eq!(math.chapters().len(), 2);
    assert_eq!(math.chapter("Ch1").unwrap().total_pages(), 50);

    math.complete_chapter("Ch1").unwrap();
    math.add_chapter("Ch3", 20).unwrap();
    repo.upsert_subject(&math).await.unwrap();

    let fetched = repo.get_subject("Math").await.unwrap().unwrap();
    assert!(fetched.chapter("Ch1").unwrap().is_complete());
    assert!(!fetched.chapter("Ch2").unwrap().is_complete());

    let names: Vec<&str> = fetched.chapters().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Ch1", "Ch2", "Ch3"]);
}

#[tokio::test]
async fn sqlite_lists_subjects_in_creation_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_subject_order?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for name in ["Physics", "Math", "History"] {
        repo.insert_subject(&build_subject(name)).await.unwrap();
    }

    let names: Vec<String> = repo
        .list_subjects()
        .await
        .unwrap()
        .iter()
        .map(|s| s.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Physics", "Math", "History"]);
}

#[tokio::test]
async fn sqlite_replaces_targets_wholesale() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_targets?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let day = fixed_clock().today();

    repo.upsert_target(&build_target(day, &[("Math", "Ch1"), ("Physics", "Optics")]))
        .await
        .unwrap();

    let mut stored = repo.get_target(day).await.unwrap().unwrap();
    assert_eq!(stored.subjects(), ["Math", "Physics"]);
    assert!(!stored.is_complete());

    stored.complete();
    repo.upsert_target(&stored).await.unwrap();
    assert!(repo.get_target(day).await.unwrap().unwrap().is_complete());

    // a fresh target for the same day replaces the completed one entirely
    repo.upsert_target(&build_target(day, &[("History", "WW2")]))
        .await
        .unwrap();

    let replaced = repo.get_target(day).await.unwrap().unwrap();
    assert!(!replaced.is_complete());
    assert_eq!(replaced.subjects(), ["History"]);
    assert_eq!(replaced.chapters().len(), 1);
}

#[tokio::test]
async fn sqlite_range_query_is_inclusive_and_sorted() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_range?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let day0 = fixed_clock().today();
    for offset in [6, 0, 3] {
        repo.upsert_target(&build_target(day0.plus_days(offset), &[("Math", "Ch1")]))
            .await
            .unwrap();
    }

    let days: Vec<StudyDay> = repo
        .list_targets_in_range(day0, day0.plus_days(6))
        .await
        .unwrap()
        .iter()
        .map(StudyTarget::date)
        .collect();
    assert_eq!(days, vec![day0, day0.plus_days(3), day0.plus_days(6)]);

    let partial = repo
        .list_targets_in_range(day0.plus_days(1), day0.plus_days(5))
        .await
        .unwrap();
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].date(), day0.plus_days(3));

    let inverted = repo
        .list_targets_in_range(day0.plus_days(6), day0)
        .await
        .unwrap();
    assert!(inverted.is_empty());
}
