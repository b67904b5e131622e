use std::fs;

use crate::survey::questions::{DirectoryQuestionSets, QuestionSetError, QuestionSetProvider};

fn write_set(root: &std::path::Path, lang: &str, age_group: &str, body: &str) {
    let dir = root.join("survey").join(lang);
    fs::create_dir_all(&dir).expect("create survey dir");
    fs::write(dir.join(format!("{age_group}.json")), body).expect("write question set");
}

#[tokio::test]
async fn fetches_documents_by_language_and_age_group() {
    let root = tempfile::tempdir().expect("tempdir");
    write_set(root.path(), "en", "age1", r#"{"questions":["q1","q2"]}"#);
    write_set(root.path(), "es", "age1", r#"{"questions":["p1"]}"#);
    let provider = DirectoryQuestionSets::new(root.path());

    let english = provider.fetch("en", "age1").await.expect("lookup succeeds");
    assert_eq!(english.as_deref(), Some(r#"{"questions":["q1","q2"]}"#));

    let spanish = provider.fetch("es", "age1").await.expect("lookup succeeds");
    assert_eq!(spanish.as_deref(), Some(r#"{"questions":["p1"]}"#));

    let missing = provider.fetch("en", "age2").await.expect("lookup succeeds");
    assert!(missing.is_none());
}

#[tokio::test]
async fn rejects_traversal_segments() {
    let root = tempfile::tempdir().expect("tempdir");
    write_set(root.path(), "en", "age1", "{}");
    let provider = DirectoryQuestionSets::new(root.path().join("nested"));

    for (lang, age_group) in [("..", "age1"), ("en", "../age1"), ("", "age1"), ("en", "age1.json")] {
        assert!(provider.document_path(lang, age_group).is_none());
        let found = provider.fetch(lang, age_group).await.expect("lookup succeeds");
        assert!(found.is_none());
    }
}

#[tokio::test]
async fn invalid_documents_are_errors() {
    let root = tempfile::tempdir().expect("tempdir");
    write_set(root.path(), "fr", "age3", "{ broken");
    let provider = DirectoryQuestionSets::new(root.path());

    let err = provider.fetch("fr", "age3").await.expect_err("invalid json");

    assert!(matches!(err, QuestionSetError::InvalidDocument { .. }));
}
