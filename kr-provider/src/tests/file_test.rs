use std::fs;

use super::*;

fn write_log(lines: &[String]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    fs::write(&path, lines.join("\n")).unwrap();
    (dir, path)
}

#[rstest]
fn test_file_provider_missing_file() {
    let err = FileProvider::new("/definitely/not/here/audit.log").err().unwrap();

    assert!(matches!(err.downcast_ref::<ProviderError>(), Some(ProviderError::FileNotFound(_))));
    assert_contains!(err.to_string(), "/definitely/not/here/audit.log");
}

#[rstest]
#[tokio::test]
#[traced_test]
async fn test_file_provider_skips_bad_lines(pod_query: AuditQuery) {
    let (_dir, path) = write_log(&[
        pod_create(TEST_NAMESPACE, TEST_POD, TEST_IMAGE, 0).line(),
        String::new(),
        "{\"kind\": \"Event\", \"truncated".into(),
        "   ".into(),
        pod_delete(TEST_NAMESPACE, TEST_POD, 30).line(),
    ]);

    let records = FileProvider::new(&path).unwrap().get_events(&pod_query).await.unwrap();

    let verbs: Vec<_> = records.iter().map(|r| r.verb.as_str()).collect();
    assert_eq!(verbs, vec!["create", "delete"]);
    assert!(logs_contain("skipped undecodable lines in audit log"));
}

#[rstest]
#[tokio::test]
#[traced_test]
async fn test_file_provider_skips_invalid_utf8_line(pod_query: AuditQuery) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let mut contents = pod_create(TEST_NAMESPACE, TEST_POD, TEST_IMAGE, 0).line().into_bytes();
    contents.extend_from_slice(b"\n{\"kind\": \"Event\", \"user\": \"caf\xC3\n");
    contents.extend_from_slice(pod_delete(TEST_NAMESPACE, TEST_POD, 30).line().as_bytes());
    contents.extend_from_slice(b"\r\n");
    fs::write(&path, contents).unwrap();

    let records = FileProvider::new(&path).unwrap().get_events(&pod_query).await.unwrap();

    let verbs: Vec<_> = records.iter().map(|r| r.verb.as_str()).collect();
    assert_eq!(verbs, vec!["create", "delete"]);
    assert!(logs_contain("skipped=1"));
}

#[rstest]
#[tokio::test]
async fn test_file_provider_filters_by_window(mut pod_query: AuditQuery) {
    let (_dir, path) = write_log(&[
        pod_create(TEST_NAMESPACE, TEST_POD, TEST_IMAGE, 0).line(),
        pod_binding(TEST_NAMESPACE, TEST_POD, TEST_NODE, 10).line(),
        pod_delete(TEST_NAMESPACE, TEST_POD, 20).line(),
    ]);
    pod_query.window = TimeWindow::new(Some(ts(5)), Some(ts(15)));

    let records = FileProvider::new(&path).unwrap().get_events(&pod_query).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].received_at(), ts(10));
}

#[rstest]
#[tokio::test]
async fn test_file_provider_empty_file(pod_query: AuditQuery) {
    let (_dir, path) = write_log(&[]);

    let records = FileProvider::new(&path).unwrap().get_events(&pod_query).await.unwrap();

    assert_is_empty!(records);
}
