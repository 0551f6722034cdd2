mod file_test;

use assertables::*;
use kr_core::testutils::*;
use rstest::*;
use tracing_test::traced_test;

use super::*;

#[fixture]
fn pod_query() -> AuditQuery {
    AuditQuery {
        identity: Identity::namespaced(TEST_NAMESPACE, TEST_POD),
        window: TimeWindow::default(),
        query: "fields @timestamp, @message".into(),
    }
}
