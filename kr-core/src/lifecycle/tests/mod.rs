mod node_test;
mod replay_test;

use assertables::*;
use rstest::*;
use tracing_test::traced_test;

use super::*;
use crate::testutils::*;

fn classify_all(records: Vec<RecordBuilder>) -> Vec<LifecycleEvent> {
    let records: Vec<_> = records.into_iter().map(RecordBuilder::build).collect();
    Dispatcher::default().extract(&records).events
}

// Every ordering of `items`; only used with a handful of elements.
fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }

    let mut out = vec![];
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}
