mod source_test;

use assertables::*;
use clap::{
    CommandFactory,
    Parser,
};
use kr_core::lifecycle::{
    self,
    NodeLifecycle,
    ObjectLifecycle,
    PodLifecycle,
};
use kr_core::testutils::*;
use rstest::*;

use super::*;

fn snapshot_of(handler: &dyn ObjectLifecycle, identity: &Identity, records: Vec<RecordBuilder>) -> Snapshot {
    let records: Vec<_> = records.into_iter().map(RecordBuilder::build).collect();
    lifecycle::replay(&Dispatcher::default(), handler, identity, &records).snapshot.unwrap()
}

#[rstest]
fn test_cli_definition() {
    KubereplayCommand::command().debug_assert();
}

#[rstest]
#[case::file(&["kubereplay", "get", "pod", "the-pod", "-f", "/tmp/audit.log"])]
#[case::cloudwatch(&["kubereplay", "describe", "node", "node-7", "-g", "/aws/eks/prod/cluster", "-r", "us-west-2"])]
#[case::window(&["kubereplay", "-v", "debug", "get", "po", "p", "-n", "kube-system", "-f", "a.log", "--start", "2 hours ago"])]
fn test_cli_parses(#[case] argv: &[&str]) {
    assert!(KubereplayCommand::try_parse_from(argv).is_ok());
}

#[rstest]
#[case::no_source(&["kubereplay", "get", "pod", "the-pod"])]
#[case::both_sources(&["kubereplay", "get", "pod", "the-pod", "-f", "audit.log", "-g", "/aws/eks/prod/cluster"])]
#[case::missing_name(&["kubereplay", "describe", "pod", "-f", "audit.log"])]
fn test_cli_rejects(#[case] argv: &[&str]) {
    assert!(KubereplayCommand::try_parse_from(argv).is_err());
}

#[rstest]
fn test_cli_defaults() {
    let cmd = KubereplayCommand::try_parse_from(["kubereplay", "get", "pod", "the-pod", "-f", "audit.log"]).unwrap();

    assert_eq!(cmd.verbosity, "info");
    let KubereplaySubcommand::Get(args) = cmd.subcommand else { panic!("expected get") };
    assert_eq!(args.namespace, "default");
    assert_eq!(args.cloudwatch.poll_config(), kr_provider::PollConfig::default());
}
