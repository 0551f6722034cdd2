use kr_core::prelude::*;

use crate::replay;

pub async fn cmd(args: &replay::Args) -> EmptyResult {
    match replay::snapshot(args, QueryIntent::Get).await? {
        (_, Some(snapshot)) => print!("{}", render(&snapshot)?),
        (identity, None) => println!("{}", replay::no_events(&identity)),
    }
    Ok(())
}

/// The last recorded body of the object, as YAML.
pub fn render(snapshot: &Snapshot) -> anyhow::Result<String> {
    match snapshot.object() {
        Some(obj) => Ok(serde_yaml::to_string(&obj)?),
        None => Ok(format!("No object body recorded for: {}\n", snapshot.identity())),
    }
}
