use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use async_trait::async_trait;
use kr_core::prelude::*;
use tokio::fs::File;
use tokio::io::{
    AsyncBufReadExt,
    BufReader,
};
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::{
    AuditProvider,
    AuditQuery,
    ProviderError,
};

/// Reads an API-server audit log written by the `Log` backend: newline-delimited JSON, one
/// record per line.
#[derive(Clone, Debug)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if !path.is_file() {
            bail!(ProviderError::FileNotFound(path));
        }
        Ok(FileProvider { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditProvider for FileProvider {
    #[instrument(skip_all, fields(path = %self.path.display(), identity = %request.identity))]
    async fn get_events(&self, request: &AuditQuery) -> anyhow::Result<Vec<AuditEvent>> {
        let file = File::open(&self.path)
            .await
            .with_context(|| format!("could not open audit log {}", self.path.display()))?;
        let mut reader = BufReader::new(file);

        // Lines are decoded from raw bytes; one that is not valid UTF-8 is skipped like any other.
        let mut records = vec![];
        let mut buf = vec![];
        let (mut lineno, mut skipped, mut outside) = (0usize, 0usize, 0usize);
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            lineno += 1;
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice::<AuditEvent>(&buf) {
                Ok(record) if request.window.contains(record.received_at()) => records.push(record),
                Ok(_) => outside += 1,
                Err(err) => {
                    debug!(line = lineno, "could not decode audit record: {err}");
                    skipped += 1;
                },
            }
        }

        if skipped > 0 {
            warn!(skipped, "skipped undecodable lines in audit log");
        }
        info!(records = records.len(), outside_window = outside, "read audit log");
        Ok(records)
    }
}
