//! Background fetch worker.
//!
//! The TUI loop is synchronous; HTTP is async. This worker bridges the
//! two: commands go in over a channel, a dispatcher task spawns one task
//! per fetch, and outcomes come back over a second channel in completion
//! order. A slow response therefore never blocks a newer one; the
//! coordinator's sequence guard decides which completion wins.

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::data::record::{ActivityRecord, ActivitySnapshot};
use crate::refresh::{RefreshRequest, Surface};
use crate::source::client::{ActivityClient, ClientError};

/// Per-fetch size caps, from the CLI.
#[derive(Debug, Clone)]
pub struct FetchLimits {
    /// Cap per series on the summary/chart fetch.
    pub max_data_points: u32,
    /// Row cap on the detail table fetch.
    pub detail_rows: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self { max_data_points: 30, detail_rows: 200 }
    }
}

/// Work submitted to the worker.
#[derive(Debug, Clone)]
pub enum FetchCommand {
    Refresh(RefreshRequest),
    AddServer(String),
    RemoveServer(String),
}

/// Successful refresh data, per surface.
#[derive(Debug)]
pub enum Payload {
    Summary(ActivitySnapshot),
    Detail(Vec<ActivityRecord>),
}

/// Registry operation kind, for status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryAction {
    Added,
    Removed,
}

/// A completed command, reported back to the main loop.
#[derive(Debug)]
pub enum Outcome {
    Refresh {
        surface: Surface,
        seq: u64,
        result: Result<Payload, ClientError>,
    },
    Registry {
        action: RegistryAction,
        server: String,
        result: Result<(), ClientError>,
    },
}

/// Handle to the background fetch tasks.
///
/// Dropping the worker closes the command channel; the dispatcher task
/// ends and in-flight fetches finish into a closed outcome channel, so
/// nothing outlives the main loop.
#[derive(Debug)]
pub struct FetchWorker {
    commands: mpsc::Sender<FetchCommand>,
    outcomes: mpsc::Receiver<Outcome>,
}

impl FetchWorker {
    /// Spawn the dispatcher on the given runtime.
    pub fn spawn(handle: &Handle, client: ActivityClient, limits: FetchLimits) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<FetchCommand>(32);
        let (out_tx, out_rx) = mpsc::channel::<Outcome>(32);

        handle.spawn(async move {
            while let Some(command) = cmd_rx.recv().await {
                let client = client.clone();
                let limits = limits.clone();
                let out = out_tx.clone();
                // One task per fetch so completions may interleave.
                tokio::spawn(async move {
                    let outcome = run_command(&client, &limits, command).await;
                    let _ = out.send(outcome).await;
                });
            }
        });

        Self { commands: cmd_tx, outcomes: out_rx }
    }

    /// Submit a command without blocking. If the queue is full the
    /// command is dropped; the next countdown fire retries anyway, and
    /// a bounded queue keeps a slow backend from piling up requests.
    pub fn submit(&self, command: FetchCommand) {
        if let Err(err) = self.commands.try_send(command) {
            tracing::warn!(error = %err, "fetch queue full, dropping command");
        }
    }

    /// Take the next completed outcome, if any, without blocking.
    pub fn poll(&mut self) -> Option<Outcome> {
        self.outcomes.try_recv().ok()
    }
}

async fn run_command(
    client: &ActivityClient,
    limits: &FetchLimits,
    command: FetchCommand,
) -> Outcome {
    match command {
        FetchCommand::Refresh(request) => {
            let result = match request.surface {
                Surface::Summary => client
                    .fetch_activities(limits.max_data_points, request.server.as_deref())
                    .await
                    .map(Payload::Summary),
                Surface::Detail => client
                    .fetch_recent(limits.detail_rows, request.server.as_deref())
                    .await
                    .map(Payload::Detail),
            };
            if let Err(error) = &result {
                tracing::warn!(
                    surface = ?request.surface,
                    seq = request.seq,
                    %error,
                    "refresh failed"
                );
            }
            Outcome::Refresh { surface: request.surface, seq: request.seq, result }
        }
        FetchCommand::AddServer(server) => {
            let result = client.add_server(&server).await;
            if let Err(error) = &result {
                tracing::warn!(%server, %error, "add server failed");
            }
            Outcome::Registry { action: RegistryAction::Added, server, result }
        }
        FetchCommand::RemoveServer(server) => {
            let result = client.remove_server(&server).await;
            if let Err(error) = &result {
                tracing::warn!(%server, %error, "remove server failed");
            }
            Outcome::Registry { action: RegistryAction::Removed, server, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Poll until an outcome arrives or the deadline passes.
    async fn wait_for_outcome(worker: &mut FetchWorker) -> Option<Outcome> {
        for _ in 0..100 {
            if let Some(outcome) = worker.poll() {
                return Some(outcome);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }

    fn unreachable_client() -> ActivityClient {
        // Nothing listens on this port; requests fail fast.
        ActivityClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_error_outcome_carries_surface_and_seq() {
        let mut worker = FetchWorker::spawn(
            &Handle::current(),
            unreachable_client(),
            FetchLimits::default(),
        );

        worker.submit(FetchCommand::Refresh(RefreshRequest {
            surface: Surface::Summary,
            seq: 7,
            server: None,
        }));

        let outcome = wait_for_outcome(&mut worker).await.expect("no outcome");
        match outcome {
            Outcome::Refresh { surface, seq, result } => {
                assert_eq!(surface, Surface::Summary);
                assert_eq!(seq, 7);
                assert!(result.is_err());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_registry_error_outcome() {
        let mut worker = FetchWorker::spawn(
            &Handle::current(),
            unreachable_client(),
            FetchLimits::default(),
        );

        worker.submit(FetchCommand::AddServer("play.example.net".to_string()));

        let outcome = wait_for_outcome(&mut worker).await.expect("no outcome");
        match outcome {
            Outcome::Registry { action, server, result } => {
                assert_eq!(action, RegistryAction::Added);
                assert_eq!(server, "play.example.net");
                assert!(result.is_err());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_survives_multiple_failures() {
        let mut worker = FetchWorker::spawn(
            &Handle::current(),
            unreachable_client(),
            FetchLimits::default(),
        );

        for seq in 1..=3 {
            worker.submit(FetchCommand::Refresh(RefreshRequest {
                surface: Surface::Detail,
                seq,
                server: Some("play.example.net".to_string()),
            }));
        }

        let mut seen = 0;
        while seen < 3 {
            match wait_for_outcome(&mut worker).await {
                Some(Outcome::Refresh { result, .. }) => {
                    assert!(result.is_err());
                    seen += 1;
                }
                Some(other) => panic!("unexpected outcome: {:?}", other),
                None => panic!("worker stopped after {} outcomes", seen),
            }
        }
    }
}
