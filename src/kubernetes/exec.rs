//! Kubernetes pod exec functionality
//!
//! Attaches the local terminal to a command running in a pod, using the kube
//! crate's websocket exec support.

use futures::{Sink, SinkExt};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::{
    api::{Api, AttachParams, AttachedProcess, TerminalSize as KubeTerminalSize},
    Client,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::terminal::{RawModeGuard, SizeQueue};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("unable to execute remote command: {0}")]
    KubeError(#[from] kube::Error),
    #[error("unable to init terminal: {0}")]
    IoError(#[from] std::io::Error),
    #[error("exec session has no {0} stream")]
    StreamUnavailable(&'static str),
    #[error("unable to stream shell process: {0}")]
    RemoteCommandError(String),
}

/// Pod exec session
pub struct PodExec {
    attached: AttachedProcess,
}

impl PodExec {
    /// Start `command` in `container` with stdin, stdout and a TTY attached
    pub async fn start(
        client: &Client,
        namespace: &str,
        pod_name: &str,
        container: &str,
        command: &[String],
    ) -> Result<Self, ExecError> {
        let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);

        // With a TTY the server merges stderr into stdout.
        let attach_params = AttachParams::interactive_tty().container(container);

        tracing::debug!(
            namespace,
            pod = pod_name,
            container,
            command = ?command,
            "Request"
        );

        let attached = pods.exec(pod_name, command.to_vec(), &attach_params).await?;
        Ok(Self { attached })
    }

    /// Wire this process' stdio to the remote process until it exits
    ///
    /// Returns the remote exit code.
    pub async fn stream(mut self, sizes: SizeQueue) -> Result<i32, ExecError> {
        let remote_stdin = self
            .attached
            .stdin()
            .ok_or(ExecError::StreamUnavailable("stdin"))?;
        let remote_stdout = self
            .attached
            .stdout()
            .ok_or(ExecError::StreamUnavailable("stdout"))?;
        let status = self.attached.take_status();

        let resize_task = self
            .attached
            .terminal_size()
            .map(|resize_tx| tokio::spawn(forward_sizes(sizes, resize_tx)));

        let raw = RawModeGuard::enable()?;

        let input_task = tokio::spawn(async move {
            let mut remote_stdin = remote_stdin;
            let result = pump(tokio::io::stdin(), &mut remote_stdin).await;
            let _ = remote_stdin.shutdown().await;
            result
        });

        let output = pump(remote_stdout, tokio::io::stdout()).await;

        input_task.abort();
        if let Some(task) = resize_task {
            task.abort();
        }

        if let Err(e) = output {
            // Input is gone too, so the remote shell would never exit on its own.
            tracing::warn!("Local output failed, closing session: {}", e);
            self.attached.abort();
            drop(raw);
            return Err(ExecError::IoError(e));
        }

        let status = match status {
            Some(status) => status.await,
            None => None,
        };

        self.attached
            .join()
            .await
            .map_err(|e| ExecError::RemoteCommandError(e.to_string()))?;

        drop(raw);
        println!();

        exit_code(status.as_ref())
    }
}

/// Copy `reader` into `writer` until EOF, flushing after every chunk
///
/// Keystroke echoes arrive a few bytes at a time and must show up at once.
pub async fn pump<R, W>(mut reader: R, mut writer: W) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 4096];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        writer.flush().await?;
        total += n as u64;
    }

    Ok(total)
}

/// Drain the size queue into the transport's resize channel
pub async fn forward_sizes<S>(mut sizes: SizeQueue, mut resize_tx: S)
where
    S: Sink<KubeTerminalSize> + Unpin,
{
    while let Some(size) = sizes.next().await {
        tracing::trace!(cols = size.cols, rows = size.rows, "Sending terminal size");
        if resize_tx.send(size.into()).await.is_err() {
            break;
        }
    }
}

/// Map the server's final status to a process exit code
pub fn exit_code(status: Option<&Status>) -> Result<i32, ExecError> {
    let Some(status) = status else {
        return Ok(0);
    };

    if status.status.as_deref() == Some("Success") {
        return Ok(0);
    }

    let code = status
        .details
        .as_ref()
        .and_then(|d| d.causes.as_ref())
        .and_then(|causes| {
            causes
                .iter()
                .find(|c| c.reason.as_deref() == Some("ExitCode"))
                .and_then(|c| c.message.as_deref())
                .and_then(|m| m.trim().parse::<i32>().ok())
        });

    match code {
        Some(code) if status.reason.as_deref() == Some("NonZeroExitCode") => Ok(code),
        _ => Err(ExecError::RemoteCommandError(
            status
                .message
                .clone()
                .unwrap_or_else(|| "remote command failed".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TerminalSize;
    use futures::StreamExt;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{StatusCause, StatusDetails};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Writer standing in for a closed terminal
    struct ClosedWriter;

    impl AsyncWrite for ClosedWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn failure(reason: &str, message: &str, causes: Vec<StatusCause>) -> Status {
        Status {
            status: Some("Failure".into()),
            reason: Some(reason.into()),
            message: Some(message.into()),
            details: Some(StatusDetails {
                causes: Some(causes),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn exit_cause(code: &str) -> StatusCause {
        StatusCause {
            reason: Some("ExitCode".into()),
            message: Some(code.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exit_code_without_status() {
        assert_eq!(exit_code(None).unwrap(), 0);
    }

    #[test]
    fn test_exit_code_success() {
        let status = Status {
            status: Some("Success".into()),
            ..Default::default()
        };
        assert_eq!(exit_code(Some(&status)).unwrap(), 0);
    }

    #[test]
    fn test_exit_code_non_zero() {
        let status = failure(
            "NonZeroExitCode",
            "command terminated with non-zero exit code: error executing command [false], exit code 3",
            vec![exit_cause("3")],
        );
        assert_eq!(exit_code(Some(&status)).unwrap(), 3);
    }

    #[test]
    fn test_exit_code_internal_error() {
        let status = failure(
            "InternalError",
            "executable file not found in $PATH",
            vec![],
        );
        match exit_code(Some(&status)) {
            Err(ExecError::RemoteCommandError(msg)) => {
                assert!(msg.contains("executable file not found"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_exit_code_unparseable_cause() {
        let status = failure("NonZeroExitCode", "exit code ???", vec![exit_cause("???")]);
        assert!(exit_code(Some(&status)).is_err());
    }

    #[tokio::test]
    async fn test_pump_copies_until_eof() {
        let (mut local, remote) = tokio::io::duplex(64);
        let mut sink = Vec::new();

        local.write_all(b"ls -la\r").await.unwrap();
        drop(local);

        let copied = pump(remote, &mut sink).await.unwrap();
        assert_eq!(copied, 7);
        assert_eq!(sink, b"ls -la\r");
    }

    #[tokio::test]
    async fn test_pump_handles_chunks_larger_than_buffer() {
        let payload = vec![b'x'; 10_000];
        let (mut local, remote) = tokio::io::duplex(1024);
        let writer = tokio::spawn(async move {
            local.write_all(&vec![b'x'; 10_000]).await.unwrap();
        });

        let mut sink = Vec::new();
        let copied = pump(remote, &mut sink).await.unwrap();
        writer.await.unwrap();

        assert_eq!(copied, 10_000);
        assert_eq!(sink, payload);
    }

    #[tokio::test]
    async fn test_pump_stops_on_write_error_while_remote_open() {
        let (mut remote_end, remote) = tokio::io::duplex(64);
        remote_end.write_all(b"$ ").await.unwrap();

        // The remote side stays open, so only the write error can end the copy.
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            pump(remote, ClosedWriter),
        )
        .await
        .expect("pump should not wait for more remote output");

        let err = result.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        drop(remote_end);
    }

    #[tokio::test]
    async fn test_forward_sizes_sends_initial_then_stops() {
        let (tx, queue) = SizeQueue::with_initial(TerminalSize::new(80, 24));
        let (resize_tx, resize_rx) = futures::channel::mpsc::channel::<KubeTerminalSize>(4);

        let forward = tokio::spawn(forward_sizes(queue, resize_tx));
        assert!(tx.send(TerminalSize::new(120, 40)).await);
        drop(tx);
        forward.await.unwrap();

        let sent: Vec<(u16, u16)> = resize_rx
            .map(|s| (s.width, s.height))
            .collect()
            .await;
        assert_eq!(sent, vec![(80, 24), (120, 40)]);
    }
}
