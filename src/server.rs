use std::{fs, io::ErrorKind, os::unix::fs::FileTypeExt, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream, unix::OwnedWriteHalf},
    signal::unix::{SignalKind, signal},
    sync::{Mutex, mpsc},
};

use crate::{
    config::Config,
    deployment::Deployment,
    protocol::{ClientMessage, ClientRequest, ServerResponse, parse_client_message},
};

enum ExitReason {
    SocketMessage,
    Signal(&'static str),
}

pub async fn run(config: Config) -> Result<()> {
    let deployment = Deployment::restore(&config.deployment)
        .context("failed to bring up registry deployment")?;
    serve(deployment, &config.server.socket_path).await
}

/// Serves NDJSON requests on `socket_path` until SIGINT, SIGTERM or an `exit`
/// message, then saves the façade snapshot one last time.
pub async fn serve(deployment: Deployment, socket_path: &Path) -> Result<()> {
    prepare_socket_path(socket_path)?;
    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("unable to bind socket {}", socket_path.display()))?;

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel::<()>();
    let deployment = Arc::new(Mutex::new(deployment));

    tracing::info!(
        target: "server",
        socket = %socket_path.display(),
        "server_listening"
    );
    eprintln!(
        "itemhub listening on unix socket (NDJSON): {}",
        socket_path.display()
    );

    let exit_reason = loop {
        tokio::select! {
            _ = sigint.recv() => break ExitReason::Signal("SIGINT"),
            _ = sigterm.recv() => break ExitReason::Signal("SIGTERM"),
            Some(()) = exit_rx.recv() => break ExitReason::SocketMessage,
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _)) => {
                        let sender = exit_tx.clone();
                        let deployment = Arc::clone(&deployment);
                        tokio::spawn(async move {
                            if let Err(err) = handle_client(stream, deployment, sender).await {
                                tracing::warn!(
                                    target: "server",
                                    error = %format!("{err:#}"),
                                    "client_handling_failed"
                                );
                            }
                        });
                    }
                    Err(err) => {
                        tracing::warn!(target: "server", error = %err, "accept_failed");
                    }
                }
            }
        }
    };

    cleanup_socket_path(socket_path)?;
    deployment
        .lock()
        .await
        .save()
        .context("failed to save facade snapshot on shutdown")?;

    let reason = match exit_reason {
        ExitReason::SocketMessage => "exit message",
        ExitReason::Signal(signal_name) => signal_name,
    };
    tracing::info!(target: "server", reason = reason, "server_stopped");
    eprintln!("itemhub stopped: received {reason}");

    Ok(())
}

/// Runs one request against the deployment and saves the snapshot when a
/// state-changing request succeeds.
pub fn apply_request(deployment: &mut Deployment, request: ClientRequest) -> ServerResponse {
    let mutates = request.mutates();
    let response = match request {
        ClientRequest::Call { ctx, call } => match deployment.call(&ctx, &call) {
            Ok(receipt) => ServerResponse::receipt(receipt),
            Err(err) => ServerResponse::from(&err),
        },
        ClientRequest::Upgrade {
            caller,
            implementation,
        } => match deployment.upgrade(&caller, &implementation) {
            Ok(record) => ServerResponse::upgraded(record),
            Err(err) => ServerResponse::from(&err),
        },
    };

    if response.ok
        && mutates
        && let Err(err) = deployment.save()
    {
        tracing::error!(
            target: "server",
            error_kind = ?err.kind,
            error = %err,
            "snapshot_save_failed"
        );
    }

    response
}

async fn handle_client(
    stream: UnixStream,
    deployment: Arc<Mutex<Deployment>>,
    exit_tx: mpsc::UnboundedSender<()>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_client_message(line) {
            Ok(ClientMessage::Exit) => {
                write_response(&mut writer, &ServerResponse::acknowledged()).await?;
                let _ = exit_tx.send(());
                break;
            }
            Ok(ClientMessage::Request(request)) => {
                let response = {
                    let mut deployment = deployment.lock().await;
                    apply_request(&mut deployment, request)
                };
                write_response(&mut writer, &response).await?;
            }
            Err(err) => {
                tracing::warn!(target: "server", error = %err, "invalid_protocol_message");
                write_response(&mut writer, &ServerResponse::from(&err)).await?;
            }
        }
    }

    Ok(())
}

async fn write_response(writer: &mut OwnedWriteHalf, response: &ServerResponse) -> Result<()> {
    let mut line = response.to_line().context("failed to encode response")?;
    line.push('\n');
    writer
        .write_all(line.as_bytes())
        .await
        .context("failed to write response")?;
    writer.flush().await.context("failed to flush response")
}

fn prepare_socket_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create {}", parent.display()))?;
    }

    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            if metadata.file_type().is_socket() || metadata.is_file() {
                fs::remove_file(path)
                    .with_context(|| format!("unable to remove stale socket {}", path.display()))?;
            } else {
                bail!(
                    "socket path exists but is not removable as file/socket: {}",
                    path.display()
                );
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("unable to inspect {}", path.display()));
        }
    }

    Ok(())
}

fn cleanup_socket_path(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("unable to remove {}", path.display())),
    }
}
