//! Signal adapter
//!
//! Runs `signal-cli` in daemon mode and talks JSON-RPC over its unix socket.
//! One long-lived connection receives messages; every send opens its own
//! short connection so concurrent senders never share a stream.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, timeout, Instant};

use crate::application::errors::{BusError, SendError};
use crate::domain::entities::{InboundMessage, OutboundMessage, PhoneNumber};
use crate::domain::traits::{BusClient, InboundStream};
use crate::infrastructure::config::SignalConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(60);
const READY_POLL: Duration = Duration::from_millis(250);

/// One line of the daemon's JSON-RPC stream
#[derive(Debug, Deserialize)]
struct RpcLine {
    method: Option<String>,
    params: Option<serde_json::Value>,
    id: Option<serde_json::Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReceiveParams {
    envelope: Envelope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    source_number: Option<String>,
    source: Option<String>,
    timestamp: Option<i64>,
    data_message: Option<DataMessage>,
}

#[derive(Debug, Deserialize)]
struct DataMessage {
    message: Option<String>,
    #[serde(default)]
    attachments: Vec<AttachmentRef>,
}

#[derive(Debug, Deserialize)]
struct AttachmentRef {
    id: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    id: String,
    params: SendParams<'a>,
}

#[derive(Serialize)]
struct SendParams<'a> {
    recipient: Vec<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<String>,
}

/// Signal bus backed by a `signal-cli` daemon
pub struct SignalAdapter {
    cli_path: PathBuf,
    account: String,
    socket_path: PathBuf,
    attachment_dir: PathBuf,
    startup_timeout: Duration,
    daemon: Mutex<Option<Child>>,
    subscribed: AtomicBool,
}

impl SignalAdapter {
    pub fn new(config: &SignalConfig) -> Result<Self, BusError> {
        let account = config
            .account
            .clone()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| {
                BusError::Startup(
                    "Failed to retrieve assistant phone number from $ASSISTANT_NUMBER".to_string(),
                )
            })?;

        Ok(Self {
            cli_path: config.cli_path.clone(),
            account,
            socket_path: config.socket_path.clone(),
            attachment_dir: default_attachment_dir(),
            startup_timeout: Duration::from_secs(config.startup_timeout_secs),
            daemon: Mutex::new(None),
            subscribed: AtomicBool::new(false),
        })
    }

    /// Start the daemon and wait until its socket accepts connections
    pub async fn launch(&self) -> Result<(), BusError> {
        tracing::info!("Connecting to signal-cli.");

        if self.socket_path.exists() {
            tokio::fs::remove_file(&self.socket_path).await?;
        }

        let child = Command::new(&self.cli_path)
            .arg("-a")
            .arg(&self.account)
            .arg("daemon")
            .arg("--socket")
            .arg(&self.socket_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BusError::Startup(format!(
                    "Unable to start {}: {}",
                    self.cli_path.display(),
                    e
                ))
            })?;

        *self.daemon.lock().await = Some(child);

        self.wait_until_ready().await?;
        tracing::info!("Started signal-cli daemon on {}", self.socket_path.display());
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<(), BusError> {
        let deadline = Instant::now() + self.startup_timeout;

        loop {
            if UnixStream::connect(&self.socket_path).await.is_ok() {
                return Ok(());
            }

            if let Some(child) = self.daemon.lock().await.as_mut() {
                if let Some(status) = child.try_wait()? {
                    return Err(BusError::Startup(format!(
                        "signal-cli exited during startup with {}",
                        status
                    )));
                }
            }

            if Instant::now() >= deadline {
                return Err(BusError::Startup(format!(
                    "signal-cli socket {} not ready after {:?}",
                    self.socket_path.display(),
                    self.startup_timeout
                )));
            }
            sleep(READY_POLL).await;
        }
    }

    async fn request(&self, payload: String, request_id: &str) -> Result<(), SendError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| SendError::Transport(format!("connect failed: {}", e)))?;
        let (read_half, mut write_half) = stream.into_split();

        write_half
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let mut lines = BufReader::new(read_half).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?
        {
            let Ok(reply) = serde_json::from_str::<RpcLine>(&line) else {
                continue;
            };
            // Receive notifications share the connection; only our reply matters.
            if reply.id.as_ref().and_then(|v| v.as_str()) != Some(request_id) {
                continue;
            }
            return match reply.error {
                Some(err) => Err(SendError::Transport(format!(
                    "signal-cli error {}: {}",
                    err.code, err.message
                ))),
                None => Ok(()),
            };
        }

        Err(SendError::Transport(
            "signal-cli closed the connection without a reply".to_string(),
        ))
    }
}

#[async_trait]
impl BusClient for SignalAdapter {
    fn subscribe(&self) -> Result<InboundStream, BusError> {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(BusError::AlreadySubscribed);
        }

        let std_stream = std::os::unix::net::UnixStream::connect(&self.socket_path)?;
        std_stream.set_nonblocking(true)?;
        let stream = UnixStream::from_std(std_stream)?;

        let (tx, rx) = mpsc::channel(10);
        let attachment_dir = self.attachment_dir.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_notification(&line, &attachment_dir) {
                        Ok(Some(message)) => {
                            if tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Failed to parse new message from signal {}", e),
                    },
                    Ok(None) => {
                        tracing::error!("signal-cli closed the receive connection");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Failed to read from signal-cli: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        let recipient = PhoneNumber::parse(&message.recipient)?;
        let request_id = uuid::Uuid::new_v4().to_string();

        let request = SendRequest {
            jsonrpc: "2.0",
            method: "send",
            id: request_id.clone(),
            params: SendParams {
                recipient: vec![recipient.as_str()],
                message: &message.text,
                attachments: message
                    .attachments
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect(),
            },
        };
        let mut payload =
            serde_json::to_string(&request).map_err(|e| SendError::Transport(e.to_string()))?;
        payload.push('\n');

        timeout(SEND_TIMEOUT, self.request(payload, &request_id))
            .await
            .map_err(|_| SendError::Transport(format!("no reply within {:?}", SEND_TIMEOUT)))??;

        tracing::info!("Message sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "signal"
    }
}

fn default_attachment_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".local/share/signal-cli/attachments")
}

/// Turn one daemon line into an inbound message.
///
/// Receipts, typing notices, sync messages and replies to requests carry no
/// data message and yield `Ok(None)`.
fn parse_notification(line: &str, attachment_dir: &Path) -> Result<Option<InboundMessage>, String> {
    let rpc: RpcLine = serde_json::from_str(line).map_err(|e| e.to_string())?;
    if rpc.method.as_deref() != Some("receive") {
        return Ok(None);
    }

    let params = rpc.params.ok_or("receive notification without params")?;
    let params: ReceiveParams = serde_json::from_value(params).map_err(|e| e.to_string())?;
    let envelope = params.envelope;

    let Some(data) = envelope.data_message else {
        return Ok(None);
    };

    let sender = envelope
        .source_number
        .or(envelope.source)
        .ok_or("envelope without a source number")?;

    let timestamp: DateTime<Utc> = envelope
        .timestamp
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Utc::now);

    let attachments = data
        .attachments
        .into_iter()
        .map(|a| attachment_dir.join(a.id))
        .collect();

    Ok(Some(
        InboundMessage::new(sender, data.message.unwrap_or_default())
            .with_timestamp(timestamp)
            .with_attachments(attachments),
    ))
}
