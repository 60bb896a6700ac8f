use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Message {
    /// Raw `data:` payload exactly as the gateway sent it.
    pub raw: String,
    /// Parsed payload, `None` when the data is not JSON.
    pub data: Option<Value>,
    pub received_at: Instant,
}

/// A live subscription to a gateway's event stream.
pub struct Subscription {
    message_rx: mpsc::UnboundedReceiver<Message>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Subscription {
    pub async fn open(base_url: &str) -> Result<Self> {
        let url = format!("{}/events", base_url.trim_end_matches('/'));
        let (tx, rx) = mpsc::unbounded_channel();

        // A closed stream ends the subscription instead of reconnecting, so the
        // probe can report it.
        let client = es::ClientBuilder::for_url(&url)?
            .reconnect(es::ReconnectOptions::reconnect(false).build())
            .build();

        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        let message = Message {
                            data: serde_json::from_str(&event.data).ok(),
                            raw: event.data,
                            received_at: Instant::now(),
                        };

                        if tx.send(message).is_err() {
                            debug!("Subscriber for {} dropped", url);
                            break;
                        }
                    }
                    Some(Ok(es::SSE::Comment(_))) => {
                        // keep-alive
                    }
                    Some(Err(es::Error::Eof)) | Some(Err(es::Error::UnexpectedEof)) => {
                        debug!("Stream closed by server for {}", url);
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("Stream error for {}: {}", url, e);
                        break;
                    }
                    None => {
                        debug!("Stream ended for {}", url);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            message_rx: rx,
            _handle: handle,
        })
    }

    /// Next message, or `None` once the stream has closed.
    pub async fn next_message(&mut self, timeout: Duration) -> Result<Option<Message>> {
        match tokio::time::timeout(timeout, self.message_rx.recv()).await {
            Ok(message) => Ok(message),
            Err(_) => anyhow::bail!("No message within {:?}", timeout),
        }
    }
}

/// Counts messages and flags one that repeats the message before it.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    last: Option<String>,
    received: usize,
    duplicates: usize,
}

impl DuplicateTracker {
    /// Records `raw` and returns true when it equals the previous message.
    pub fn observe(&mut self, raw: &str) -> bool {
        self.received += 1;
        let duplicate = self.last.as_deref() == Some(raw);
        if duplicate {
            self.duplicates += 1;
        } else {
            self.last = Some(raw.to_string());
        }
        duplicate
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
