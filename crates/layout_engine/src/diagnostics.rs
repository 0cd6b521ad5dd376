//! Diagnostic notifications
//!
//! Validation runs independently of layout and reports problems from other
//! threads or tasks. Reports are queued on a bounded channel and applied to the
//! arena by the [`DiagnosticOverlayController`] between placement passes.

use crate::arena::PresentationArena;
use crate::{PlacementError, Result};
use render_model::{DiagnosticKind, DiagnosticPalette, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// A queued diagnostic change for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticNotice {
    /// Outline the node
    Report { node: NodeId, kind: DiagnosticKind },
    /// Remove the node's outline
    Clear { node: NodeId },
}

impl DiagnosticNotice {
    pub fn node(&self) -> NodeId {
        match self {
            Self::Report { node, .. } | Self::Clear { node } => *node,
        }
    }
}

/// Diagnostic channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Notices that can be queued before senders wait
    pub capacity: usize,
    pub palette: DiagnosticPalette,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            palette: DiagnosticPalette::default(),
        }
    }
}

impl DiagnosticConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.capacity == 0 {
            return Err(PlacementError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

/// Create a bounded diagnostic channel
pub fn diagnostic_channel(capacity: usize) -> (DiagnosticSender, DiagnosticReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (DiagnosticSender { tx }, DiagnosticReceiver { rx })
}

/// Sending half, cloned into every validation task
#[derive(Debug, Clone)]
pub struct DiagnosticSender {
    tx: mpsc::Sender<DiagnosticNotice>,
}

impl DiagnosticSender {
    /// Queue a notice, waiting for room
    pub async fn notify(&self, notice: DiagnosticNotice) -> Result<()> {
        self.tx
            .send(notice)
            .await
            .map_err(|_| PlacementError::DiagnosticChannelClosed)
    }

    /// Queue a notice without waiting
    pub fn try_notify(&self, notice: DiagnosticNotice) -> Result<()> {
        self.tx.try_send(notice).map_err(|e| match e {
            TrySendError::Full(_) => PlacementError::DiagnosticChannelFull,
            TrySendError::Closed(_) => PlacementError::DiagnosticChannelClosed,
        })
    }

    /// Queue a notice from a thread outside any async runtime
    pub fn notify_blocking(&self, notice: DiagnosticNotice) -> Result<()> {
        self.tx
            .blocking_send(notice)
            .map_err(|_| PlacementError::DiagnosticChannelClosed)
    }

    pub async fn report(&self, node: NodeId, kind: DiagnosticKind) -> Result<()> {
        self.notify(DiagnosticNotice::Report { node, kind }).await
    }

    pub async fn clear(&self, node: NodeId) -> Result<()> {
        self.notify(DiagnosticNotice::Clear { node }).await
    }
}

/// Receiving half, owned by the layout side
#[derive(Debug)]
pub struct DiagnosticReceiver {
    rx: mpsc::Receiver<DiagnosticNotice>,
}

impl DiagnosticReceiver {
    /// Next queued notice, if any
    pub fn try_recv(&mut self) -> Option<DiagnosticNotice> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next notice; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<DiagnosticNotice> {
        self.rx.recv().await
    }
}

/// Applies queued diagnostics to presentation nodes
#[derive(Debug)]
pub struct DiagnosticOverlayController {
    receiver: DiagnosticReceiver,
    palette: DiagnosticPalette,
    active: HashMap<NodeId, DiagnosticKind>,
}

impl DiagnosticOverlayController {
    pub fn new(receiver: DiagnosticReceiver, palette: DiagnosticPalette) -> Self {
        Self {
            receiver,
            palette,
            active: HashMap::new(),
        }
    }

    /// Create a controller together with the sender feeding it
    pub fn from_config(config: &DiagnosticConfig) -> (Self, DiagnosticSender) {
        let (sender, receiver) = diagnostic_channel(config.capacity);
        (Self::new(receiver, config.palette), sender)
    }

    pub fn palette(&self) -> &DiagnosticPalette {
        &self.palette
    }

    /// Diagnostic currently shown on a node
    pub fn active(&self, node: NodeId) -> Option<DiagnosticKind> {
        self.active.get(&node).copied()
    }

    /// Apply every queued notice and return how many took effect.
    ///
    /// Nothing is applied while a placement pass is running; the notices stay
    /// queued for the next call.
    pub fn drain(&mut self, arena: &mut PresentationArena) -> usize {
        if arena.is_negotiating() {
            tracing::trace!("placement in progress, diagnostics deferred");
            return 0;
        }

        let mut applied = 0;
        while let Some(notice) = self.receiver.try_recv() {
            if self.apply(arena, notice) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, arena: &mut PresentationArena, notice: DiagnosticNotice) -> bool {
        let node = notice.node();
        let outcome = match notice {
            DiagnosticNotice::Report { kind, .. } => arena.process_diagnostic(node, kind, &self.palette),
            DiagnosticNotice::Clear { .. } => arena.clear_diagnostic_display(node),
        };

        match (notice, outcome) {
            (DiagnosticNotice::Report { kind, .. }, Ok(true)) => {
                tracing::debug!(node = %node, ?kind, "diagnostic shown");
                self.active.insert(node, kind);
                true
            }
            (DiagnosticNotice::Clear { .. }, Ok(true)) => {
                self.active.remove(&node);
                true
            }
            (_, Ok(false)) => {
                tracing::debug!(node = %node, "node is detached, diagnostic dropped");
                self.active.remove(&node);
                false
            }
            (_, Err(err)) => {
                tracing::debug!(node = %node, error = %err, "diagnostic dropped");
                self.active.remove(&node);
                false
            }
        }
    }
}
