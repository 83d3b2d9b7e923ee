//! Host message state machine
//!
//! Configuration is accepted exactly once; everything else is refused until
//! it has arrived and a coordinator has been attached. Messages are forwarded
//! to the coordinator without waiting for the work they trigger.

use eink_refresh::{ConfigError, ContractViolation, CoordinatorHandle, RefreshConfig, RefreshError};

use crate::message::{self, DamagePayload, HostMessage};

/// What the caller should do after a message
#[derive(Debug)]
pub enum BridgeAction {
    /// First configuration: build the coordinator and [`HostBridge::attach`] it
    Configure(Box<RefreshConfig>),
    /// Passed to the coordinator
    Forwarded,
    /// Shutdown sent; stop reading
    Stop,
    /// Blank line or unknown notification
    Ignored,
}

/// Host bridge errors
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Line is not a message, or the payload has the wrong shape
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Message breaks the channel contract
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Coordinator refused the command
    #[error(transparent)]
    Refresh(#[from] RefreshError),
}

impl BridgeError {
    /// True if the coordinator is gone and reading more input is pointless
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Refresh(e) if e.is_fatal())
    }
}

/// Routes host messages to a refresh coordinator
#[derive(Debug, Default)]
pub struct HostBridge {
    configured: bool,
    handle: Option<CoordinatorHandle>,
}

impl HostBridge {
    /// Bridge waiting for configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a configuration has been accepted
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Connect the coordinator built from the accepted configuration
    pub fn attach(&mut self, handle: CoordinatorHandle) {
        self.handle = Some(handle);
    }

    /// Parse and handle one line of the host channel
    pub fn handle_line(&mut self, line: &str) -> Result<BridgeAction, BridgeError> {
        if line.trim().is_empty() {
            return Ok(BridgeAction::Ignored);
        }
        let msg = HostMessage::parse(line)?;
        self.handle(msg)
    }

    /// Handle one message
    pub fn handle(&mut self, msg: HostMessage) -> Result<BridgeAction, BridgeError> {
        if msg.notification == message::CONFIG {
            if self.configured {
                return Err(ContractViolation::ConfigReceivedTwice.into());
            }
            let config = RefreshConfig::from_value(msg.payload)?;
            self.configured = true;
            tracing::info!(
                mock = config.mock,
                debounce_ms = ?config.debounce_ms,
                "configuration accepted"
            );
            return Ok(BridgeAction::Configure(Box::new(config)));
        }

        let handle = self
            .handle
            .as_ref()
            .ok_or(ContractViolation::NotConfigured)?;

        match msg.notification.as_str() {
            message::ASK_FULL_REFRESH => {
                handle.request_full_refresh(message::force_full_fidelity(&msg.payload))?;
                Ok(BridgeAction::Forwarded)
            }
            message::DAMAGE => {
                let payload: DamagePayload = serde_json::from_value(msg.payload)?;
                handle.notify_damage(payload.into_region()?)?;
                Ok(BridgeAction::Forwarded)
            }
            message::STOP => {
                self.shutdown()?;
                Ok(BridgeAction::Stop)
            }
            other => {
                tracing::debug!(notification = other, "ignoring unknown notification");
                Ok(BridgeAction::Ignored)
            }
        }
    }

    /// Ask the coordinator to stop and release the handle
    ///
    /// No-op if nothing is attached.
    pub fn shutdown(&mut self) -> Result<(), BridgeError> {
        match self.handle.take() {
            Some(handle) => Ok(handle.shutdown()?),
            None => Ok(()),
        }
    }
}
