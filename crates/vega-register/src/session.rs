//! # Scan Session Controller
//!
//! Lifecycle of an active scanning session and ownership of the capture
//! device.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Scan Session Lifecycle                              │
//! │                                                                         │
//! │            start()                 on_detected(code)                    │
//! │   ┌──────┐ ──────► ┌────────┐ ─────────────────────► ┌──────────┐      │
//! │   │ Idle │         │ Active │                        │ Detected │      │
//! │   └──────┘ ◄────── └────────┘                        └──────────┘      │
//! │      ▲      stop()      │                                  │           │
//! │      │                  │ start() while Active:            │           │
//! │      │                  └── no-op (single camera)          │           │
//! │      └─────────────────────────────────────────────────────┘           │
//! │                     start() / stop() (Detected is a resting state)     │
//! │                                                                         │
//! │   Capture device:  acquired on entry to Active,                        │
//! │                    released on EVERY exit path (stop, detection,       │
//! │                    drop) via an RAII guard                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Detection Handling
//! Detections are accepted only while Active, and the first one flips
//! the session out of Active - so exactly one decoded code is surfaced
//! per session no matter how many callback events the backend fires.
//! Re-arming via repeated `start()` calls cannot stack handlers: start
//! while Active is a no-op.
//!
//! ## Cancellation
//! Each `stop()` bumps the session epoch. A [`ScanTicket`] captured at
//! detection time is checked against the current epoch before a lookup
//! result is applied: results belonging to a torn-down session are
//! discarded, never applied to a now-different cart state.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use vega_core::validation::validate_barcode;

// =============================================================================
// Errors
// =============================================================================

/// Scan session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The capture device is already held by another session.
    #[error("Capture device is busy")]
    DeviceBusy,

    /// The capture backend failed to start.
    #[error("Capture device failed: {0}")]
    CaptureFailed(String),
}

// =============================================================================
// Capture Backend
// =============================================================================

/// The opaque scan capture backend (camera + decoder).
///
/// Implementations own the physical device. The engine never sees
/// frames or decoding - only the decoded symbol strings the embedding
/// layer feeds into [`ScanSession::on_detected`].
pub trait CaptureBackend: Send + Sync {
    /// Exclusively acquires the capture device.
    ///
    /// Must fail with [`SessionError::DeviceBusy`] if the device is
    /// already held - it is the one exclusively-owned shared resource.
    fn acquire(&self) -> Result<(), SessionError>;

    /// Releases the capture device. Called exactly once per successful
    /// `acquire`, on every exit path from Active.
    fn release(&self);
}

/// RAII guard pairing one `acquire` with exactly one `release`.
///
/// Holding the release in `Drop` makes teardown exception-safe: however
/// the session leaves Active (stop, detection, panic unwind, drop), the
/// device comes back.
struct CaptureGuard {
    backend: Arc<dyn CaptureBackend>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.backend.release();
    }
}

// =============================================================================
// Session State
// =============================================================================

/// Scan session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session running; device released.
    Idle,
    /// Capture running, waiting for a detection.
    Active,
    /// Last session ended by a detection; device released. A resting
    /// state equivalent to Idle for `start`/`stop` purposes.
    Detected,
}

/// Epoch token tying a detection to the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket {
    epoch: u64,
}

/// A decoded symbol surfaced by the session, plus its validity ticket.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The validated barcode string.
    pub code: String,
    /// Ticket to check before applying the lookup result.
    pub ticket: ScanTicket,
}

// =============================================================================
// Scan Session
// =============================================================================

/// Controller for one logical scanning surface.
///
/// Owns the capture device while Active. At most one session can hold
/// the device at a time; the backend enforces exclusivity.
pub struct ScanSession {
    backend: Arc<dyn CaptureBackend>,
    state: SessionState,
    epoch: u64,
    guard: Option<CaptureGuard>,
}

impl ScanSession {
    /// Creates an idle session over the given capture backend.
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        ScanSession {
            backend,
            state: SessionState::Idle,
            epoch: 0,
            guard: None,
        }
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Checks whether the session is actively capturing.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Starts capturing.
    ///
    /// Starting while already Active is a no-op, not an error: there is
    /// one camera, and a second `start` must not re-arm detection.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Active {
            debug!("Scan session already active, start is a no-op");
            return Ok(());
        }

        self.backend.acquire()?;
        self.guard = Some(CaptureGuard {
            backend: Arc::clone(&self.backend),
        });
        self.state = SessionState::Active;
        info!(epoch = self.epoch, "Scan session active");
        Ok(())
    }

    /// Stops capturing and cancels in-flight lookups.
    ///
    /// Releases the device if held and bumps the epoch so tickets from
    /// this session stop validating. Safe to call in any state.
    pub fn stop(&mut self) {
        if self.guard.take().is_some() {
            debug!(epoch = self.epoch, "Scan session stopped");
        }
        self.epoch += 1;
        self.state = SessionState::Idle;
    }

    /// Feeds a decoded symbol event into the session.
    ///
    /// Accepted only while Active; the capture device is released
    /// BEFORE the code is surfaced, so a trailing burst of callback
    /// events from the decoder cannot double-detect. Events arriving in
    /// any other state are discarded.
    ///
    /// Returns the validated detection, or `None` if the event was
    /// discarded (wrong state or undecodable symbol).
    pub fn on_detected(&mut self, code: &str) -> Option<Detection> {
        if self.state != SessionState::Active {
            debug!(state = ?self.state, "Discarding detection outside active session");
            return None;
        }

        // Release the device first - detection ends the session.
        self.guard = None;
        self.state = SessionState::Detected;

        match validate_barcode(code) {
            Ok(code) => {
                info!(code = %code, epoch = self.epoch, "Barcode detected");
                Some(Detection {
                    code,
                    ticket: ScanTicket { epoch: self.epoch },
                })
            }
            Err(e) => {
                warn!(error = %e, "Discarding undecodable symbol");
                None
            }
        }
    }

    /// Checks whether a ticket still belongs to the current epoch.
    ///
    /// False means the session was stopped (or torn down and restarted)
    /// after the detection: the lookup result must be discarded.
    pub fn is_current(&self, ticket: ScanTicket) -> bool {
        ticket.epoch == self.epoch
    }
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("holding_device", &self.guard.is_some())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
