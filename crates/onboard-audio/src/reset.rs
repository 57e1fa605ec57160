//! TAS3001C reset pulse and shadow reflush with bounded retry.
//!
//! A reset wipes the part, so every reset is followed by a full reflush of
//! the shadow into hardware:
//!
//! ```text
//! Idle ─► Resetting ─► Reflushing ─► Done
//!             ▲             │
//!             └── Failed ◄──┘   (bus error, attempts left)
//! ```
//!
//! Every reflush write is hardware-only. The shadow is the source of truth
//! and never changes during a reset, so a retried attempt sends exactly
//! what the failed one tried to.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use platform::{ControlLine, RegisterBus};

use crate::error::CodecError;
use crate::tas3001c::registers::{RegisterId, MAX_REGISTER_WIDTH, MCR_FAST_LOAD};
use crate::tas3001c::shadow::{ShadowStore, WriteMode};

/// Hold time before the pulse when the line state is not trusted.
pub const RESET_SETUP_TIME: Duration = Duration::from_millis(100);
/// Short settling time used between pulse edges.
pub const RESET_EDGE_TIME: Duration = Duration::from_millis(1);

/// Reset sequencer progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetState {
    /// No reset in progress.
    #[default]
    Idle,
    /// Pulsing the reset line.
    Resetting,
    /// Replaying the shadow into hardware.
    Reflushing,
    /// Last sequence completed.
    Done,
    /// Last attempt hit a bus error.
    Failed,
}

/// How long to hold the part negated before pulsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetSetup {
    /// Always use the full setup time.
    Force,
    /// Use the full setup time only if the line was never driven or was
    /// left asserted.
    IfNeeded,
}

// ── ResetGate ───────────────────────────────────────────────────────────────

/// Single-slot gate around the reset sequence.
///
/// A second request while the gate is held fails with
/// [`CodecError::Busy`]; requests are never queued.
#[derive(Debug, Default)]
pub struct ResetGate {
    held: AtomicBool,
}

impl ResetGate {
    /// An open gate.
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Take the gate, or `None` if somebody else holds it.
    pub fn try_acquire(&self) -> Option<ResetGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ResetGuard { gate: self })
    }

    /// `true` while a sequence holds the gate.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Releases the [`ResetGate`] on drop, on every exit path.
#[derive(Debug)]
pub struct ResetGuard<'a> {
    gate: &'a ResetGate,
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.gate.held.store(false, Ordering::Release);
    }
}

// ── Pulse ───────────────────────────────────────────────────────────────────

fn as_ms(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// Cycle the reset line: negate, assert, negate.
pub async fn reset_pulse<P, D>(
    line: &mut ControlLine<P>,
    delay: &mut D,
    setup: ResetSetup,
) -> Result<(), CodecError>
where
    P: OutputPin,
    D: DelayNs,
{
    let untrusted = line.asserted() != Some(false);
    if setup == ResetSetup::Force || untrusted {
        line.negate()?;
        delay.delay_ms(as_ms(RESET_SETUP_TIME)).await;
    } else {
        delay.delay_ms(as_ms(RESET_EDGE_TIME)).await;
    }

    line.assert()?;
    delay.delay_ms(as_ms(RESET_EDGE_TIME)).await;

    line.negate()?;
    delay.delay_ms(as_ms(RESET_EDGE_TIME)).await;
    Ok(())
}

// ── Sequencer ───────────────────────────────────────────────────────────────

/// Drives reset-and-reflush with retry.
#[derive(Debug)]
pub struct ResetSequencer {
    gate: ResetGate,
    state: ResetState,
    max_attempts: u8,
}

impl ResetSequencer {
    /// Sequencer giving up after `max_attempts` (at least one attempt is
    /// always made).
    pub const fn new(max_attempts: u8) -> Self {
        Self {
            gate: ResetGate::new(),
            state: ResetState::Idle,
            max_attempts,
        }
    }

    /// Current state.
    pub fn state(&self) -> ResetState {
        self.state
    }

    /// The gate guarding the sequence.
    pub fn gate(&self) -> &ResetGate {
        &self.gate
    }

    /// Reset the part and replay the shadow into it.
    ///
    /// Returns the number of attempts used.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Busy`] if a sequence is already running.
    /// - [`CodecError::Fatal`] once every attempt failed.
    pub async fn run<B, P, D>(
        &mut self,
        store: &mut ShadowStore<B>,
        line: &mut ControlLine<P>,
        delay: &mut D,
        setup: ResetSetup,
    ) -> Result<u8, CodecError>
    where
        B: RegisterBus,
        P: OutputPin,
        D: DelayNs,
    {
        let _guard = self.gate.try_acquire().ok_or(CodecError::Busy)?;

        let saved_mcr = store
            .read(RegisterId::MainControl)?
            .first()
            .copied()
            .unwrap_or(0);
        let max_attempts = self.max_attempts.max(1);
        let mut attempts: u8 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            self.state = ResetState::Resetting;
            let result = match reset_pulse(line, delay, setup).await {
                Ok(()) => {
                    self.state = ResetState::Reflushing;
                    reflush(store, saved_mcr).await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    self.state = ResetState::Done;
                    #[cfg(feature = "defmt")]
                    defmt::info!("TAS3001C reset complete after {} attempt(s)", attempts);
                    #[cfg(feature = "std")]
                    tracing::info!(attempts, "TAS3001C reset complete");
                    return Ok(attempts);
                }
                Err(e) => {
                    self.state = ResetState::Failed;
                    #[cfg(feature = "defmt")]
                    defmt::warn!("TAS3001C reset attempt {} failed: {}", attempts, e);
                    #[cfg(feature = "std")]
                    tracing::warn!(attempts, error = %e, "TAS3001C reset attempt failed");
                    let _ = e;
                    if attempts >= max_attempts {
                        #[cfg(feature = "defmt")]
                        defmt::error!("TAS3001C is not responding, giving up");
                        #[cfg(feature = "std")]
                        tracing::error!(attempts, "TAS3001C is not responding, giving up");
                        return Err(CodecError::Fatal { attempts });
                    }
                }
            }
        }
    }
}

/// Replay the shadow: biquads under fast load, the rest under normal load,
/// then the MCR as it was before the sequence.
async fn reflush<B: RegisterBus>(store: &mut ShadowStore<B>, saved_mcr: u8) -> Result<(), CodecError> {
    store
        .write(
            RegisterId::MainControl,
            &[saved_mcr | MCR_FAST_LOAD],
            WriteMode::HardwareOnly,
        )
        .await?;
    for id in RegisterId::ALL_BIQUADS {
        push_shadow(store, id).await?;
    }

    store
        .write(
            RegisterId::MainControl,
            &[saved_mcr & !MCR_FAST_LOAD],
            WriteMode::HardwareOnly,
        )
        .await?;
    for id in RegisterId::REFLUSH_NORMAL {
        push_shadow(store, id).await?;
    }

    store
        .write(RegisterId::MainControl, &[saved_mcr], WriteMode::HardwareOnly)
        .await?;
    Ok(())
}

async fn push_shadow<B: RegisterBus>(store: &mut ShadowStore<B>, id: RegisterId) -> Result<(), CodecError> {
    let mut buf = [0u8; MAX_REGISTER_WIDTH];
    let bytes = buf.get_mut(..id.width()).ok_or(CodecError::InvalidArgument)?;
    bytes.copy_from_slice(store.read(id)?);
    store.write(id, bytes, WriteMode::HardwareOnly).await?;
    Ok(())
}
