//! Fast-load / normal-load transitions.
//!
//! Entering fast load corrupts the volume, tone and mixer registers inside
//! the part. Leaving it with [`Restore::RestoreOnNormal`] re-sends them from
//! the shadow, so callers bracket every biquad excursion as
//!
//! ```text
//! set_load_mode(Fast, DontRestore)
//! ... biquad writes ...
//! set_load_mode(Normal, RestoreOnNormal)
//! ```

use platform::RegisterBus;

use super::registers::{RegisterId, MCR_FAST_LOAD};
use super::shadow::{LoadMode, ShadowStore, WriteMode};
use crate::error::CodecError;

/// Whether to re-send the fast-load-corrupted registers on the way back to
/// normal load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Restore {
    /// Re-send VOL, MIX1, MIX2, TRE, BAS on a Fast → Normal transition.
    RestoreOnNormal,
    /// Change the MCR only.
    DontRestore,
}

impl<B: RegisterBus> ShadowStore<B> {
    /// Switch the part to `target` load mode.
    ///
    /// The MCR goes through the changed-only path, so asking for the mode the
    /// shadow already records costs no transaction (and restores nothing).
    pub async fn set_load_mode(
        &mut self,
        target: LoadMode,
        restore: Restore,
    ) -> Result<(), CodecError> {
        let previous = self.load_mode();
        let mcr = self.read(RegisterId::MainControl)?.first().copied().unwrap_or(0);
        let next = match target {
            LoadMode::Fast => mcr | MCR_FAST_LOAD,
            LoadMode::Normal => mcr & !MCR_FAST_LOAD,
        };
        self.write(
            RegisterId::MainControl,
            &[next],
            WriteMode::ShadowAndHardwareIfChanged,
        )
        .await?;

        if restore == Restore::RestoreOnNormal
            && previous == LoadMode::Fast
            && target == LoadMode::Normal
        {
            self.restore_fast_load_corrupted().await?;
        }
        Ok(())
    }

    /// Re-send the registers fast load scrambles, from the shadow.
    async fn restore_fast_load_corrupted(&mut self) -> Result<(), CodecError> {
        let mut buf = [0u8; super::registers::MAX_REGISTER_WIDTH];
        for id in RegisterId::FAST_LOAD_CORRUPTED {
            let width = id.width();
            let dst = buf.get_mut(..width).ok_or(CodecError::InvalidArgument)?;
            dst.copy_from_slice(self.read(id)?);
            self.write(id, dst, WriteMode::HardwareOnly).await?;
        }
        Ok(())
    }
}
