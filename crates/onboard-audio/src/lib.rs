//! Onboard audio codec drivers
//!
//! Drivers for two generations of onboard codec:
//!
//! - **TAS3001C** ("Texas"): a write-only digital EQ/volume part on I²C with
//!   amplifier mute lines and interrupt-driven headphone and external
//!   speaker ("Dallas") jacks. See [`tas3001c`].
//! - **AWACS / Screamer**: a memory-mapped codec with 12-bit control words
//!   and polled jack sensing. See [`screamer`].
//!
//! # Architecture
//!
//! ```text
//! Audio framework ──AudioHost──┐
//!                              ▼
//! JACK_EVENTS ──▶ task ──▶ Codec (routing, EQ presets, volume, power)
//!                              │
//!                       CodecBackend
//!                     ┌────────┴────────┐
//!                 Tas3001c           Screamer
//!              RegisterBus + GPIO    AwacsPort
//! ```
//!
//! # Features
//!
//! - `std`: `tracing` logs and the [`mocks`] module (host builds and tests)
//! - `defmt`: `defmt` logs and `defmt::Format` derives
//! - `hardware`: embedded target build, implies `defmt`

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this driver crate:
#![allow(clippy::doc_markdown)] // register names and chip part numbers in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod backend;
pub mod codec;
pub mod config;
pub mod drc;
pub mod eq;
pub mod error;
pub mod host;
pub mod jack;
pub mod mocks;
pub mod reset;
pub mod screamer;
pub mod task;
pub mod tas3001c;
pub mod timer;
pub mod volume;

pub use backend::{Capabilities, CodecBackend, CodecKind, InputSource, OutputTarget, PowerState};
pub use codec::Codec;
pub use config::{CodecConfig, TasConfig};
pub use drc::{DrcInfo, VolumeRange};
pub use eq::{Biquad, EqPreset, FourDotTwenty};
pub use error::CodecError;
pub use host::AudioHost;
pub use jack::{JackEvent, JackId, JackState, RoutingDecision};
pub use reset::{ResetSetup, ResetState};
pub use screamer::Screamer;
pub use task::{run_jack_events, try_post_jack_event, JACK_EVENTS};
pub use tas3001c::{Tas3001c, TasPins};
pub use volume::VolumeState;
