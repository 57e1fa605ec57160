//! Hardware Abstraction Layer (HAL) for the onboard audio codec drivers
//!
//! This crate provides the narrow hardware seams the codec drivers are
//! written against, so that every driver state machine can be exercised on
//! the host without the physical chips.
//!
//! # Architecture Layers
//!
//! ```text
//! Audio framework (volume controls, power management, user notices)
//!         ↓
//! Codec drivers (onboard-audio crate)
//!         ↓
//! Platform HAL (this crate - bus, port and GPIO seams)
//!         ↓
//! embedded-hal 1.0 implementations (I2C controller, GPIO, delay)
//! ```
//!
//! # Seams
//!
//! - [`RegisterBus`] - sub-addressed register writes on a serial control bus
//! - [`AwacsPort`] - memory-mapped codec-control and status port
//! - [`ControlLine`] / [`SenseLine`] - GPIO lines with configurable polarity
//! - [`audio_types`] - validated newtypes shared by every driver
//!
//! # Features
//!
//! - `std`: Enable the [`mocks`] module for host test suites
//! - `hardware`: Physical hardware build marker
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{I2cAddr, RegisterBus};
//!
//! async fn push_volume<B: RegisterBus>(bus: &mut B) {
//!     let addr = I2cAddr::TAS3001C;
//!     let _ = bus.transact(addr, 0x04, &[0, 0, 0, 0, 0, 0]).await;
//! }
//! ```

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
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod audio_types;
pub mod bus;
pub mod gpio;
pub mod mocks;

pub use audio_types::{I2cAddr, LayoutId, OutOfRangeError, SpeakerId};
pub use bus::{AwacsPort, BusError, I2cRegisterBus, RegisterBus, MAX_FRAME_LEN};
pub use gpio::{ActiveLevel, ControlLine, GpioError, SenseLine};
