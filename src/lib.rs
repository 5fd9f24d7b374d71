//! A streaming decoder for the JAZELLE container format used by the SLD
//! experiment's MiniDST pipeline: nested physical/logical record framing,
//! VAX F_FLOAT numeric decoding, and a fixed catalog of typed banks
//! (particles, tracks, clusters, PID hypotheses), assembled into a sequence
//! of [`EventRecord`] values.
//!
//! The entry point is [`EventAssembler`]: construct one from any [`Read`]er
//! positioned at the start of a JAZELLE file, then iterate it for
//! `Result<EventRecord, RecordError>` values, one per event. Iteration ends
//! cleanly at a physical record boundary; any other I/O or framing failure
//! surfaces as an error carrying the logical record number it was found at.
//!
//! ```no_run
//! use std::fs::File;
//! use jazelle::EventAssembler;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("run1065.dst")?;
//! let assembler = EventAssembler::new(file)?;
//! for event in assembler {
//!     let event = event?;
//!     println!("run {} event {}: {} tracks", event.run, event.event, event.tracks.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Read`]: std::io::Read

mod assembler;
mod banks;
mod binary_parsing;
mod buffer;
mod error;
mod event;
mod logical;
mod physical;
mod reader;
mod vax;

pub use assembler::EventAssembler;
pub use banks::{
    Cridhyp, PhchrgRecord, PhcridRecord, PhkelidRecord, PhklusRecord, PhktrkRecord, Phmtoc,
    PhpsumRecord, PhwicRecord,
};
pub use error::{JazelleError, RecordError};
pub use event::{EventHeader, EventRecord, FileHeader};
pub use vax::{ticks_to_timestamp, vax_f32_to_ieee, vax_f32_to_ieee_bulk};
