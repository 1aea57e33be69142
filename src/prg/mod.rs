//! Linearised PRG representation (component A).
//!
//! A PRG string is a sequence of `Marker`s: nucleotides encoded 1..4, `0` as
//! text terminator, and variant markers (odd = site, even = allele) from 5
//! upward. This module owns the marker vocabulary, the packed binary codec,
//! and the human-authorable text grammar from which the binary form is
//! derived.

pub mod marker;
pub mod string;
pub mod text;

pub use marker::{AlleleId, Marker, VariantLocus, VariantSitePath};
pub use string::{Endianness, PrgString};
