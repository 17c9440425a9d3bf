//! Internal helpers for markup extraction, CSV files and concurrent fan-out.

pub(crate) mod csv_io;
pub(crate) mod fanout;
pub(crate) mod html;
