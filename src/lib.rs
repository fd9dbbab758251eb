//! Topic records from Horizon Europe work programme text.
//!
//! [`parse_document`] takes the text of a work programme (as produced by a
//! PDF text layer) and returns one [`Record`] per funding topic: identity,
//! budget figures, type of action, TRL, outcome and scope sections, and the
//! opening/deadline/destination metadata of the call the topic sits under.

pub mod db;
pub mod error;
pub mod input;
pub mod parser;
pub mod settings;

pub use parser::calls::CallSchedule;
pub use parser::record::{Provenance, Record, COLUMNS};
pub use parser::{call_schedule, parse_document};
