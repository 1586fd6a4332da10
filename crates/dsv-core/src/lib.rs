//! DSV Action Core
//!
//! Retrieve-spec parsing, the shared error type, the port traits that the
//! vault client and CI output sinks implement, and the output mapper that
//! drives them.

pub mod error;
pub mod mapper;
pub mod ports;
pub mod retrieve;

pub use error::{Error, Result};
pub use mapper::{MapSummary, map_outputs};
pub use ports::{MemorySink, OutputRecord, OutputSink, SecretDocument, SecretStore};
pub use retrieve::{FieldMapping, RetrieveSpec, SecretMapping, parse_retrieve_spec};
