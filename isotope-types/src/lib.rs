//! Value types shared by the service graph model.
//!
//! These are the literals that appear inside a service graph document:
//!
//!  - [`ByteSize`](size::ByteSize) is a payload size such as `10KB`
//!  - [`Percentage`](pct::Percentage) is a bounded rate such as `0.5%`
//!  - [`ServiceType`](svctype::ServiceType) is the protocol a mock service speaks
//!
//! All of them serialize to their human-readable text form and reject malformed input on parse.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod pct;
pub mod size;
pub mod svctype;

pub use pct::Percentage;
pub use size::ByteSize;
pub use svctype::ServiceType;
