pub mod binary;
pub mod config;
pub mod error;
pub mod format;
pub mod gadgets;
pub mod header;
pub mod reader;
pub mod sections;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_support;

pub use binary::*;
pub use config::{ScanConfig, DEFAULT_CONTEXT_BYTES};
pub use error::{Error, Result};
pub use format::{detect_format, Format};
pub use gadgets::{scan_returns, GadgetMatch, GadgetScan, RET_OPCODE};
pub use header::{inspect, Architecture, Bitness, Classification, Endianness};
pub use sections::{find_code_section, SectionDescriptor, CODE_SECTION_NAME};
