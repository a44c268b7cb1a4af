//! One parser per supported export format, plus the generic fallback.

pub mod absa;
pub mod fnb;
pub mod generic;
pub mod standard_bank;

pub use absa::AbsaParser;
pub use fnb::FnbParser;
pub use generic::GenericParser;
pub use standard_bank::StandardBankParser;
