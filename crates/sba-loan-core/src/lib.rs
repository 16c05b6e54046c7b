pub mod error;
pub mod format;
pub mod loan;
pub mod time_value;
pub mod types;

pub use error::LoanError;
pub use types::*;

/// Standard result type for all sba-loan operations
pub type SbaLoanResult<T> = Result<T, LoanError>;
