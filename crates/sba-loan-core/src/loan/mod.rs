pub mod amortization;
pub mod calculator;
pub mod field;
pub mod presets;
pub mod response;
pub mod validation;

pub use field::LoanField;
pub use response::{estimate, estimate_as_of, LoanResponse};
pub use validation::{validate, RawLoanRequest, ValidationErrors};
