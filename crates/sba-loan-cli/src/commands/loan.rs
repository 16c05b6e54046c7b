use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use serde_json::Value;

use sba_loan_core::loan::amortization::summarize_by_year;
use sba_loan_core::loan::presets::LoanPurpose;
use sba_loan_core::loan::{estimate_as_of, LoanField, LoanResponse, RawLoanRequest};

use crate::input;

/// Answer to the form's "are you buying a business?" question
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Buying {
    Yes,
    No,
}

impl From<Buying> for LoanPurpose {
    fn from(b: Buying) -> Self {
        match b {
            Buying::Yes => LoanPurpose::Buyout,
            Buying::No => LoanPurpose::General,
        }
    }
}

/// Loan form fields. Values are passed through as typed, e.g. "$250,000".
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file with the form fields (flags override its values)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount requested, e.g. "$250,000"
    #[arg(long)]
    pub amount_seeking: Option<String>,

    /// Term length in years (5, 10 or 15)
    #[arg(long)]
    pub term_length: Option<String>,

    /// Down payment percentage (15-95)
    #[arg(long)]
    pub down_payment: Option<String>,

    /// SBA fee percentage (2.5 or 3)
    #[arg(long)]
    pub sba_fees: Option<String>,

    /// Annual interest rate percentage (6.75)
    #[arg(long)]
    pub annual_rate: Option<String>,

    /// Fill unset fields with the form defaults for this answer
    #[arg(long, value_enum)]
    pub buying: Option<Buying>,

    /// Date of the estimate (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

impl LoanArgs {
    fn flag_values(&self) -> [(LoanField, &Option<String>); 5] {
        [
            (LoanField::AmountSeeking, &self.amount_seeking),
            (LoanField::TermLength, &self.term_length),
            (LoanField::DownPayment, &self.down_payment),
            (LoanField::SbaFees, &self.sba_fees),
            (LoanField::AnnualRate, &self.annual_rate),
        ]
    }

    fn to_request(&self) -> Result<RawLoanRequest, Box<dyn std::error::Error>> {
        let any_flag = self.flag_values().iter().any(|(_, v)| v.is_some());

        let mut raw = if let Some(ref path) = self.input {
            input::read_file(path)?
        } else if !any_flag {
            input::read_stdin()?.unwrap_or_default()
        } else {
            RawLoanRequest::default()
        };

        for (field, value) in self.flag_values() {
            if let Some(v) = value {
                raw.set(field, v.as_str());
            }
        }

        if let Some(buying) = self.buying {
            LoanPurpose::from(buying).fill_missing(&mut raw);
        }
        Ok(raw)
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn run(args: &LoanArgs) -> Result<LoanResponse, Box<dyn std::error::Error>> {
    let raw = args.to_request()?;
    tracing::debug!(?raw, "loan request");
    Ok(estimate_as_of(&raw, args.as_of())?)
}

/// Arguments for the full estimate
#[derive(Args)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_estimate(args: EstimateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let response = run(&args.loan)?;
    Ok(serde_json::to_value(response)?)
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Collapse the schedule to one row per calendar year
    #[arg(long)]
    pub by_year: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let response = run(&args.loan)?;
    let data = match response {
        LoanResponse::Success { data } => data,
        errors @ LoanResponse::Error { .. } => return Ok(serde_json::to_value(errors)?),
    };

    if args.by_year {
        Ok(serde_json::to_value(summarize_by_year(&data.amortization_schedule))?)
    } else {
        Ok(serde_json::to_value(data.amortization_schedule)?)
    }
}
