use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{round_cents, Money, Rate};

/// Calendar month in which a payment falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentPeriod {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl PaymentPeriod {
    /// The period `offset` months after this one.
    pub fn advance(self, offset: u32) -> PaymentPeriod {
        let absolute = self.month + offset;
        PaymentPeriod {
            year: self.year + ((absolute - 1) / 12) as i32,
            month: (absolute - 1) % 12 + 1,
        }
    }
}

/// First payment falls in the month after `as_of`.
pub fn first_payment_period(as_of: NaiveDate) -> PaymentPeriod {
    PaymentPeriod {
        year: as_of.year(),
        month: as_of.month(),
    }
    .advance(1)
}

/// One monthly payment. All amounts are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub year: i32,
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub beginning_balance: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub principal: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub ending_balance: Money,
}

/// Month-by-month split of a level payment into interest and principal.
///
/// The running balance is carried at full precision; each stored row is
/// rounded independently. An ending balance that drifts below zero is
/// clamped to zero.
pub fn build_schedule(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
    number_of_payments: u32,
    start: PaymentPeriod,
) -> Vec<AmortizationRow> {
    let mut schedule = Vec::with_capacity(number_of_payments as usize);
    let mut beginning_balance = principal;

    for payment_index in 0..number_of_payments {
        let interest = beginning_balance * monthly_rate;
        let principal_portion = payment - interest;
        let mut ending_balance = beginning_balance - principal_portion;

        if ending_balance < Decimal::ZERO {
            ending_balance = Decimal::ZERO;
        }

        let period = start.advance(payment_index);
        schedule.push(AmortizationRow {
            year: period.year,
            month: period.month,
            beginning_balance: round_cents(beginning_balance),
            interest: round_cents(interest),
            principal: round_cents(principal_portion),
            ending_balance: round_cents(ending_balance),
        });

        beginning_balance = ending_balance;
    }

    tracing::debug!(
        rows = schedule.len(),
        start_year = start.year,
        start_month = start.month,
        "built amortization schedule"
    );
    schedule
}

/// Totals for the payments falling in one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    pub payments: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub beginning_balance: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub principal: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub ending_balance: Money,
}

/// Group consecutive rows by calendar year.
pub fn summarize_by_year(schedule: &[AmortizationRow]) -> Vec<YearSummary> {
    let mut summaries: Vec<YearSummary> = Vec::new();

    for row in schedule {
        match summaries.last_mut() {
            Some(current) if current.year == row.year => {
                current.payments += 1;
                current.interest += row.interest;
                current.principal += row.principal;
                current.ending_balance = row.ending_balance;
            }
            _ => summaries.push(YearSummary {
                year: row.year,
                payments: 1,
                beginning_balance: row.beginning_balance,
                interest: row.interest,
                principal: row.principal,
                ending_balance: row.ending_balance,
            }),
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::monthly_payment;
    use rust_decimal_macros::dec;

    fn period(year: i32, month: u32) -> PaymentPeriod {
        PaymentPeriod { year, month }
    }

    #[test]
    fn test_period_rollover() {
        let start = period(2026, 11);
        assert_eq!(start.advance(0), period(2026, 11));
        assert_eq!(start.advance(1), period(2026, 12));
        assert_eq!(start.advance(2), period(2027, 1));
        assert_eq!(start.advance(14), period(2028, 1));
        assert_eq!(period(2026, 1).advance(179), period(2040, 12));
    }

    #[test]
    fn test_first_payment_period() {
        let oct = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(first_payment_period(oct), period(2026, 11));
        let dec_31 = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(first_payment_period(dec_31), period(2027, 1));
    }

    #[test]
    fn test_schedule_pays_off() {
        let rate = dec!(0.005625);
        let pmt = monthly_payment(dec!(212500), rate, 120).unwrap();
        let schedule = build_schedule(dec!(212500), rate, pmt, 120, period(2026, 11));

        assert_eq!(schedule.len(), 120);
        assert_eq!(schedule[0].beginning_balance, dec!(212500));
        assert_eq!(schedule[0].interest, dec!(1195.31));
        assert_eq!(schedule.last().unwrap().ending_balance, Decimal::ZERO);

        for pair in schedule.windows(2) {
            assert_eq!(pair[0].ending_balance, pair[1].beginning_balance);
        }
        for row in &schedule {
            let diff = (row.beginning_balance - row.principal - row.ending_balance).abs();
            assert!(diff <= dec!(0.01), "row {}/{}: diff {diff}", row.month, row.year);
            assert!(row.ending_balance >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_overpayment_clamps_to_zero() {
        let schedule = build_schedule(dec!(100), dec!(0.01), dec!(500), 2, period(2026, 1));
        assert_eq!(schedule[0].ending_balance, Decimal::ZERO);
        assert_eq!(schedule[1].beginning_balance, Decimal::ZERO);
        assert_eq!(schedule[1].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_schedule() {
        let schedule = build_schedule(dec!(1200), Decimal::ZERO, dec!(100), 12, period(2026, 1));
        assert!(schedule.iter().all(|r| r.interest.is_zero() && r.principal == dec!(100)));
        assert_eq!(schedule[11].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_summarize_by_year() {
        let rate = dec!(0.005625);
        let pmt = monthly_payment(dec!(100000), rate, 60).unwrap();
        let schedule = build_schedule(dec!(100000), rate, pmt, 60, period(2026, 11));
        let years = summarize_by_year(&schedule);

        // Nov 2026 .. Oct 2031
        assert_eq!(years.len(), 6);
        assert_eq!(years[0].year, 2026);
        assert_eq!(years[0].payments, 2);
        assert_eq!(years[5].payments, 10);
        assert_eq!(years.iter().map(|y| y.payments).sum::<u32>(), 60);
        assert_eq!(years[0].beginning_balance, dec!(100000));
        assert_eq!(years[5].ending_balance, Decimal::ZERO);
        assert_eq!(years[1].beginning_balance, years[0].ending_balance);
    }
}
