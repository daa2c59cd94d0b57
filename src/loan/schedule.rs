//! Amortization schedule output structures

use serde::{Deserialize, Serialize};

/// A single period of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Period index; 0 is the state before the first payment
    pub period: u32,
    pub payment: f64,
    /// Principal portion of the payment
    pub principal: f64,
    /// Interest portion of the payment
    pub interest: f64,
    /// Remaining balance after the payment (never negative)
    pub balance: f64,
}

impl AmortizationRow {
    /// Row 0: nothing paid yet, full balance outstanding
    pub fn opening(balance: f64) -> Self {
        Self {
            period: 0,
            payment: 0.0,
            principal: 0.0,
            interest: 0.0,
            balance,
        }
    }
}

/// Complete schedule, including the period-0 row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmortizationSchedule {
    rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    pub fn with_capacity(num_periods: u32) -> Self {
        Self {
            rows: Vec::with_capacity(num_periods as usize + 1),
        }
    }

    pub fn add_row(&mut self, row: AmortizationRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[AmortizationRow] {
        &self.rows
    }

    /// Rows 1..N, skipping the opening row
    pub fn payments(&self) -> impl Iterator<Item = &AmortizationRow> {
        self.rows.iter().filter(|r| r.period > 0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_periods(&self) -> u32 {
        self.rows.len().saturating_sub(1) as u32
    }

    pub fn total_paid(&self) -> f64 {
        self.payments().map(|r| r.payment).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.payments().map(|r| r.interest).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.payments().map(|r| r.principal).sum()
    }

    pub fn first_payment(&self) -> f64 {
        self.payments().next().map(|r| r.payment).unwrap_or(0.0)
    }

    pub fn last_payment(&self) -> f64 {
        self.rows.last().filter(|r| r.period > 0).map(|r| r.payment).unwrap_or(0.0)
    }

    /// Balance remaining after `period` payments
    pub fn balance_at(&self, period: u32) -> Option<f64> {
        self.rows.get(period as usize).map(|r| r.balance)
    }

    pub fn final_balance(&self) -> f64 {
        self.rows.last().map(|r| r.balance).unwrap_or(0.0)
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            num_periods: self.num_periods(),
            first_payment: self.first_payment(),
            last_payment: self.last_payment(),
            total_paid: self.total_paid(),
            total_interest: self.total_interest(),
            total_principal: self.total_principal(),
        }
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a AmortizationRow;
    type IntoIter = std::slice::Iter<'a, AmortizationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub num_periods: u32,
    pub first_payment: f64,
    pub last_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub total_principal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_period_schedule() -> AmortizationSchedule {
        let mut schedule = AmortizationSchedule::with_capacity(2);
        schedule.add_row(AmortizationRow::opening(1000.0));
        schedule.add_row(AmortizationRow { period: 1, payment: 510.0, principal: 500.0, interest: 10.0, balance: 500.0 });
        schedule.add_row(AmortizationRow { period: 2, payment: 505.0, principal: 500.0, interest: 5.0, balance: 0.0 });
        schedule
    }

    #[test]
    fn test_summary_skips_opening_row() {
        let schedule = two_period_schedule();
        let summary = schedule.summary();

        assert_eq!(schedule.len(), 3);
        assert_eq!(summary.num_periods, 2);
        assert_eq!(summary.first_payment, 510.0);
        assert_eq!(summary.last_payment, 505.0);
        assert_eq!(summary.total_paid, 1015.0);
        assert_eq!(summary.total_interest, 15.0);
        assert_eq!(summary.total_principal, 1000.0);
    }

    #[test]
    fn test_balance_lookup() {
        let schedule = two_period_schedule();
        assert_eq!(schedule.balance_at(0), Some(1000.0));
        assert_eq!(schedule.balance_at(1), Some(500.0));
        assert_eq!(schedule.balance_at(3), None);
        assert_eq!(schedule.final_balance(), 0.0);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let json = serde_json::to_value(two_period_schedule()).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 3);
    }
}
