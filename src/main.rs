//! Financing Calculator CLI
//!
//! Command-line interface for financing simulations, scenario helpers and insurance quotes

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use financing_calculator::assumptions::{Assumptions, CalculatorKind, VehicleCategory};
use financing_calculator::insurance::InsuranceQuote;
use financing_calculator::loan::{AmortizationSchedule, AmortizationSystem};
use financing_calculator::scenario::{
    best_down_payment_scenario, compare_refinancing, down_payment_scenarios, max_affordable_vehicle_price,
    payoff_analysis, AffordabilityInput, RefinanceInput, DEFAULT_MAX_INCOME_SHARE,
};
use financing_calculator::service::{
    handle_comparison, handle_effective_rate, handle_financing, handle_insurance, EffectiveRateRequest,
    FinancingRequest,
};

#[derive(Parser)]
#[command(name = "calc")]
#[command(author, version, about = "Consumer financing and auto insurance calculator", long_about = None)]
struct Cli {
    /// Directory holding calculator_bounds.csv, category_adjustments.csv and region_brackets.csv
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a financing and print its schedule
    Financing(FinancingArgs),

    /// Compare Price and SAC for the same loan
    Compare(LoanArgs),

    /// Cost of settling a Price loan early
    Payoff {
        #[arg(long)]
        principal: f64,
        /// Periodic rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        periods: u32,
        /// Installments already paid
        #[arg(long)]
        elapsed: u32,
    },

    /// Solve the effective rate (CET) of a level installment stream
    EffectiveRate {
        /// Amount actually received by the borrower
        #[arg(long)]
        net: f64,
        #[arg(long)]
        installment: f64,
        #[arg(long)]
        periods: u32,
    },

    /// Most expensive vehicle a monthly income can finance
    Afford {
        #[arg(long)]
        income: f64,
        /// Maximum installment as a share of income
        #[arg(long, default_value_t = DEFAULT_MAX_INCOME_SHARE)]
        share: f64,
        #[arg(long, default_value_t = 0.0)]
        down_payment: f64,
        /// Periodic rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        periods: u32,
        #[arg(long)]
        tax: bool,
        #[arg(long, default_value = "fixed-installment")]
        system: AmortizationSystem,
    },

    /// Evaluate down payment and term combinations for a vehicle price
    DownPayment {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        income: f64,
        /// Periodic rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long, value_delimiter = ',', default_value = "24,36,48,60")]
        terms: Vec<u32>,
        #[arg(long, value_delimiter = ',', default_value = "0.1,0.2,0.3,0.4")]
        shares: Vec<f64>,
        #[arg(long)]
        tax: bool,
    },

    /// Compare keeping a loan against refinancing its balance
    Refinance {
        #[arg(long)]
        principal: f64,
        /// Current periodic rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        periods: u32,
        #[arg(long)]
        elapsed: u32,
        /// Offered periodic rate in percent
        #[arg(long)]
        new_rate: f64,
        #[arg(long)]
        new_periods: u32,
        #[arg(long, default_value_t = 0.0)]
        fees: f64,
        #[arg(long)]
        tax: bool,
    },

    /// Price an auto insurance quote read from a JSON file
    Insurance {
        /// JSON quote (camelCase fields, referenceYear defaults to the current year)
        quote: PathBuf,
    },
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long)]
    principal: f64,
    /// Periodic rate in percent
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    periods: u32,
    /// Finance the transaction tax with the principal
    #[arg(long)]
    tax: bool,
    #[arg(long)]
    calculator: Option<CalculatorKind>,
    #[arg(long)]
    category: Option<VehicleCategory>,
}

impl LoanArgs {
    fn to_request(&self, system: AmortizationSystem) -> FinancingRequest {
        FinancingRequest {
            principal: self.principal,
            periodic_rate_percent: self.rate,
            num_periods: self.periods,
            include_tax: self.tax,
            system,
            calculator: self.calculator,
            category: self.category,
        }
    }
}

#[derive(Args)]
struct FinancingArgs {
    #[command(flatten)]
    loan: LoanArgs,

    #[arg(long, default_value = "fixed-installment")]
    system: AmortizationSystem,

    /// Write the full schedule to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn load_assumptions(path: Option<&Path>) -> Result<Assumptions> {
    match path {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("Failed to load assumptions from {}", dir.display())),
        None => Ok(Assumptions::default_pricing()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_schedule(schedule: &AmortizationSchedule, max_rows: usize) {
    println!("{:>6} {:>14} {:>14} {:>14} {:>16}", "Period", "Payment", "Principal", "Interest", "Balance");
    println!("{}", "-".repeat(68));

    for row in schedule.rows().iter().take(max_rows + 1) {
        println!(
            "{:>6} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
            row.period, row.payment, row.principal, row.interest, row.balance
        );
    }

    if schedule.len() > max_rows + 1 {
        println!("... ({} more periods)", schedule.len() - max_rows - 1);
    }
}

fn write_schedule_csv(schedule: &AmortizationSchedule, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for row in schedule {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let assumptions = load_assumptions(cli.assumptions.as_deref())?;

    match cli.command {
        Commands::Financing(args) => {
            let response = handle_financing(&args.loan.to_request(args.system), &assumptions)?;

            if let Some(path) = &args.csv {
                write_schedule_csv(&response.schedule, path)?;
            }

            if cli.json {
                return print_json(&response);
            }

            println!("System:         {}", response.system.as_str());
            println!("Applied rate:   {:.4}% per period", response.applied_rate_percent);
            println!("Installment:    {:.2}", response.installment);
            println!("Total paid:     {:.2}", response.total_paid);
            println!("Total interest: {:.2}", response.total_interest);
            if let Some(tax) = response.tax_amount {
                println!("Financed tax:   {:.2}", tax);
            }
            if let Some(cet) = response.effective_rate_percent {
                println!("Effective rate: {:.4}% per period", cet);
            }
            println!();
            print_schedule(&response.schedule, 24);

            if let Some(path) = &args.csv {
                println!("\nFull schedule written to: {}", path.display());
            }
        }

        Commands::Compare(args) => {
            let response = handle_comparison(&args.to_request(AmortizationSystem::FixedInstallment), &assumptions)?;
            if cli.json {
                return print_json(&response);
            }

            println!("{:<24} {:>14} {:>14}", "", "Price", "SAC");
            println!("{:<24} {:>14.2} {:>14.2}", "First payment", response.fixed.installment, response.constant.installment);
            println!(
                "{:<24} {:>14.2} {:>14.2}",
                "Last payment",
                response.fixed.schedule.last_payment(),
                response.constant.schedule.last_payment()
            );
            println!("{:<24} {:>14.2} {:>14.2}", "Total paid", response.fixed.total_paid, response.constant.total_paid);
            println!(
                "{:<24} {:>14.2} {:>14.2}",
                "Total interest", response.fixed.total_interest, response.constant.total_interest
            );
            println!("\nSAC saves {:.2} in interest", response.interest_saved);
            println!("SAC first payment is {:.2} higher", response.first_payment_gap);
        }

        Commands::Payoff { principal, rate, periods, elapsed } => {
            let analysis = payoff_analysis(principal, rate / 100.0, periods, elapsed)?;
            if cli.json {
                return print_json(&analysis);
            }

            println!("Installment:          {:.2}", analysis.installment);
            println!("Remaining periods:    {}", analysis.remaining_periods);
            println!("Payoff amount:        {:.2}", analysis.outstanding_balance);
            println!("Remaining at face:    {:.2}", analysis.nominal_remaining);
            println!("Savings from payoff:  {:.2}", analysis.savings);
        }

        Commands::EffectiveRate { net, installment, periods } => {
            let result = handle_effective_rate(&EffectiveRateRequest {
                net_disbursed: net,
                installment,
                num_periods: periods,
            })?;
            if cli.json {
                return print_json(&result);
            }

            println!("Effective rate: {:.4}% per period", result.rate_percent);
            println!("Annualized:     {:.4}%", result.annual_rate_percent);
            println!("Iterations:     {}", result.iterations);
        }

        Commands::Afford { income, share, down_payment, rate, periods, tax, system } => {
            let result = max_affordable_vehicle_price(&AffordabilityInput {
                monthly_income: income,
                max_income_share: share,
                down_payment,
                periodic_rate: rate / 100.0,
                num_periods: periods,
                include_tax: tax,
                system,
            })?;
            if cli.json {
                return print_json(&result);
            }

            println!("Installment cap:    {:.2}", result.installment_cap);
            println!("Max vehicle price:  {:.2}", result.max_vehicle_price);
            println!("Financed principal: {:.2}", result.financed_principal);
            println!("Installment:        {:.2} ({:.1}% of income)", result.installment, result.income_share * 100.0);
        }

        Commands::DownPayment { price, income, rate, terms, shares, tax } => {
            let scenarios = down_payment_scenarios(price, income, rate / 100.0, &terms, &shares, tax)?;
            if cli.json {
                return print_json(&scenarios);
            }

            println!(
                "{:>8} {:>12} {:>6} {:>12} {:>14} {:>10}",
                "Down %", "Down", "Term", "Installment", "Total cost", "Income %"
            );
            println!("{}", "-".repeat(68));
            for s in &scenarios {
                println!(
                    "{:>7.0}% {:>12.2} {:>6} {:>12.2} {:>14.2} {:>9.1}%",
                    s.down_payment_share * 100.0,
                    s.down_payment,
                    s.num_periods,
                    s.installment,
                    s.total_cost,
                    s.income_share * 100.0
                );
            }
            if let Some(best) = best_down_payment_scenario(&scenarios) {
                println!(
                    "\nLightest on income: {:.0}% down over {} periods",
                    best.down_payment_share * 100.0,
                    best.num_periods
                );
            }
        }

        Commands::Refinance { principal, rate, periods, elapsed, new_rate, new_periods, fees, tax } => {
            let comparison = compare_refinancing(&RefinanceInput {
                original_principal: principal,
                original_rate: rate / 100.0,
                original_periods: periods,
                elapsed_periods: elapsed,
                new_rate: new_rate / 100.0,
                new_periods,
                fees,
                include_tax: tax,
            })?;
            if cli.json {
                return print_json(&comparison);
            }

            println!("Outstanding balance:   {:.2}", comparison.outstanding_balance);
            println!("Current installment:   {:.2}", comparison.current_installment);
            println!("New installment:       {:.2}", comparison.new_installment);
            println!("Cost if kept:          {:.2}", comparison.current_remaining_cost);
            println!("Cost if refinanced:    {:.2}", comparison.new_total_cost);
            println!("New effective rate:    {:.4}% per period", comparison.new_effective_rate.rate_percent);
            println!(
                "Refinancing {} ({:+.2})",
                if comparison.worthwhile { "pays off" } else { "does not pay off" },
                comparison.savings
            );
        }

        Commands::Insurance { quote } => {
            let file = std::fs::File::open(&quote)
                .with_context(|| format!("Unable to open {}", quote.display()))?;
            let quote: InsuranceQuote = serde_json::from_reader(file)?;
            let result = handle_insurance(&quote, &assumptions)?;
            if cli.json {
                return print_json(&result);
            }

            println!("Base premium:      {:.2}", result.base_premium);
            println!("Annual premium:    {:.2}", result.annual_premium);
            println!("Monthly premium:   {:.2}", result.monthly_premium);
            println!("Deductible:        {:.2}", result.deductible_value);
            println!("Risk multiplier:   {:.4}", result.factors.combined());
        }
    }

    Ok(())
}
