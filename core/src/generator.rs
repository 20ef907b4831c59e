//! Synthetic compliance dataset: the fixed audit universe.
//!
//! BUILD ORDER (fixed, documented, never reordered; transaction ids depend on it):
//!   1. 50 farmers
//!   2. 40 PM-KISAN claims, then 10 explicit duplicates of the first 10
//!   3. 40 PMFBY insurance claims
//!   4. 55 fertilizer purchases
//!   5. 55 crop sales
//!   6. Violation injection: exactly 60 transactions, non-overlapping
//!   7. Count check: any drift is a fatal DatasetInvariant error
//!
//! RULES:
//!   - Every random value comes from `RngBank::unit(index)` with a fixed index.
//!   - Injection only mutates the batches built above; it never adds rows.

use crate::{
    dataset::Dataset,
    error::{ComplianceError, ComplianceResult},
    model::{
        Crop, CropSaleDetails, District, Farmer, FertilizerDetails, FertilizerUsage,
        InsuranceDetails, LandOwnership, Scheme, SubsidyDetails, Transaction, TransactionDetails,
        TransactionType, ViolationCode,
    },
    name_generator::NameGenerator,
    rng::RngBank,
    types::{Amount, TransactionId},
};
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

// ── Constants ────────────────────────────────────────────────────────────────

pub const FARMER_COUNT: usize = 50;
pub const TRANSACTION_COUNT: usize = 200;
pub const VIOLATION_COUNT: usize = 60;

const UNIQUE_SUBSIDY_CLAIMS: usize = 40;
const DUPLICATE_SUBSIDY_CLAIMS: usize = 10;
const INSURANCE_CLAIMS: usize = 40;
const FERTILIZER_PURCHASES: usize = 55;
const CROP_SALES: usize = 55;

const SUBSIDY_INSTALLMENT_AMOUNT: Amount = 2_000.0;
const SUBSIDY_FARM_SIZE_LIMIT_HA: f64 = 2.0;

const SUBSIDY_LIMIT_QUOTA: usize = 15;
const LATE_REPORTING_QUOTA: usize = 12;
const EXCESS_FERTILIZER_QUOTA: usize = 12;
const PRICE_MANIPULATION_QUOTA: usize = 11;

const UREA_BAG_PRICE: Amount = 266.0;
const DAP_BAG_PRICE: Amount = 1_350.0;
const POTASH_BAG_PRICE: Amount = 1_700.0;

const MIN_INCOME: f64 = 50_000.0;
const MAX_INCOME: f64 = 800_000.0;

const INSURANCE_CAUSES: [&str; 4] = ["excess_rain", "dry_spell", "pest_attack", "flood"];
const MANDIS: [&str; 5] = [
    "Pune APMC",
    "Nashik APMC",
    "Sangli APMC",
    "Kolhapur APMC",
    "Satara APMC",
];

// ── Crop economics ───────────────────────────────────────────────────────────

struct CropProfile {
    income_per_ha: f64,
    urea: f64,
    dap: f64,
    potash: f64,
    msp: f64,
}

fn crop_profile(crop: Crop) -> CropProfile {
    let (income_per_ha, urea, dap, potash, msp) = match crop {
        Crop::Wheat => (85_000.0, 12.0, 6.0, 4.0, 2_275.0),
        Crop::Rice => (90_000.0, 13.0, 7.0, 4.0, 2_300.0),
        Crop::Sugarcane => (130_000.0, 16.0, 8.0, 6.0, 340.0),
        Crop::Cotton => (110_000.0, 14.0, 7.0, 5.0, 7_121.0),
        Crop::Tomato => (150_000.0, 10.0, 6.0, 6.0, 1_200.0),
        Crop::Onion => (140_000.0, 11.0, 6.0, 5.0, 1_400.0),
    };
    CropProfile {
        income_per_ha,
        urea,
        dap,
        potash,
        msp,
    }
}

fn fertilizer_amount(urea: u32, dap: u32, potash: u32) -> Amount {
    (f64::from(urea) * UREA_BAG_PRICE
        + f64::from(dap) * DAP_BAG_PRICE
        + f64::from(potash) * POTASH_BAG_PRICE)
        .round()
}

fn bags(raw: f64, floor: u32) -> u32 {
    (raw.round().max(0.0) as u32).max(floor)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn date_from_index(base: (i32, u32, u32), offset_days: usize) -> ComplianceResult<String> {
    let (year, month, day) = base;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|start| start.checked_add_days(Days::new(offset_days as u64)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| {
            ComplianceError::from(anyhow::anyhow!(
                "invalid calendar offset {offset_days} from {year}-{month:02}-{day:02}"
            ))
        })
}

// ── Ledger ───────────────────────────────────────────────────────────────────

/// Append-only transaction list that hands out sequential ids.
struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            transactions: Vec::with_capacity(capacity),
        }
    }

    fn push(
        &mut self,
        farmer: &Farmer,
        scheme: Option<Scheme>,
        date: String,
        amount: Amount,
        details: TransactionDetails,
        duplicate_of: Option<TransactionId>,
    ) -> TransactionId {
        let transaction_id = format!("T{:05}", self.transactions.len() + 1);
        self.transactions.push(Transaction {
            transaction_id: transaction_id.clone(),
            scheme,
            farmer_id: farmer.farmer_id.clone(),
            district: Some(farmer.district),
            date: Some(date),
            amount,
            details,
            duplicate_of,
            is_violation: false,
            violation_code: None,
            violation_note: None,
        });
        transaction_id
    }
}

fn mark_violation(transaction: &mut Transaction, code: ViolationCode, note: &str) {
    transaction.is_violation = true;
    transaction.violation_code = Some(code);
    transaction.violation_note = Some(note.to_string());
}

/// Fails with DatasetInvariant unless the generated shape is exactly
/// 50 farmers, 200 transactions and 60 tagged violations.
pub fn check_counts(farmers: usize, transactions: usize, tagged: usize) -> ComplianceResult<()> {
    if farmers == FARMER_COUNT && transactions == TRANSACTION_COUNT && tagged == VIOLATION_COUNT {
        return Ok(());
    }
    log::error!(
        "Dataset generation drifted: {farmers} farmers, {transactions} transactions, {tagged} violations"
    );
    Err(ComplianceError::DatasetInvariant {
        expected_farmers: FARMER_COUNT,
        expected_transactions: TRANSACTION_COUNT,
        expected_violations: VIOLATION_COUNT,
        actual_farmers: farmers,
        actual_transactions: transactions,
        actual_violations: tagged,
    })
}

// ── Generator ────────────────────────────────────────────────────────────────

pub struct DatasetGenerator {
    rng: RngBank,
}

impl DatasetGenerator {
    pub fn new(rng: RngBank) -> Self {
        Self { rng }
    }

    /// Build the full dataset. Re-running with the same bank yields an
    /// identical dataset.
    pub fn generate(&self) -> ComplianceResult<Dataset> {
        let farmers = self.build_farmers();
        let mut ledger = Ledger::with_capacity(TRANSACTION_COUNT);

        self.build_subsidy_claims(&farmers, &mut ledger)?;
        self.build_insurance_claims(&farmers, &mut ledger)?;
        self.build_fertilizer_purchases(&farmers, &mut ledger)?;
        self.build_crop_sales(&farmers, &mut ledger)?;

        let mut transactions = ledger.transactions;
        inject_violations(&farmers, &mut transactions);

        let tagged = transactions.iter().filter(|t| t.is_violation).count();
        check_counts(farmers.len(), transactions.len(), tagged)?;

        log::info!(
            "Generated compliance dataset: {} farmers, {} transactions, {} tagged violations",
            farmers.len(),
            transactions.len(),
            tagged
        );
        Dataset::new(farmers, transactions)
    }

    fn build_farmers(&self) -> Vec<Farmer> {
        (0..FARMER_COUNT)
            .map(|i| {
                let idx = (i + 1) as u64;
                let district = District::ALL[i % District::ALL.len()];
                let primary_crop = Crop::ALL[(i * 3 + 1) % Crop::ALL.len()];
                let farm_size = round1(0.5 + self.rng.unit(idx * 13) * 9.5);

                let land_ownership = if self.rng.unit(idx * 31) > 0.22 {
                    LandOwnership::Owned
                } else {
                    LandOwnership::Leased
                };
                let ownership_multiplier = match land_ownership {
                    LandOwnership::Owned => 0.95,
                    LandOwnership::Leased => 0.78,
                };

                let profile = crop_profile(primary_crop);
                let base_income = profile.income_per_ha * farm_size * ownership_multiplier;
                let noise = (self.rng.unit(idx * 47) - 0.35) * 50_000.0;
                let annual_income = (base_income + noise).round().clamp(MIN_INCOME, MAX_INCOME) as u64;

                Farmer {
                    farmer_id: format!("F{}", 1000 + idx),
                    name: NameGenerator::farmer_name(i).to_string(),
                    district,
                    farm_size,
                    land_ownership,
                    primary_crop,
                    annual_income,
                    is_taxpayer: Farmer::derive_is_taxpayer(annual_income),
                    fertilizer_usage: FertilizerUsage {
                        urea_bags: bags(profile.urea * farm_size * 0.55, 2),
                        dap_bags: bags(profile.dap * farm_size * 0.45, 1),
                        potash_bags: bags(profile.potash * farm_size * 0.40, 1),
                    },
                }
            })
            .collect()
    }

    fn build_subsidy_claims(&self, farmers: &[Farmer], ledger: &mut Ledger) -> ComplianceResult<()> {
        let mut originals = Vec::with_capacity(UNIQUE_SUBSIDY_CLAIMS);
        for (i, farmer) in farmers.iter().cycle().take(UNIQUE_SUBSIDY_CLAIMS).enumerate() {
            let installment = (i % 3 + 1) as u8;
            let id = ledger.push(
                farmer,
                Some(Scheme::PmKisan),
                date_from_index((2025, 4, 1), i * 3)?,
                SUBSIDY_INSTALLMENT_AMOUNT,
                TransactionDetails::SubsidyClaim(SubsidyDetails {
                    installment,
                    farm_size_snapshot: Some(farmer.farm_size),
                }),
                None,
            );
            originals.push((farmer, installment, id));
        }

        for (i, (farmer, installment, original_id)) in
            originals.into_iter().take(DUPLICATE_SUBSIDY_CLAIMS).enumerate()
        {
            ledger.push(
                farmer,
                Some(Scheme::PmKisan),
                date_from_index((2025, 7, 1), i * 4)?,
                SUBSIDY_INSTALLMENT_AMOUNT,
                TransactionDetails::SubsidyClaim(SubsidyDetails {
                    installment,
                    farm_size_snapshot: Some(farmer.farm_size),
                }),
                Some(original_id),
            );
        }
        Ok(())
    }

    fn build_insurance_claims(&self, farmers: &[Farmer], ledger: &mut Ledger) -> ComplianceResult<()> {
        for (i, farmer) in farmers.iter().cycle().take(INSURANCE_CLAIMS).enumerate() {
            let amount = (9_000.0 + self.rng.unit(100 + i as u64) * 85_000.0).round();
            ledger.push(
                farmer,
                Some(Scheme::Pmfby),
                date_from_index((2025, 8, 2), i * 2)?,
                amount,
                TransactionDetails::InsuranceClaim(InsuranceDetails {
                    event_date: Some(date_from_index((2025, 8, 1), i * 2)?),
                    report_delay_days: 1,
                    cause: Some(INSURANCE_CAUSES[i % INSURANCE_CAUSES.len()].to_string()),
                }),
                None,
            );
        }
        Ok(())
    }

    fn build_fertilizer_purchases(
        &self,
        farmers: &[Farmer],
        ledger: &mut Ledger,
    ) -> ComplianceResult<()> {
        for (i, farmer) in farmers.iter().cycle().take(FERTILIZER_PURCHASES).enumerate() {
            let profile = crop_profile(farmer.primary_crop);
            let urea = bags(profile.urea * farmer.farm_size * 0.30 + (i % 4) as f64, 2);
            let dap = bags(profile.dap * farmer.farm_size * 0.22 + (i % 3) as f64, 1);
            let potash = bags(profile.potash * farmer.farm_size * 0.20 + (i % 2) as f64, 1);

            ledger.push(
                farmer,
                None,
                date_from_index((2025, 5, 1), i * 2)?,
                fertilizer_amount(urea, dap, potash),
                TransactionDetails::FertilizerPurchase(FertilizerDetails {
                    urea_bags: urea,
                    dap_bags: dap,
                    potash_bags: potash,
                    vendor: Some(format!("Agri Input Center {}", i % 7 + 1)),
                }),
                None,
            );
        }
        Ok(())
    }

    fn build_crop_sales(&self, farmers: &[Farmer], ledger: &mut Ledger) -> ComplianceResult<()> {
        if farmers.is_empty() {
            return Ok(());
        }
        for i in 0..CROP_SALES {
            let farmer = &farmers[(i * 3) % farmers.len()];
            let msp = crop_profile(farmer.primary_crop).msp;
            // Sugarcane and vegetables rarely trade at MSP; the benchmark is
            // still recorded for screening.
            let market_multiplier = 1.03 + self.rng.unit(400 + i as u64) * 0.20;
            let price_per_quintal = (msp * market_multiplier).round();
            let quantity_quintal = round1(8.0 + self.rng.unit(800 + i as u64) * 72.0);

            ledger.push(
                farmer,
                None,
                date_from_index((2025, 10, 1), i * 2)?,
                (quantity_quintal * price_per_quintal).round(),
                TransactionDetails::CropSale(CropSaleDetails {
                    crop: Some(farmer.primary_crop.to_string()),
                    quantity_quintal,
                    sale_price_per_quintal: price_per_quintal,
                    msp_per_quintal: msp,
                    mandi: Some(MANDIS[i % MANDIS.len()].to_string()),
                }),
                None,
            );
        }
        Ok(())
    }
}

impl Default for DatasetGenerator {
    fn default() -> Self {
        Self::new(RngBank::default())
    }
}

/// Tag exactly 60 transactions, mutating their payloads so the breach is real.
fn inject_violations(farmers: &[Farmer], transactions: &mut [Transaction]) {
    let indices_of = |kind: TransactionType, transactions: &[Transaction]| -> Vec<usize> {
        transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| t.transaction_type() == kind)
            .map(|(i, _)| i)
            .collect()
    };
    let subsidy = indices_of(TransactionType::SubsidyClaim, transactions);
    let insurance = indices_of(TransactionType::InsuranceClaim, transactions);
    let fertilizer = indices_of(TransactionType::FertilizerPurchase, transactions);
    let sales = indices_of(TransactionType::CropSale, transactions);

    // Duplicates: the explicitly linked batch.
    for &ix in subsidy
        .iter()
        .skip(UNIQUE_SUBSIDY_CLAIMS)
        .take(DUPLICATE_SUBSIDY_CLAIMS)
    {
        mark_violation(
            &mut transactions[ix],
            ViolationCode::DuplicateClaims,
            "Duplicate PM-KISAN installment claim detected.",
        );
    }

    // Farm size: first untagged claims whose farmer holds more than 2 ha.
    let farm_sizes: HashMap<&str, f64> = farmers
        .iter()
        .map(|f| (f.farmer_id.as_str(), f.farm_size))
        .collect();
    let mut exceeded = 0;
    for &ix in &subsidy {
        if exceeded == SUBSIDY_LIMIT_QUOTA {
            break;
        }
        let tx = &mut transactions[ix];
        let farm_size = farm_sizes.get(tx.farmer_id.as_str()).copied().unwrap_or(0.0);
        if !tx.is_violation && farm_size > SUBSIDY_FARM_SIZE_LIMIT_HA {
            mark_violation(
                tx,
                ViolationCode::SubsidyLimitExceeded,
                "Farm size above 2 ha for this subsidy eligibility rule.",
            );
            exceeded += 1;
        }
    }

    if !insurance.is_empty() {
        for i in 0..LATE_REPORTING_QUOTA {
            let tx = &mut transactions[insurance[(i * 3) % insurance.len()]];
            if let TransactionDetails::InsuranceClaim(details) = &mut tx.details {
                details.report_delay_days = 4 + (i % 5) as u32;
            }
            mark_violation(
                tx,
                ViolationCode::LateReporting,
                "Insurance claim reported after allowed 3-day window.",
            );
        }
    }

    if !fertilizer.is_empty() {
        for i in 0..EXCESS_FERTILIZER_QUOTA {
            let tx = &mut transactions[fertilizer[(i * 4) % fertilizer.len()]];
            if let TransactionDetails::FertilizerPurchase(details) = &mut tx.details {
                details.urea_bags = 52 + (i % 11) as u32;
                tx.amount = fertilizer_amount(details.urea_bags, details.dap_bags, details.potash_bags);
            }
            mark_violation(
                tx,
                ViolationCode::ExcessFertilizer,
                "Urea purchase exceeds 50 bags threshold.",
            );
        }
    }

    if !sales.is_empty() {
        for i in 0..PRICE_MANIPULATION_QUOTA {
            let tx = &mut transactions[sales[(i * 5) % sales.len()]];
            if let TransactionDetails::CropSale(details) = &mut tx.details {
                details.sale_price_per_quintal =
                    (details.msp_per_quintal * (0.78 + (i % 3) as f64 * 0.03)).round();
                tx.amount = (details.sale_price_per_quintal * details.quantity_quintal).round();
            }
            mark_violation(
                tx,
                ViolationCode::PriceManipulation,
                "Crop sale recorded significantly below MSP benchmark.",
            );
        }
    }
}
