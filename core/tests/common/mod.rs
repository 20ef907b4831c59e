//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use agrisense_core::{
    config::RuleCatalog,
    dataset::Dataset,
    engine::ComplianceEngine,
    model::{
        Crop, CropSaleDetails, District, Farmer, FertilizerDetails, FertilizerUsage,
        InsuranceDetails, LandOwnership, Scheme, SubsidyDetails, Transaction, TransactionDetails,
    },
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn farmer(id: &str, farm_size: f64, annual_income: u64) -> Farmer {
    Farmer {
        farmer_id: id.to_string(),
        name: "Test Farmer".to_string(),
        district: District::Pune,
        farm_size,
        land_ownership: LandOwnership::Owned,
        primary_crop: Crop::Wheat,
        annual_income,
        is_taxpayer: Farmer::derive_is_taxpayer(annual_income),
        fertilizer_usage: FertilizerUsage::default(),
    }
}

fn transaction(id: &str, farmer_id: &str, date: &str, amount: f64, details: TransactionDetails) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        scheme: None,
        farmer_id: farmer_id.to_string(),
        district: Some(District::Pune),
        date: Some(date.to_string()),
        amount,
        details,
        duplicate_of: None,
        is_violation: false,
        violation_code: None,
        violation_note: None,
    }
}

pub fn subsidy_claim(id: &str, farmer_id: &str, date: &str, amount: f64, installment: u8) -> Transaction {
    let mut tx = transaction(
        id,
        farmer_id,
        date,
        amount,
        TransactionDetails::SubsidyClaim(SubsidyDetails {
            installment,
            farm_size_snapshot: None,
        }),
    );
    tx.scheme = Some(Scheme::PmKisan);
    tx
}

pub fn insurance_claim(id: &str, farmer_id: &str, report_delay_days: u32) -> Transaction {
    let mut tx = transaction(
        id,
        farmer_id,
        "2025-08-05",
        25_000.0,
        TransactionDetails::InsuranceClaim(InsuranceDetails {
            event_date: Some("2025-08-01".to_string()),
            report_delay_days,
            cause: Some("flood".to_string()),
        }),
    );
    tx.scheme = Some(Scheme::Pmfby);
    tx
}

pub fn fertilizer_purchase(id: &str, farmer_id: &str, urea: u32, dap: u32, potash: u32) -> Transaction {
    transaction(
        id,
        farmer_id,
        "2025-05-01",
        10_000.0,
        TransactionDetails::FertilizerPurchase(FertilizerDetails {
            urea_bags: urea,
            dap_bags: dap,
            potash_bags: potash,
            vendor: None,
        }),
    )
}

pub fn crop_sale(id: &str, farmer_id: &str, msp: f64, sale_price: f64) -> Transaction {
    transaction(
        id,
        farmer_id,
        "2025-10-01",
        sale_price * 10.0,
        TransactionDetails::CropSale(CropSaleDetails {
            crop: Some(Crop::Wheat.to_string()),
            quantity_quintal: 10.0,
            sale_price_per_quintal: sale_price,
            msp_per_quintal: msp,
            mandi: None,
        }),
    )
}

/// Engine over a hand-built dataset with the standard catalog.
pub fn engine_with(farmers: Vec<Farmer>, transactions: Vec<Transaction>) -> ComplianceEngine {
    init_logging();
    let dataset = Dataset::new(farmers, transactions).expect("fixture dataset is consistent");
    ComplianceEngine::new(RuleCatalog::standard(), dataset)
}

pub fn synthetic_engine() -> ComplianceEngine {
    init_logging();
    ComplianceEngine::build().expect("synthetic dataset builds")
}
