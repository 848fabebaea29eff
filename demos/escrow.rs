use std::time::Duration;

use serde_json::json;

use blnk_sdk::config::ObservabilityConfig;
use blnk_sdk::observability::logging::init_logging;
use blnk_sdk::resources::balances::CreateBalanceRequest;
use blnk_sdk::resources::transactions::InflightStatus;
use blnk_sdk::resources::MetaData;
use blnk_sdk::{BlnkClient, CreateLedgerRequest, CreateTransactionRequest, ParentTransaction};

fn meta(value: serde_json::Value) -> Option<MetaData> {
    value.as_object().cloned()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&ObservabilityConfig::default())?;

    let client = BlnkClient::builder("http://localhost:5001/")
        .timeout(Duration::from_secs(5))
        .max_attempts(2)
        .build()?;

    let ledger = client.ledgers().create(&CreateLedgerRequest::new("USD Ledger")).await?;
    println!("Ledger: {}", ledger.ledger_id);

    let alice = client
        .balances()
        .create(&CreateBalanceRequest {
            ledger_id: ledger.ledger_id.clone(),
            currency: "USD".to_string(),
            meta_data: meta(json!({"account_type": "Escrow", "customer_name": "Alice Johnson"})),
            ..Default::default()
        })
        .await?;
    let bob = client
        .balances()
        .create(&CreateBalanceRequest {
            ledger_id: ledger.ledger_id.clone(),
            currency: "USD".to_string(),
            meta_data: meta(json!({"account_type": "Escrow", "customer_name": "Bob Smith"})),
            ..Default::default()
        })
        .await?;

    // 1. Alice funds escrow; held inflight until released
    let deposit = client
        .transactions()
        .create(&CreateTransactionRequest {
            transaction: ParentTransaction {
                amount: 1000.0,
                reference: "ref-21".to_string(),
                precision: 100,
                currency: "USD".to_string(),
                source: Some("@bank-account".to_string()),
                destination: Some(alice.balance_id.clone()),
                description: "Alice Funds".to_string(),
                meta_data: meta(json!({"transaction_type": "deposit"})),
                ..Default::default()
            },
            inflight: true,
            ..Default::default()
        })
        .await?;
    println!("Deposit {} is {:?}", deposit.transaction_id, deposit.transaction.status);

    let committed = client
        .transactions()
        .update_inflight(&deposit.transaction_id, InflightStatus::Commit)
        .await?;
    println!("Deposit committed: {:?}", committed.transaction.status);

    // 2. Release to Bob
    let release = client
        .transactions()
        .create(&CreateTransactionRequest {
            transaction: ParentTransaction {
                amount: 1000.0,
                reference: "ref-22".to_string(),
                precision: 100,
                currency: "USD".to_string(),
                source: Some(alice.balance_id.clone()),
                destination: Some(bob.balance_id.clone()),
                description: "Fund Bob".to_string(),
                meta_data: meta(json!({"transaction_type": "release"})),
                ..Default::default()
            },
            ..Default::default()
        })
        .await?;
    println!("Released: {}", release.transaction_id);

    // 3. Dispute: refund the release
    match client.transactions().refund(&release.transaction_id).await {
        Ok(refund) => println!("Refunded: {}", refund.transaction_id),
        Err(e) if e.status() == Some(400) => eprintln!("Refund refused: {}", e),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
