use std::time::Duration;

use blnk_sdk::config::ObservabilityConfig;
use blnk_sdk::observability::logging::init_logging;
use blnk_sdk::{AllocationTarget, BlnkClient, CreateTransactionRequest, ParentTransaction};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&ObservabilityConfig::default())?;

    let client = BlnkClient::builder("http://localhost:5001/")
        .timeout(Duration::from_secs(5))
        .max_attempts(2)
        .build()?;

    // 1. Split a transfer: a fixed amount from one account, the rest from another
    let request = CreateTransactionRequest {
        transaction: ParentTransaction {
            amount: 30000.0,
            reference: "ref-21d".to_string(),
            precision: 100,
            currency: "USD".to_string(),
            description: "Alice Funds".to_string(),
            destination: Some("@alice".to_string()),
            sources: vec![
                AllocationTarget::new("@test-1", "20000.00"),
                AllocationTarget::new("@test-2", "left"),
            ],
            ..Default::default()
        },
        ..Default::default()
    };

    let resolved = client.validator().validate(&request.intent())?;
    println!("Resolved sources: {}", serde_json::to_string_pretty(&resolved.source)?);

    match client.transactions().create(&request).await {
        Ok(tx) => println!("Transaction queued: {}", tx.transaction_id),
        Err(e) => eprintln!("Error creating transaction: {}", e),
    }

    // 2. A split that overshoots is rejected before anything is sent
    let mut overdrawn = request.clone();
    overdrawn.transaction.sources = vec![
        AllocationTarget::new("@test-1", "60%"),
        AllocationTarget::new("@test-2", "50%"),
    ];
    match client.transactions().create(&overdrawn).await {
        Ok(_) => println!("Unexpectedly accepted"),
        Err(e) => println!("Rejected locally: {}", e),
    }

    Ok(())
}
