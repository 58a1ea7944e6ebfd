use chrono::DateTime;
use colored::*;

use crate::p2p::p2p_client::BlockReport;
use crate::p2p::utils::hash_hex;

pub fn format_timestamp(timestamp: u32) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%d %B %Y at %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn print_block(report: &BlockReport) {
    let block = &report.block;
    let header = &block.header;

    println!("\n📦 Block added on: {}", format_timestamp(header.timestamp));
    println!("   Transactions: {}", block.transactions.len());
    for (i, tx) in block.transactions.iter().enumerate() {
        println!("   Transaction {} (version {}, {} satoshis out):", i + 1, tx.version, tx.total_value());
        for (j, output) in tx.outputs.iter().enumerate() {
            println!("     Output {}: {} satoshis", j + 1, output.value);
        }
    }
    println!("   Nonce: {}", header.nonce);
    println!("   Difficulty bits: {:#010x}", header.bits);
    println!("   Computed hash:  {}", hash_hex(&block.computed_hash));
    println!("   Requested hash: {}", hash_hex(&block.requested_hash));

    if report.verified {
        println!("   {}", "✅ Block hash verified successfully!".green().bold());
    } else {
        println!("   {}", "❌ Block hash verification failed!".red().bold());
    }
}

pub fn print_json(report: &BlockReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("❌ Could not serialize block: {}", e),
    }
}
