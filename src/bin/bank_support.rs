//! Toy banking support agent.
//!
//! Demonstrates the same agent plumbing as the notes service against a fake
//! in-memory bank backend: one tool-bound call fetches the customer balance,
//! then a JSON-constrained call produces the structured support result.
//!
//! Run with `cargo run --bin bank_support -- "What is my balance?"`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use dot_notes::config::Config;
use dot_notes::ollama::ChatRequest;

/// Fake bank database. A real deployment would query an external store.
struct BankDb;

impl BankDb {
    async fn customer_name(&self, id: i64) -> Option<String> {
        match id {
            123 => Some("John".to_string()),
            _ => Some("Nishant".to_string()),
        }
    }

    async fn customer_balance(&self, id: i64, _include_pending: bool) -> f64 {
        match id {
            123 => 123.45,
            _ => 9_600_000.31,
        }
    }
}

/// Structured result the support model is constrained to.
#[derive(Debug, Deserialize)]
struct SupportResult {
    support_advice: String,
    block_card: bool,
    risk: u8,
}

#[derive(Debug, Deserialize)]
struct BalanceArgs {
    #[serde(default)]
    include_pending: bool,
}

fn balance_tool_spec() -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": "customer_balance",
            "description": "Returns the customer's current account balance.",
            "parameters": {
                "type": "object",
                "properties": {
                    "include_pending": {
                        "type": "boolean",
                        "description": "Whether to include pending transactions"
                    }
                }
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    dotenv::dotenv().ok();

    let config = Config::from_file("config.toml")?;
    let ollama = config.action_model.client();

    let customer_id = 123;
    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is my balance?".to_string());

    let db = BankDb;
    let name = db
        .customer_name(customer_id)
        .await
        .ok_or_else(|| anyhow!("Customer not found"))?;

    let system_prompt = format!(
        "You are a support agent in our bank, give the customer support and \
         judge the risk level of their query. The customer's name is '{name}'."
    );

    // Step 1: let the model pull the balance through the bound tool
    log::info!("BankSupport: asking action model with customer_balance tool");
    let reply = ollama
        .chat_with_tools(
            ChatRequest {
                system_prompt: system_prompt.clone(),
                user_prompt: question.clone(),
                temperature: config.action_model.temperature,
                top_p: config.action_model.top_p,
                json_format: false,
            },
            &[balance_tool_spec()],
        )
        .await
        .context("BankSupport: tool-bound model call failed")?;

    let call = reply
        .tool_calls
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("BankSupport: model returned no tool call"))?;
    if call.function.name != "customer_balance" {
        anyhow::bail!(
            "BankSupport: model called unknown tool {:?}",
            call.function.name
        );
    }
    let args: BalanceArgs = serde_json::from_value(call.function.arguments)
        .context("BankSupport: invalid tool arguments")?;
    let balance = db.customer_balance(customer_id, args.include_pending).await;
    log::info!("BankSupport: balance={balance}");

    // Step 2: fold the tool result back in and decode the structured verdict
    let verdict_prompt = format!(
        "The customer asked: '{question}'. Their current account balance is {balance:.2}. \
         Reply ONLY with a JSON object of the form \
         {{\"support_advice\": \"<advice returned to the customer>\", \
         \"block_card\": <whether to block the customer's card>, \
         \"risk\": <risk level of the query, 0-10>}}."
    );
    let raw = ollama
        .chat(ChatRequest {
            system_prompt,
            user_prompt: verdict_prompt,
            temperature: config.action_model.temperature,
            top_p: config.action_model.top_p,
            json_format: true,
        })
        .await
        .context("BankSupport: structured model call failed")?;

    let result: SupportResult =
        serde_json::from_str(&raw).context("BankSupport: failed to parse support result")?;

    println!("Advice:     {}", result.support_advice);
    println!("Block card: {}", result.block_card);
    println!("Risk:       {}/10", result.risk);

    Ok(())
}
