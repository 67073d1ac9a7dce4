//! Sensorboard CLI
//!
//! Command-line interface against a running Sensorboard API:
//! - Browse buildings, floors and sensor types
//! - Query series and tabular data
//! - Inject readings
//! - Export data

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sensorboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Building sensor dashboard client")]
#[command(long_about = "Sensorboard collects temperature, humidity, pressure and equipment status readings.\nBrowse, aggregate and export them from the command line.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:5000", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List buildings
    Buildings,

    /// List floors of a building
    Floors {
        /// Building id, or "all"
        #[arg(default_value = "all")]
        building: String,
    },

    /// List sensor types
    SensorTypes,

    /// Reading count per sensor type
    Distribution,

    /// Time series for one building and sensor type
    Series {
        building: String,
        sensor_type: String,
        /// raw, hourly, daily, weekly, monthly, yearly
        #[arg(short, long, default_value = "raw")]
        timeline: String,
    },

    /// Paginated, aggregated table
    Table {
        #[arg(short, long, default_value = "all")]
        building: String,
        #[arg(long, default_value = "all")]
        floor: String,
        #[arg(short, long, default_value = "all")]
        sensor_type: String,
        /// raw, hourly, daily, weekly, monthly, yearly
        #[arg(short, long, default_value = "raw")]
        timeline: String,
        /// raw, min, max, avg
        #[arg(short, long, default_value = "raw")]
        aggregation: String,
        #[arg(short, long, default_value = "30")]
        limit: u32,
        #[arg(short, long, default_value = "0")]
        offset: u32,
    },

    /// Export every reading
    Export {
        /// csv, json or ndjson
        #[arg(value_name = "FORMAT", default_value = "csv")]
        export_format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inject a reading
    Inject {
        building: String,
        floor: i64,
        sensor_type: String,
        #[arg(short, long)]
        value: Option<f64>,
        /// Timestamp (default: now), "YYYY-MM-DD HH:MM:SS" or RFC 3339
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        sensor_id: Option<i64>,
        /// Unit status label, e.g. ON or OFF
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        fan: Option<String>,
        #[arg(long)]
        rotor: Option<String>,
        #[arg(long)]
        pipe: Option<String>,
        #[arg(long)]
        fan_id: Option<String>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = format!("{}/api/v1", cli.api_url.trim_end_matches('/'));

    match cli.command {
        Commands::Buildings => {
            let data = get_json(&client, &format!("{}/buildings", api)).await?;
            print_list(&cli.format, "Building", &data)?;
        }

        Commands::Floors { building } => {
            let url = format!("{}/floors/{}", api, urlencoding::encode(&building));
            let data = get_json(&client, &url).await?;
            print_list(&cli.format, "Floor", &data)?;
        }

        Commands::SensorTypes => {
            let data = get_json(&client, &format!("{}/sensor-types", api)).await?;
            print_list(&cli.format, "Sensor type", &data)?;
        }

        Commands::Distribution => {
            let data = get_json(&client, &format!("{}/sensor-distribution", api)).await?;
            print_rows(&cli.format, &data, &["sensor_type", "count"])?;
        }

        Commands::Series {
            building,
            sensor_type,
            timeline,
        } => {
            let url = format!(
                "{}/series/{}/{}/{}",
                api,
                urlencoding::encode(&building),
                urlencoding::encode(&sensor_type),
                urlencoding::encode(&timeline)
            );
            let data = get_json(&client, &url).await?;
            print_rows(&cli.format, &data, &["timestamp", "value"])?;
        }

        Commands::Table {
            building,
            floor,
            sensor_type,
            timeline,
            aggregation,
            limit,
            offset,
        } => {
            let url = format!(
                "{}/table?building_id={}&floor_id={}&sensor_type={}&timeline={}&aggregation={}&limit={}&offset={}",
                api,
                urlencoding::encode(&building),
                urlencoding::encode(&floor),
                urlencoding::encode(&sensor_type),
                urlencoding::encode(&timeline),
                urlencoding::encode(&aggregation),
                limit,
                offset
            );
            let data = get_json(&client, &url).await?;
            print_rows(
                &cli.format,
                &data,
                &[
                    "period",
                    "sensor_type",
                    "building",
                    "floor",
                    "value",
                    "unit",
                    "samples",
                    "status",
                    "fan_status",
                ],
            )?;
        }

        Commands::Export {
            export_format,
            output,
        } => {
            let url = format!("{}/export/{}", api, urlencoding::encode(&export_format));
            let response = client
                .get(&url)
                .send()
                .await
                .context("Failed to send export request")?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                anyhow::bail!("Export failed ({}): {}", status, error_message(&text));
            }

            let data = response.bytes().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    print!("{}", String::from_utf8_lossy(&data));
                }
            }
        }

        Commands::Inject {
            building,
            floor,
            sensor_type,
            value,
            time,
            sensor_id,
            status,
            fan,
            rotor,
            pipe,
            fan_id,
        } => {
            let body = serde_json::json!({
                "building_id": building,
                "floor_number": floor,
                "sensor_type": sensor_type,
                "sensor_id": sensor_id,
                "value": value,
                "timestamp": time,
                "status": status,
                "fan_status": fan,
                "rotor_status": rotor,
                "pipe_status": pipe,
                "fan_id": fan_id,
            });

            let response = client
                .post(format!("{}/readings", api))
                .json(&body)
                .send()
                .await
                .context("Failed to send reading")?;

            if response.status().is_success() {
                let result: Value = response.json().await?;
                println!(
                    "Stored reading {} at {}",
                    result["id"].as_i64().unwrap_or(0),
                    result["timestamp"].as_str().unwrap_or("unknown")
                );
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Failed ({}): {}", status, error_message(&text));
                std::process::exit(1);
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url.trim_end_matches('/')))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(&health)?);
                        return Ok(());
                    }

                    println!(
                        "Sensorboard v{}",
                        health["version"].as_str().unwrap_or(env!("CARGO_PKG_VERSION"))
                    );
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Store: {}", health["store"].as_str().unwrap_or("unknown"));
                    if let Some(readings) = health["readings"].as_u64() {
                        println!("Readings: {}", readings);
                    }
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Sensorboard API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin sensorboard");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = sensorboard::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent)?;
                        }
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// GET a JSON document, failing with the server's message
async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to send GET request to {}", url))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("Request failed ({}): {}", status, error_message(&text));
    }

    response
        .json()
        .await
        .context("Failed to parse JSON response")
}

/// Pull the message out of an API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.2}", f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn print_list(format: &str, title: &str, data: &Value) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(data)?);
        return Ok(());
    }

    let items = data.as_array().map(Vec::as_slice).unwrap_or(&[]);
    if items.is_empty() {
        println!("No data");
        return Ok(());
    }

    println!("{}", title);
    println!("{}", "-".repeat(title.len().max(12)));
    for item in items {
        println!("{}", cell(item));
    }
    Ok(())
}

fn print_rows(
    format: &str,
    data: &Value,
    columns: &[&str],
) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(data)?);
        return Ok(());
    }

    let rows = data.as_array().map(Vec::as_slice).unwrap_or(&[]);
    if rows.is_empty() {
        println!("No data");
        return Ok(());
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell(&row[*c])).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(c.len())
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<width$}", c, width = w))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1)));

    for row in cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = w))
            .collect();
        println!("{}", line.join(" | "));
    }
    Ok(())
}
