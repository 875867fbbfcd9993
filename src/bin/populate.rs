// src/bin/populate.rs
// Imports a JSON file of cities into a running mytravelog instance
// through the admin API, in batches.
//
// Usage: populate [path/to/cities.json]   (default: data/cities.json)
// Env:   TRAVELOG_URL (default http://localhost:8000), ADMIN_TOKEN

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::process;
use std::time::{Duration, Instant};

// --- ANSI colours ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const DEFAULT_FILE: &str = "data/cities.json";
const BATCH_SIZE: usize = 25;

// --- Data ---

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CityEntry {
    name: String,
    country_name: String,
    tourist_count: i64,
    #[serde(default)]
    tourist_growth: f64,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Debug, Default)]
struct ImportResponse {
    #[serde(default)]
    cities_created: usize,
    #[serde(default)]
    cities_skipped: usize,
    #[serde(default)]
    cities_failed: usize,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug)]
struct BatchResult {
    first: String,
    last: String,
    success: bool,
    created: usize,
    skipped: usize,
    failed: usize,
    duration_secs: f64,
}

fn load_cities(path: &str) -> Result<Vec<CityEntry>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let cities: Vec<CityEntry> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;
    if cities.is_empty() {
        bail!("{} contains no cities", path);
    }
    Ok(cities)
}

// --- Importer ---

struct CityImporter {
    base_url: String,
    admin_token: String,
    client: Client,
    results: Vec<BatchResult>,
}

impl CityImporter {
    fn new(base_url: String, admin_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("creating HTTP client")?;

        Ok(Self {
            base_url,
            admin_token,
            client,
            results: Vec::new(),
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn import_batch(&self, batch: &[CityEntry]) -> Result<ImportResponse> {
        let url = format!("{}/admin/cities", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-Admin-Token", &self.admin_token)
            .json(batch)
            .send()
            .await
            .context("sending import request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("HTTP {} - {}", status, body);
        }

        response
            .json::<ImportResponse>()
            .await
            .context("parsing import response")
    }

    async fn run(&mut self, cities: &[CityEntry]) -> Result<()> {
        println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
        if !self.check_service_health().await {
            bail!("service unavailable at {}", self.base_url);
        }
        println!("{}✅ Service available{}\n", GREEN, RESET);

        self.print_header(cities.len());

        let batches: Vec<&[CityEntry]> = cities.chunks(BATCH_SIZE).collect();
        let total = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            let first = batch.first().map(|c| c.name.clone()).unwrap_or_default();
            let last = batch.last().map(|c| c.name.clone()).unwrap_or_default();
            let start_time = Instant::now();

            println!(
                "{}[{}/{}] Importing {} .. {}{}",
                CYAN,
                i + 1,
                total,
                first,
                last,
                RESET
            );

            let response = self.import_batch(batch).await;
            let duration = start_time.elapsed().as_secs_f64();

            match response {
                Ok(resp) => {
                    println!(
                        "{}✅ {} new, {} skipped, {} invalid ({:.1}s){}",
                        GREEN, resp.cities_created, resp.cities_skipped, resp.cities_failed, duration, RESET
                    );
                    if !resp.errors.is_empty() {
                        println!("{}⚠️  {}{}", YELLOW, resp.errors.join("; "), RESET);
                    }
                    self.results.push(BatchResult {
                        first,
                        last,
                        success: true,
                        created: resp.cities_created,
                        skipped: resp.cities_skipped,
                        failed: resp.cities_failed,
                        duration_secs: duration,
                    });
                }
                Err(e) => {
                    println!("{}❌ Batch failed: {:#}{}", RED, e, RESET);
                    self.results.push(BatchResult {
                        first,
                        last,
                        success: false,
                        created: 0,
                        skipped: 0,
                        failed: batch.len(),
                        duration_secs: duration,
                    });
                }
            }
        }

        self.print_summary();
        Ok(())
    }

    fn print_header(&self, total_count: usize) {
        println!("{}╔══════════════════════════════════════════════════════════════╗{}", CYAN, RESET);
        println!("{}║   🌍  mytravelog city import                                  ║{}", CYAN, RESET);
        println!("{}╚══════════════════════════════════════════════════════════════╝{}", CYAN, RESET);
        println!("\n{}📊 Cities to import: {}{}", BOLD, total_count, RESET);
    }

    fn print_summary(&self) {
        println!("\n\n{}📋 Import Summary{}", BOLD, RESET);
        println!("──────────────────────────────────────────────────────────────────────────────");
        println!(
            "{:<40} {:<8} {:>8} {:>8} {:>8} {:>8}",
            "Batch", "Status", "New", "Skipped", "Invalid", "Time"
        );
        println!("──────────────────────────────────────────────────────────────────────────────");

        let mut total_created = 0;
        let mut total_skipped = 0;
        let mut total_failed = 0;

        for res in &self.results {
            let status_icon = if res.success { "✅" } else { "❌" };
            println!(
                "{:<40} {:<8} {:>8} {:>8} {:>8} {:>7.1}s",
                format!("{} .. {}", res.first, res.last),
                status_icon,
                res.created,
                res.skipped,
                res.failed,
                res.duration_secs
            );

            total_created += res.created;
            total_skipped += res.skipped;
            total_failed += res.failed;
        }

        println!("──────────────────────────────────────────────────────────────────────────────");
        println!("{}📊 Totals:{}", BOLD, RESET);
        println!("  • New cities: {}{}{}", GREEN, total_created, RESET);
        println!("  • Already present: {}{}{}", YELLOW, total_skipped, RESET);
        println!("  • Invalid or failed: {}{}{}", RED, total_failed, RESET);
    }
}

async fn run() -> Result<()> {
    dotenv().ok();

    let admin_token = env::var("ADMIN_TOKEN").context("ADMIN_TOKEN must be set")?;
    let base_url =
        env::var("TRAVELOG_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_FILE.to_string());

    let cities = load_cities(&path)?;

    let mut importer = CityImporter::new(base_url, admin_token)?;
    importer.run(&cities).await
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}❌ {:#}{}", RED, e, RESET);
        process::exit(1);
    }
}
