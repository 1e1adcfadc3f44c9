use clap::Parser;
use futures::future::join_all;
use offer_scout::config::{AppConfig, load_config};
use offer_scout::model::{CompareRequest, CompareResponse};
use offer_scout::service::{Aggregator, CompareService, ListingFactsEnricher};
use offer_scout::storage::{RateLimiter, build_cache};
use offer_scout::utils::init_logger;
use std::path::PathBuf;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "offer-scout")]
#[command(about = "Find and compare the best offers for two products")]
struct Cli {
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[arg(long)]
    brand_a: Option<String>,

    #[arg(long)]
    product_a: Option<String>,

    #[arg(long)]
    brand_b: Option<String>,

    #[arg(long)]
    product_b: Option<String>,

    /// Comma separated: danawa,11st,naver_serpapi
    #[arg(long, value_delimiter = ',')]
    sources: Vec<String>,

    #[arg(long)]
    force_refresh: bool,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

impl Cli {
    fn has_products(&self) -> bool {
        self.brand_a.is_some()
            || self.product_a.is_some()
            || self.brand_b.is_some()
            || self.product_b.is_some()
    }

    /// Flags describe a single comparison; otherwise the config list is used.
    fn requests(&self, config: &AppConfig) -> Vec<CompareRequest> {
        let mut requests = if self.has_products() || config.comparisons.is_empty() {
            let d = CompareRequest::default();
            vec![CompareRequest {
                brand_a: self.brand_a.clone().unwrap_or(d.brand_a),
                product_a: self.product_a.clone().unwrap_or(d.product_a),
                brand_b: self.brand_b.clone().unwrap_or(d.brand_b),
                product_b: self.product_b.clone().unwrap_or(d.product_b),
                sources: d.sources,
                force_refresh: false,
            }]
        } else {
            config.comparisons.clone()
        };

        for req in &mut requests {
            if !self.sources.is_empty() {
                req.sources = self.sources.clone();
            }
            req.force_refresh |= self.force_refresh;
        }
        requests
    }
}

fn print_response(response: &CompareResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Cannot render response {}: {}", response.request_id, e),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let aggregator = match Aggregator::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            error!("Failed to set up listing sources: {}", e);
            return;
        }
    };

    let cache = match build_cache(&config.cache) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to initialize cache: {}", e);
            return;
        }
    };

    let service = CompareService::new(
        aggregator,
        cache,
        RateLimiter::new(Duration::from_secs(config.cache.rate_limit_seconds)),
        Box::new(ListingFactsEnricher),
        Duration::from_secs(config.cache.ttl_seconds),
    );

    let requests = cli.requests(&config);

    loop {
        info!("Running {} comparisons...", requests.len());
        let results = join_all(requests.iter().map(|req| service.compare(req))).await;

        for (req, result) in requests.iter().zip(results) {
            match result {
                Ok(response) => {
                    for w in &response.warnings {
                        warn!("{} vs {}: {}", req.product_a, req.product_b, w);
                    }
                    print_response(&response);
                }
                Err(e) => warn!("{} vs {}: {}", req.product_a, req.product_b, e),
            }
        }

        let Some(interval) = config.check_interval_seconds else {
            break;
        };
        info!("Waiting {}s for the next run (Ctrl-C to stop)...", interval);
        tokio::select! {
            _ = sleep(Duration::from_secs(interval)) => {
                info!("Timer triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                break;
            }
        }
    }
}
