mod api;
mod filter;
mod grouping;
mod inventory;
mod outbound;
mod reference;
mod settings;
mod web;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};

use crate::{
    api::Limits,
    outbound::{postgrest::RestClient, DataService},
    reference::ReferenceSnapshot,
    settings::{Args, Settings},
    web::Tls,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::from_file(&args.config)
        .with_context(|| format!("Problem while loading {}", args.config.display()))?;

    let level = settings.log.level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();
    info!("Inventory Dashboard Server");

    let service: Arc<dyn DataService> = Arc::new(RestClient::new(
        &settings.backend.url,
        &settings.backend.api_key,
        &settings.backend.photo_bucket,
    )?);
    let reference = ReferenceSnapshot::load(service.as_ref()).await;
    let limits = Limits {
        search: settings.search.limit,
        candidates: settings.search.candidate_limit,
    };
    let schema = api::schema(service, reference, limits);

    let tls = match (args.cert, args.key) {
        (Some(cert), Some(key)) => Some(Tls { cert, key }),
        _ => None,
    };
    web::serve(schema, settings.web.address, tls).await;
    Ok(())
}
