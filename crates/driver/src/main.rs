use std::{process::ExitCode, sync::Arc};

use backend::client::BackendClient;
use directions::client::DirectionsClient;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracking::{
    credentials::{current_session, store_session, CredentialStore, MemoryCredentialStore},
    poller::{LocationPoller, PollerState},
    position::StaticPositionProvider,
    route::RouteOptimizer,
    stops::StopCollector,
};

mod config;

use config::DriverConfig;

const USAGE: &str = "usage: driver <track | route | approved | deliver <invoice-id>>";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let config =
        DriverConfig::from_env().expect("missing or invalid driver configuration in env.");
    let backend = Arc::new(
        BackendClient::new(&config.backend).expect("could not create backend client."),
    );
    let stops = Arc::new(StopCollector::new(backend.clone()));

    let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::default());
    if let Some(session) = &config.session {
        store_session(credentials.as_ref(), session);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["track"] => track(config, backend, stops, credentials).await,
        ["route"] => route(config, stops, credentials.as_ref()).await,
        ["approved"] => approved(stops, credentials.as_ref()).await,
        ["deliver", invoice_id] => match invoice_id.parse() {
            Ok(invoice_id) => deliver(stops, credentials.as_ref(), invoice_id).await,
            Err(_) => {
                eprintln!("invalid invoice id '{invoice_id}'");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

async fn track(
    config: DriverConfig,
    backend: Arc<BackendClient>,
    stops: Arc<StopCollector<BackendClient>>,
    credentials: Arc<dyn CredentialStore>,
) -> ExitCode {
    let poller = LocationPoller::new(
        StaticPositionProvider::new(config.position),
        backend,
        stops.clone(),
        credentials,
        config.tracker,
    );

    // print every new stop list
    let mut updates = WatchStream::new(stops.subscribe());
    tokio::spawn(async move {
        while let Some(stops) = updates.next().await {
            println!("{} pending stops", stops.len());
            for stop in stops.iter() {
                println!("  #{:<6} {} ({})", stop.invoice_id, stop.display_name, stop.location);
            }
        }
    });

    poller.enable();
    log::info!("Tracking, press Ctrl-C to stop.");
    if let Err(why) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for Ctrl-C: {why}");
    }

    poller.disable();
    let mut state = poller.subscribe_state();
    let _ = state.wait_for(|state| *state == PollerState::Idle).await;
    ExitCode::SUCCESS
}

async fn route(
    config: DriverConfig,
    stops: Arc<StopCollector<BackendClient>>,
    credentials: &dyn CredentialStore,
) -> ExitCode {
    let Some(directions) = &config.directions else {
        eprintln!("DIRECTIONS_API_KEY is not set.");
        return ExitCode::FAILURE;
    };
    let client = match DirectionsClient::new(directions) {
        Ok(client) => client,
        Err(why) => {
            log::error!("Could not create directions client: {why}");
            return ExitCode::FAILURE;
        }
    };
    let optimizer = RouteOptimizer::new(client);

    let session = current_session(credentials);
    match optimizer
        .optimize_from(session.as_ref(), config.position, &stops)
        .await
    {
        Ok(route) => match serde_json::to_string_pretty(&route) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(why) => {
                log::error!("Could not serialize route: {why}");
                ExitCode::FAILURE
            }
        },
        Err(why) => {
            log::warn!("Route optimization failed: {why}");
            eprintln!("{}", why.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn approved(
    stops: Arc<StopCollector<BackendClient>>,
    credentials: &dyn CredentialStore,
) -> ExitCode {
    let Some(session) = current_session(credentials) else {
        eprintln!("DRIVER_TOKEN and DRIVER_ID are not set.");
        return ExitCode::FAILURE;
    };
    match stops.approved(session.driver_id).await {
        Ok(invoices) => {
            for invoice in invoices {
                println!("  #{:<6} {}", invoice.id_invoice, invoice.store_name);
            }
            ExitCode::SUCCESS
        }
        Err(why) => {
            eprintln!("{}", why.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn deliver(
    stops: Arc<StopCollector<BackendClient>>,
    credentials: &dyn CredentialStore,
    invoice_id: i32,
) -> ExitCode {
    let session = current_session(credentials);
    match stops.mark_delivered(session.as_ref(), invoice_id).await {
        Ok(()) => {
            println!("Invoice #{invoice_id} delivered.");
            ExitCode::SUCCESS
        }
        Err(why) => {
            eprintln!("{}", why.user_message());
            ExitCode::FAILURE
        }
    }
}
