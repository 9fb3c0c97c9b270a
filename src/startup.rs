//! src/startup.rs

use crate::analytics::AnalyticsDispatcher;
use crate::configuration::{AnalyticsSettings, DatabaseSettings, Settings, StoreBackend};
use crate::error::WaitlistResult;
use crate::routes::{health_check, home, signup};
use crate::signup::{SignupService, StoreBootstrap};
use crate::store::{PostgresStore, RemoteStore};
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, dev::Server, web, web::Data, App, HttpServer};
use actix_web_flash_messages::{storage::CookieMessageStore, FlashMessagesFramework};
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> WaitlistResult<Self> {
        let store = build_store(&configuration)?;
        let analytics = build_analytics(&configuration.analytics)?;
        let bootstrap = StoreBootstrap::start(store.clone());
        let service = SignupService::new(
            store,
            analytics,
            bootstrap,
            configuration.store.table.clone(),
        );

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        // Retrieve the port assigned to us by the OS
        let port = listener
            .local_addr()
            .context("Failed to read the bound address")?
            .port();
        let server = run(
            listener,
            service,
            ApplicationPathPrefix(configuration.application.path_prefix),
            ApplicationAssetsUrl(configuration.application.assets_url),
            configuration.application.base_url.starts_with("https://"),
            configuration.application.hmac_secret,
        )?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Only returns when the application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}

/// Pick the remote store implementation named in the configuration.
pub fn build_store(configuration: &Settings) -> WaitlistResult<Arc<dyn RemoteStore>> {
    match configuration.store.backend {
        StoreBackend::Postgres => {
            let pool = get_connection_pool(&configuration.database);
            Ok(Arc::new(PostgresStore::new(pool)))
        }
        StoreBackend::Rest => {
            let rest = configuration
                .store
                .rest
                .as_ref()
                .context("`store.rest` settings are required for the rest backend")?;
            let store = rest.client().context("Failed to build the row store client")?;
            Ok(Arc::new(store))
        }
    }
}

/// Wire up every tracker that has settings. Missing ones stay absent.
pub fn build_analytics(configuration: &AnalyticsSettings) -> WaitlistResult<AnalyticsDispatcher> {
    let timeout = configuration.timeout();
    let mut dispatcher = AnalyticsDispatcher::new(configuration.report_failures);
    if let Some(google) = &configuration.google {
        let client = google
            .client(timeout)
            .context("Failed to build the Google Analytics client")?;
        dispatcher = dispatcher.with_beacon(Arc::new(client));
    }
    if let Some(mixpanel) = &configuration.mixpanel {
        let client = mixpanel
            .client(timeout)
            .context("Failed to build the Mixpanel client")?;
        dispatcher = dispatcher.with_tracker(Arc::new(client));
    }
    if let Some(meta_pixel) = &configuration.meta_pixel {
        let client = meta_pixel
            .client(timeout)
            .context("Failed to build the Meta Pixel client")?;
        dispatcher = dispatcher.with_pixel(Arc::new(client));
    }
    Ok(dispatcher)
}

/// Prefix every route is mounted under.
pub struct ApplicationPathPrefix(pub String);

/// Base URL of the images used on the landing page.
pub struct ApplicationAssetsUrl(pub String);

fn run(
    listener: TcpListener,
    service: SignupService,
    path_prefix: ApplicationPathPrefix,
    assets_url: ApplicationAssetsUrl,
    secure_cookies: bool,
    hmac_secret: Secret<String>,
) -> WaitlistResult<Server> {
    let secret_key = Key::from(hmac_secret.expose_secret().as_bytes());
    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();
    let scope_path = path_prefix.0.trim_end_matches('/').to_string();
    // Wrap shared state in smart pointers
    let service = Data::new(service);
    let path_prefix = Data::new(path_prefix);
    let assets_url = Data::new(assets_url);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .service(
                web::scope(&scope_path)
                    .route("", web::get().to(home))
                    .route("/", web::get().to(home))
                    .route("/signups", web::post().to(signup))
                    .route("/health_check", web::get().to(health_check)),
            )
            .app_data(service.clone())
            .app_data(path_prefix.clone())
            .app_data(assets_url.clone())
    })
    .listen(listener)
    .context("Failed to listen on the bound socket")?
    .run();
    Ok(server)
}
