//! Builders for HTTP state ports.
//!
//! Repositories are Diesel-backed when a database URL is configured and
//! in-memory otherwise; both variants feed the same generic assembly so the
//! services never know which storage they run on.

use std::path::PathBuf;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use zeroize::Zeroizing;

use masters_backend::domain::ports::{
    MasterProfileRepository, OrderRepository, PasswordHasher, PaymentProcessor, PaymentsCommand,
    UserRepository,
};
use masters_backend::domain::{
    AuthenticationService, Email, Error, MasterProfileService, OrderService, Password,
    PasswordPolicyError, PaymentService, PaymentsConfig, Role, UserDirectoryService, UserDraft,
    UserName, UserValidationError,
};
use masters_backend::inbound::http::state::{HttpState, HttpStatePorts, SessionSettings};
use masters_backend::outbound::memory::{
    InMemoryMasterProfileRepository, InMemoryOrderRepository, InMemoryUserRepository,
};
use masters_backend::outbound::payments::{FixturePaymentProcessor, StripePaymentProcessor};
use masters_backend::outbound::persistence::{
    DbPool, DieselMasterProfileRepository, DieselOrderRepository, DieselUserRepository,
    MigrationError, PoolConfig, PoolError, run_pending_migrations,
};
use masters_backend::outbound::security::BcryptPasswordHasher;

use super::config::{AdminBootstrap, AppSettings, ConfigError};

/// Failure while assembling application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to build payment processor client: {0}")]
    Processor(#[from] reqwest::Error),
    #[error("no payment processor secret key configured")]
    MissingProcessorKey,
    #[error("failed to read admin password file {path}: {source}")]
    AdminPasswordFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bootstrap admin password rejected: {0}")]
    AdminPassword(#[from] PasswordPolicyError),
    #[error("invalid bootstrap admin: {0}")]
    AdminIdentity(#[from] UserValidationError),
    #[error("failed to create bootstrap admin: {0}")]
    AdminAccount(Error),
}

/// Storage adapters shared by every service.
pub(crate) struct Repositories<U, M, O> {
    pub(crate) users: Arc<U>,
    pub(crate) profiles: Arc<M>,
    pub(crate) orders: Arc<O>,
}

impl Repositories<InMemoryUserRepository, InMemoryMasterProfileRepository, InMemoryOrderRepository> {
    pub(crate) fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            profiles: Arc::new(InMemoryMasterProfileRepository::new()),
            orders: Arc::new(InMemoryOrderRepository::new()),
        }
    }
}

impl Repositories<DieselUserRepository, DieselMasterProfileRepository, DieselOrderRepository> {
    pub(crate) fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            profiles: Arc::new(DieselMasterProfileRepository::new(pool.clone())),
            orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        }
    }
}

/// Build the handler state described by `settings`.
pub async fn build_http_state(settings: &AppSettings) -> Result<HttpState, StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match settings.database_url.as_deref() {
        Some(url) => {
            run_pending_migrations(url).await?;
            let mut pool_config = PoolConfig::new(url);
            if let Some(max) = settings.db_max_connections {
                pool_config = pool_config.with_max_size(max);
            }
            let pool = DbPool::new(pool_config).await?;
            info!("using PostgreSQL storage");
            assemble(Repositories::diesel(&pool), settings, clock).await
        }
        None => {
            warn!("no database configured; data is kept in memory and lost on restart");
            assemble(Repositories::in_memory(), settings, clock).await
        }
    }
}

pub(crate) async fn assemble<U, M, O>(
    repos: Repositories<U, M, O>,
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, StartupError>
where
    U: UserRepository + 'static,
    M: MasterProfileRepository + 'static,
    O: OrderRepository + 'static,
{
    let Repositories {
        users,
        profiles,
        orders,
    } = repos;
    let hasher = Arc::new(
        settings
            .bcrypt_cost
            .map_or_else(BcryptPasswordHasher::default, BcryptPasswordHasher::with_cost),
    );

    let auth = Arc::new(AuthenticationService::new(
        users.clone(),
        profiles.clone(),
        hasher.clone(),
        clock.clone(),
    ));
    if let Some(admin) = settings.admin_bootstrap()? {
        bootstrap_admin(auth.as_ref(), &admin).await?;
    }
    let directory = Arc::new(UserDirectoryService::new(
        users.clone(),
        profiles.clone(),
        hasher,
        clock.clone(),
    ));
    let masters = Arc::new(MasterProfileService::new(users, profiles));
    let order_service = Arc::new(OrderService::new(
        orders.clone(),
        settings.currency()?,
        clock.clone(),
    ));
    let payments = build_payments(orders, settings, clock.clone())?;

    let ports = HttpStatePorts {
        login: auth.clone(),
        registration: auth,
        users: directory.clone(),
        users_command: directory,
        master_profiles: masters.clone(),
        master_profiles_command: masters,
        orders: order_service.clone(),
        orders_query: order_service,
        payments,
    };
    let session = SessionSettings {
        destinations: settings.destinations()?,
        ttl: settings.session_ttl()?,
        clock,
    };
    Ok(HttpState::new(ports, session))
}

async fn bootstrap_admin<U, M, H>(
    auth: &AuthenticationService<U, M, H>,
    admin: &AdminBootstrap,
) -> Result<(), StartupError>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    let raw = Zeroizing::new(
        tokio::fs::read_to_string(&admin.password_file)
            .await
            .map_err(|source| StartupError::AdminPasswordFile {
                path: admin.password_file.clone(),
                source,
            })?,
    );
    let password = Password::new(raw.trim())?;
    let draft = UserDraft {
        name: UserName::new(&admin.name)?,
        email: Email::new(&admin.email)?,
        role: Role::Admin,
    };
    auth.ensure_admin(draft, &password)
        .await
        .map_err(StartupError::AdminAccount)?;
    Ok(())
}

fn build_payments<O>(
    orders: Arc<O>,
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn PaymentsCommand>, StartupError>
where
    O: OrderRepository + 'static,
{
    let config = settings.payments_config()?;
    let secret = settings
        .stripe_secret_key
        .as_deref()
        .filter(|key| !key.trim().is_empty());
    match secret {
        Some(secret) => {
            let processor = StripePaymentProcessor::new(
                settings.stripe_api_base()?,
                secret,
                settings.stripe_timeout(),
            )?;
            Ok(payment_service(orders, processor, config, clock))
        }
        None if cfg!(debug_assertions) => {
            warn!("no payment processor key configured; using the in-memory fixture processor");
            Ok(payment_service(
                orders,
                FixturePaymentProcessor::auto_succeed(),
                config,
                clock,
            ))
        }
        None => Err(StartupError::MissingProcessorKey),
    }
}

fn payment_service<O, P>(
    orders: Arc<O>,
    processor: P,
    config: PaymentsConfig,
    clock: Arc<dyn Clock>,
) -> Arc<dyn PaymentsCommand>
where
    O: OrderRepository + 'static,
    P: PaymentProcessor + 'static,
{
    Arc::new(PaymentService::new(
        orders,
        Arc::new(processor),
        config,
        clock,
    ))
}
