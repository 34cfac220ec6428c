//! Atelier CLI - drive the storefront client core from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Who is signed in?
//! atelier session show
//!
//! # Sign up, then browse and shop
//! atelier register -n "Nia" -e nia@example.com -p hunter22 -c hunter22
//! atelier products list --sort price_low --limit 10
//! atelier cart add --product p1 --size M --color black --store s1 --price 49.5
//! atelier orders place --street "Durbar Marg 1" --city Kathmandu \
//!     --state Bagmati --zip 44600 --payment cod
//!
//! # What would the app render for this path?
//! atelier route /admin/dashboard
//!
//! # Ask the style assistant
//! atelier chat "What goes with a linen kurta?"
//! ```
//!
//! # Commands
//!
//! - `session` - Show or clear the persisted session
//! - `register`, `login`, `logout` - Account access
//! - `route` - Evaluate the access gate for a path
//! - `products` - Browse the catalog
//! - `cart` - Inspect and change the cart
//! - `orders` - Check out and review orders
//! - `chat`, `suggest` - Style assistant

#![cfg_attr(not(test), forbid(unsafe_code))]

use atelier_client::ClientConfig;
use atelier_core::{
    CartLineId, Email, NewCartItem, NewOrder, OrderId, PaymentMethod, ProductId, ProductSort,
    ShippingAddress, StoreId, UserRole,
};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or clear the persisted session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email
        #[arg(short, long)]
        email: Email,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Password again
        #[arg(short, long)]
        confirm: String,

        /// Account role (`consumer`, `store`, `admin`)
        #[arg(short, long, default_value = "consumer")]
        role: UserRole,
    },
    /// Sign in
    Login {
        #[command(subcommand)]
        provider: LoginProvider,
    },
    /// Sign out and forget local state
    Logout,
    /// Evaluate the access gate for a path
    Route {
        /// Path to evaluate, e.g. `/cart?step=2`
        path: String,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out and review orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Send one message to the style assistant
    Chat {
        /// Message text
        message: String,
    },
    /// Ask the style assistant for outfit suggestions
    Suggest {
        /// Occasion, e.g. `wedding`
        #[arg(short, long)]
        occasion: String,

        /// Style, e.g. `traditional`
        #[arg(short, long)]
        style: String,

        /// Budget
        #[arg(short, long)]
        budget: Decimal,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Print the signed-in user
    Show,
    /// Remove the persisted session
    Clear,
}

#[derive(Subcommand)]
enum LoginProvider {
    /// Sign in with a Google OAuth access token
    Google {
        /// Access token from Google
        #[arg(short, long)]
        token: String,

        /// Role for a newly created account
        #[arg(short, long)]
        role: Option<UserRole>,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Sort order (`newest`, `price_low`, `price_high`)
        #[arg(long)]
        sort: Option<ProductSort>,

        /// Search term
        #[arg(long)]
        search: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart
    Show,
    /// Add a line
    Add {
        #[arg(long)]
        product: ProductId,

        #[arg(long)]
        size: String,

        #[arg(long)]
        color: String,

        /// Store selling the product
        #[arg(long)]
        store: StoreId,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity
    Update {
        /// Line ID
        id: CartLineId,

        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Line ID
        id: CartLineId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List past orders
    List,
    /// Show one order
    Show {
        /// Order ID
        id: OrderId,
    },
    /// Place an order for the current cart
    Place {
        #[arg(long)]
        street: String,

        #[arg(long)]
        city: String,

        /// State or province
        #[arg(long)]
        state: String,

        /// Postal code
        #[arg(long)]
        zip: String,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,

        /// Payment method (`esewa`, `cod`)
        #[arg(long, default_value = "cod")]
        payment: PaymentMethod,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // --help and usage errors exit here, before any configuration is read
    let cli = Cli::parse();

    // Loaded before the subscriber so RUST_LOG can come from .env
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atelier_client=info,atelier_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let _sentry = init_sentry(&config);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CliError> {
    let ctx = commands::Context::new(config)?;

    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Show => commands::session::show(&ctx),
            SessionAction::Clear => commands::session::clear(&ctx),
        },
        Commands::Register {
            name,
            email,
            password,
            confirm,
            role,
        } => commands::auth::register(&ctx, name, email, password, confirm, role).await,
        Commands::Login { provider } => match provider {
            LoginProvider::Google { token, role } => {
                commands::auth::login_google(&ctx, token, role).await
            }
        },
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Route { path } => {
            commands::route::evaluate(&ctx, &path);
            Ok(())
        }
        Commands::Products { action } => match action {
            ProductsAction::List {
                sort,
                search,
                page,
                limit,
            } => commands::catalog::list(&ctx, sort, search, page, limit).await,
            ProductsAction::Show { id } => commands::catalog::show(&ctx, &id).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add {
                product,
                size,
                color,
                store,
                price,
                quantity,
            } => {
                let item = NewCartItem {
                    product_id: product,
                    quantity,
                    size,
                    color,
                    store_id: store,
                    unit_price: price,
                };
                commands::cart::add(&ctx, item).await
            }
            CartAction::Update { id, quantity } => commands::cart::update(&ctx, &id, quantity).await,
            CartAction::Remove { id } => commands::cart::remove(&ctx, &id).await,
            CartAction::Clear => commands::cart::clear(&ctx).await,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&ctx).await,
            OrdersAction::Show { id } => commands::orders::show(&ctx, &id).await,
            OrdersAction::Place {
                street,
                city,
                state,
                zip,
                phone,
                payment,
            } => {
                let order = NewOrder {
                    shipping_address: ShippingAddress {
                        street,
                        city,
                        state,
                        zip_code: zip,
                        phone,
                    },
                    payment_method: payment,
                };
                commands::orders::place(&ctx, order).await
            }
        },
        Commands::Chat { message } => commands::assistant::chat(&ctx, &message).await,
        Commands::Suggest {
            occasion,
            style,
            budget,
        } => commands::assistant::suggest(&ctx, occasion, style, budget).await,
    }
}
