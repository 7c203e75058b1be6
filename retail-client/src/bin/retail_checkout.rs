//! Terminal driver for the customer checkout flow.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use retail_client::logger::{DEFAULT_KEEP_DAYS, cleanup_old_logs, init_logger};
use retail_client::{
    CheckoutFlow, CheckoutSettings, ClientConfig, FileDraftStore, HttpClient, Order,
    PaymentReturn, Reconciliation, ReturnHandler, Session,
};
use shared::money::format_money;

#[derive(Parser)]
#[command(name = "retail-checkout", version, about = "Place and settle retail orders")]
struct Cli {
    /// Account name
    #[arg(long, env = "RETAIL_USER")]
    user: String,

    /// Account password
    #[arg(long, env = "RETAIL_PASSWORD", hide_env_values = true)]
    password: String,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "RETAIL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Also write daily rotated logs here
    #[arg(long, env = "RETAIL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List branches
    Branches,
    /// List orderable products of a branch
    Products {
        /// Branch id
        #[arg(long)]
        branch: String,
        /// Product name filter
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Review and confirm an order, printing the gateway checkout URL
    Order {
        /// Branch id
        #[arg(long)]
        branch: String,
        /// Product id
        #[arg(long)]
        product: String,
        /// Quantity (clamped to the available stock)
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show the customer's order history
    Orders,
    /// Settle the pending order after the gateway redirect
    Resume {
        /// Full return URL as received from the gateway
        #[arg(long, conflicts_with_all = ["success", "error"])]
        url: Option<String>,
        /// Payment succeeded
        #[arg(long)]
        success: bool,
        /// Payment error reported by the gateway
        #[arg(long)]
        error: Option<String>,
        /// Transaction reference returned by the gateway
        #[arg(long)]
        tx_ref: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logger(&cli.log_level, cli.json_logs, cli.log_dir.as_deref())?;
    if let Some(dir) = &cli.log_dir
        && let Err(e) = cleanup_old_logs(dir, DEFAULT_KEEP_DAYS)
    {
        tracing::warn!(error = %e, "Failed to clean up old logs");
    }

    let config = ClientConfig::from_env()?;
    let http = config.build_http_client()?;
    let session = http
        .login(&cli.user, &cli.password)
        .await
        .context("Login failed")?;
    println!(
        "Logged in as {} ({})",
        session.user().name,
        session.role().landing_path()
    );

    let http = match session.token() {
        Some(token) => http.with_token(token),
        None => http,
    };
    let api = Arc::new(http);
    let store = FileDraftStore::new(&config.draft_dir);

    match cli.command {
        Commands::Branches => list_branches(api, store, session, &config).await,
        Commands::Orders => list_orders(api, store, session, &config).await,
        Commands::Products { branch, search } => {
            list_products(api, store, session, &config, &branch, search).await
        }
        Commands::Order {
            branch,
            product,
            quantity,
        } => place_order(api, store, session, &config, &branch, &product, quantity).await,
        Commands::Resume {
            url,
            success,
            error,
            tx_ref,
        } => {
            let ret = match url {
                Some(url) => PaymentReturn::from_url(&url)?
                    .context("Return URL carries no payment result")?,
                None => match (error, success) {
                    (Some(error), _) => PaymentReturn::Failure { error, tx_ref },
                    (None, true) => PaymentReturn::Success { tx_ref },
                    (None, false) => anyhow::bail!("Pass --success, --error or --url"),
                },
            };
            resume(api, store, session, ret).await
        }
    }
}

type Flow = CheckoutFlow<HttpClient, FileDraftStore>;

fn flow(
    api: Arc<HttpClient>,
    store: FileDraftStore,
    session: Session,
    config: &ClientConfig,
) -> Flow {
    CheckoutFlow::new(api, store, session, CheckoutSettings::from(config))
}

async fn list_branches(
    api: Arc<HttpClient>,
    store: FileDraftStore,
    session: Session,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let mut flow = flow(api, store, session, config);
    for branch in flow.load_branches().await? {
        let manager = if branch.manager_id().is_some() {
            ""
        } else {
            " (no manager)"
        };
        println!("{}\t{}{}", branch.id, branch.label(), manager);
    }
    Ok(())
}

async fn list_orders(
    api: Arc<HttpClient>,
    store: FileDraftStore,
    session: Session,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let mut flow = flow(api, store, session, config);
    let orders = flow.load_orders().await?;
    if orders.is_empty() {
        println!("No orders yet");
    }
    print_orders(orders);
    Ok(())
}

fn print_orders(orders: &[Order]) {
    for order in orders {
        println!(
            "{}\t{}\tx{}\t{}\t{:?}",
            order.id,
            order.product_name,
            order.quantity,
            format_money(order.total_price),
            order.status
        );
    }
}

async fn open_branch(flow: &mut Flow, branch: &str, search: String) -> anyhow::Result<()> {
    flow.load_branches().await?;
    flow.select_branch(branch)?;
    if !search.is_empty() {
        flow.set_search(search)?;
    }
    flow.wait_for_products().await?;
    Ok(())
}

async fn list_products(
    api: Arc<HttpClient>,
    store: FileDraftStore,
    session: Session,
    config: &ClientConfig,
    branch: &str,
    search: String,
) -> anyhow::Result<()> {
    let mut flow = flow(api, store, session, config);
    open_branch(&mut flow, branch, search).await?;

    let products = flow.products();
    if products.is_empty() {
        println!("No products available");
    }
    for p in products {
        println!(
            "{}\t{}\t{}\t{}\t{} left",
            p.id,
            p.name,
            p.category_name,
            format_money(p.sale_price),
            p.quantity
        );
    }
    Ok(())
}

async fn place_order(
    api: Arc<HttpClient>,
    store: FileDraftStore,
    session: Session,
    config: &ClientConfig,
    branch: &str,
    product: &str,
    quantity: i64,
) -> anyhow::Result<()> {
    let mut flow = flow(api, store, session, config);
    open_branch(&mut flow, branch, String::new()).await?;
    flow.select_product(product)?;
    let clamped = flow.set_quantity(quantity);
    if i64::from(clamped) != quantity {
        println!("Quantity adjusted to {clamped}");
    }

    let review = flow.request_order()?;
    println!("Product:  {}", review.product_name);
    println!("Branch:   {}", review.branch_name);
    println!("Quantity: {}", review.quantity);
    println!("Price:    {}", format_money(review.unit_price));
    println!("Total:    {}", format_money(review.total_price));

    let redirect = flow.confirm().await?;
    println!("Transaction: {}", redirect.tx_ref);
    println!("Complete payment at: {}", redirect.checkout_url);
    Ok(())
}

async fn resume(
    api: Arc<HttpClient>,
    store: FileDraftStore,
    session: Session,
    ret: PaymentReturn,
) -> anyhow::Result<()> {
    let handler = ReturnHandler::new(api, store, session);
    let outcome = handler.handle(ret).await?;
    println!("{}", outcome.message.text());
    if outcome.reconciliation == Reconciliation::NotRecorded {
        println!("The order is not in your history yet; check again shortly.");
    }

    if let Some(orders) = outcome.orders {
        print_orders(&orders);
    }
    Ok(())
}
