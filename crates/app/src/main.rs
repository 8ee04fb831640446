//! Command-line front end for the cart.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use shopcart_app::{AppConfig, AppContext};
use shopcart_cart::{AddOutcome, CartTotal, UpdateOutcome};
use shopcart_catalog::Catalog;
use shopcart_core::{CartLineItem, Entity, ProductCandidate, ProductId, Quantity, format_price};

#[derive(Parser, Debug)]
#[command(author, version, about = "shopcart: on-device shopping cart", long_about = None)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products offered by the API with their cart quantities.
    Catalog,
    /// Show the cart and its total.
    Cart,
    /// Add a catalog product to the cart.
    Add {
        id: String,
        /// Units to start with (default one).
        #[arg(short, long)]
        quantity: Option<u32>,
    },
    /// One more unit of a product.
    Inc { id: String },
    /// One unit less of a product; removes it at one unit.
    Dec { id: String },
    /// Set the quantity of a product; zero removes it.
    Set { id: String, quantity: u32 },
    /// Remove products from the cart.
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Empty the cart.
    Clear,
    /// Complete the order and empty the cart.
    Checkout,
}

#[derive(Serialize)]
struct CartView<'a> {
    items: &'a [CartLineItem],
    total: CartTotal,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    shopcart_observability::init_with(&config.log);

    let ctx = AppContext::build(&config).context("failed to start")?;
    let events = ctx.cart.subscribe_events();

    run(&cli, &ctx)?;

    for envelope in events.drain() {
        tracing::info!(
            sequence = envelope.sequence_number(),
            event = ?envelope.payload(),
            "cart event"
        );
    }
    Ok(())
}

fn run(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let cart = &ctx.cart;

    match &cli.command {
        Command::Catalog => {
            let catalog = load_catalog(ctx)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&catalog_json(&catalog))?);
            } else {
                print_candidates("Products", &catalog.products);
                print_candidates("Suggested", &catalog.suggested);
            }
        }
        Command::Cart => print_cart(cli, ctx)?,
        Command::Add { id, quantity } => {
            let id = parse_id(id)?;
            let catalog = load_catalog(ctx)?;
            let Some(candidate) = catalog.find(&id).cloned() else {
                bail!("product '{id}' is not in the catalog");
            };
            let candidate = candidate.with_quantity(Quantity::new(quantity.unwrap_or(0)));
            match cart.add(candidate)? {
                AddOutcome::Added(q) => println!("added {id} ×{q}"),
                AddOutcome::AlreadyInCart(q) => println!("{id} is already in the cart ×{q}"),
            }
            print_cart(cli, ctx)?;
        }
        Command::Inc { id } => {
            let id = parse_id(id)?;
            report_update(&id, cart.increment(&id)?);
            print_cart(cli, ctx)?;
        }
        Command::Dec { id } => {
            let id = parse_id(id)?;
            report_update(&id, cart.decrement(&id)?);
            print_cart(cli, ctx)?;
        }
        Command::Set { id, quantity } => {
            let id = parse_id(id)?;
            report_update(&id, cart.update_quantity(&id, Quantity::new(*quantity))?);
            print_cart(cli, ctx)?;
        }
        Command::Remove { ids } => {
            let ids = ids.iter().map(|id| parse_id(id)).collect::<anyhow::Result<Vec<_>>>()?;
            let report = cart.delete_many(ids);
            println!(
                "removed {}, not in cart {}, failed {}",
                report.deleted.len(),
                report.missing.len(),
                report.failed.len()
            );
            for (id, err) in &report.failed {
                eprintln!("could not remove {id}: {err}");
            }
            print_cart(cli, ctx)?;
        }
        Command::Clear => {
            let report = cart.clear()?;
            println!("removed {} line items", report.deleted.len());
        }
        Command::Checkout => {
            if cart.total().get().is_empty() {
                bail!("the cart is empty");
            }
            println!("placing order…");
            let receipt = ctx.checkout.complete(&**cart)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&CartView {
                        items: &receipt.items,
                        total: CartTotal::from_items(&receipt.items)?,
                    })?
                );
            } else {
                println!("order placed: {}", format_price(receipt.total));
            }
            if !receipt.report.is_complete() {
                bail!(
                    "{} line items could not be removed from the cart",
                    receipt.report.failed.len()
                );
            }
        }
    }
    Ok(())
}

fn parse_id(raw: &str) -> anyhow::Result<ProductId> {
    ProductId::new(raw).with_context(|| format!("invalid product id '{raw}'"))
}

/// Catalog fetches run on their own runtime; the cart store keeps its own.
fn load_catalog(ctx: &AppContext) -> anyhow::Result<Catalog> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start network runtime")?;
    let mut catalog = runtime.block_on(Catalog::load(ctx.products.as_ref()));

    for (list, err) in &catalog.failures {
        tracing::warn!(?list, error = %err, "product list unavailable");
    }
    if catalog.products.is_empty() && catalog.suggested.is_empty() && !catalog.is_complete() {
        bail!("no product list could be loaded");
    }

    catalog.apply_cart_quantities(|id| match ctx.cart.quantity(id) {
        Ok(quantity) => quantity,
        Err(err) => {
            tracing::warn!(product_id = %id, error = %err, "cart quantity unavailable");
            None
        }
    });
    Ok(catalog)
}

fn catalog_json(catalog: &Catalog) -> serde_json::Value {
    serde_json::json!({
        "products": catalog.products,
        "suggested": catalog.suggested,
    })
}

fn print_candidates(title: &str, candidates: &[ProductCandidate]) {
    println!("{title}:");
    for candidate in candidates {
        let in_cart = if candidate.quantity.is_zero() {
            String::new()
        } else {
            format!("  [in cart ×{}]", candidate.quantity)
        };
        println!(
            "  {:<28} {:<32} {:>10}{}",
            candidate.id,
            candidate.name,
            format_price(candidate.unit_price.amount()),
            in_cart
        );
    }
}

fn print_cart(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let items = ctx.cart.items().get();
    let total = ctx.cart.total().get();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&CartView { items: &items, total })?);
        return Ok(());
    }

    if items.is_empty() {
        println!("cart is empty");
    }
    for item in &items {
        println!(
            "  {:<28} {:<32} ×{:<4} {:>10}",
            item.id(),
            item.name(),
            item.quantity(),
            item.line_total().map_or_else(|_| "overflow".to_owned(), format_price)
        );
    }
    let stale = if total.stale { " (may be out of date)" } else { "" };
    println!("total: {}{stale}", total.display());
    Ok(())
}

fn report_update(id: &ProductId, outcome: UpdateOutcome) {
    match outcome {
        UpdateOutcome::Updated { from, to } => println!("{id}: {from} → {to}"),
        UpdateOutcome::Removed => println!("{id}: removed"),
        UpdateOutcome::NotFound => println!("{id} is not in the cart"),
    }
}
