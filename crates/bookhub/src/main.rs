use anyhow::{bail, Result};
use bookhubapp::api::BookhubApi;
use bookhubapp::checkout::PaymentOutcome;
use bookhubapp::init::initialize;
use bookhubapp::model::{
    BookInput, BookPatch, OrderStatus, RegisterUser, Role, ShippingAddress, UserPatch,
};
use bookhubapp::store::fs_backend::FsBackend;
use bookhubapp::stores::{BookQuery, BookSort};
use clap::Parser;
use colored::*;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;
mod render;
use args::{AdminCommand, BookCommand, CartCommand, CheckoutArgs, Cli, Commands, OrderCommand};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: BookhubApi<FsBackend>,
    currency: String,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let bookhub = initialize(cli.data)?;
    debug!(data_dir = %bookhub.data_dir.display(), "initialized");
    let mut ctx = AppContext {
        api: bookhub.api,
        currency: bookhub.config.currency,
    };

    match cli.command {
        Some(Commands::Login { email, password }) => handle_login(&mut ctx, &email, &password),
        Some(Commands::Register {
            name,
            email,
            password,
        }) => handle_register(&mut ctx, name, email, password),
        Some(Commands::Logout) => handle_logout(&mut ctx),
        Some(Commands::Whoami) => handle_whoami(&ctx),
        Some(Commands::Profile { name, email }) => handle_profile(&mut ctx, name, email),
        Some(Commands::Books {
            search,
            category,
            sort,
        }) => handle_books(&ctx, search, category, &sort),
        Some(Commands::Categories) => handle_categories(&ctx),
        Some(Commands::Book(command)) => handle_book(&mut ctx, command),
        Some(Commands::Cart { action }) => handle_cart(&mut ctx, action),
        Some(Commands::Checkout(args)) => handle_checkout(&mut ctx, args),
        Some(Commands::Orders) => handle_orders(&ctx),
        Some(Commands::Order(command)) => handle_order(&mut ctx, command),
        Some(Commands::Admin(command)) => handle_admin(&mut ctx, command),
        None => handle_books(&ctx, None, None, "newest"),
    }
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("bookhub=debug,bookhubapp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_login(ctx: &mut AppContext, email: &str, password: &str) -> Result<()> {
    let role = ctx.api.login(email, password)?;
    render::success(&format!("Logged in as {} ({}).", email, role));
    Ok(())
}

fn handle_register(
    ctx: &mut AppContext,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let user = ctx.api.register(RegisterUser {
        name,
        email,
        password,
    })?;
    render::success(&format!("Welcome, {}! You are logged in.", user.name));
    Ok(())
}

fn handle_logout(ctx: &mut AppContext) -> Result<()> {
    ctx.api.logout()?;
    render::success("Logged out.");
    Ok(())
}

fn handle_whoami(ctx: &AppContext) -> Result<()> {
    match ctx.api.current_user() {
        Some(user) => render::print_user(user),
        None => println!("Not logged in."),
    }
    Ok(())
}

fn handle_profile(ctx: &mut AppContext, name: Option<String>, email: Option<String>) -> Result<()> {
    if name.is_none() && email.is_none() {
        bail!("Nothing to change. Pass --name and/or --email.");
    }
    let user = ctx.api.update_user(&UserPatch { name, email })?;
    render::success("Profile updated.");
    render::print_user(&user);
    Ok(())
}

fn handle_books(
    ctx: &AppContext,
    search: Option<String>,
    category: Option<String>,
    sort: &str,
) -> Result<()> {
    let query = BookQuery {
        search,
        category,
        sort: sort.parse::<BookSort>()?,
    };
    let books = ctx.api.browse(&query);
    render::print_books(&books, &ctx.currency);
    Ok(())
}

fn handle_categories(ctx: &AppContext) -> Result<()> {
    for category in ctx.api.categories() {
        println!("{}", category);
    }
    Ok(())
}

fn handle_book(ctx: &mut AppContext, command: BookCommand) -> Result<()> {
    match command {
        BookCommand::Show { id } => {
            render::print_book(ctx.api.get_book(&id)?, &ctx.currency);
        }
        BookCommand::Add {
            title,
            author,
            category,
            price,
            rating,
            bestseller,
            cover_image,
            description,
        } => {
            let book = ctx.api.add_book(BookInput {
                title,
                author,
                category,
                price,
                rating,
                bestseller,
                cover_image,
                description,
            })?;
            render::success(&format!("Added \"{}\" ({}).", book.title, book.id));
        }
        BookCommand::Update {
            id,
            title,
            author,
            category,
            price,
            rating,
            bestseller,
            cover_image,
            description,
        } => {
            let patch = BookPatch {
                title,
                author,
                category,
                price,
                rating,
                bestseller,
                cover_image,
                description,
            };
            ctx.api.update_book(&id, &patch)?;
            render::success(&format!("Updated book {}.", id));
        }
        BookCommand::Delete { id } => {
            ctx.api.delete_book(&id)?;
            render::success(&format!("Deleted book {}.", id));
        }
    }
    Ok(())
}

fn handle_cart(ctx: &mut AppContext, action: Option<CartCommand>) -> Result<()> {
    match action.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {}
        CartCommand::Add { book_id, quantity } => {
            ctx.api.add_to_cart(&book_id, quantity)?;
            render::success(&format!("Added {} to the cart.", book_id));
        }
        CartCommand::Set { item_id, quantity } => {
            ctx.api.update_cart_quantity(&item_id, quantity)?;
        }
        CartCommand::Remove { item_id } => {
            ctx.api.remove_from_cart(&item_id)?;
        }
        CartCommand::Clear => {
            ctx.api.clear_cart()?;
        }
    }
    render::print_cart(ctx.api.cart_items(), &ctx.api.cart_pricing()?, &ctx.currency);
    Ok(())
}

fn handle_checkout(ctx: &mut AppContext, args: CheckoutArgs) -> Result<()> {
    let address = ShippingAddress {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        city: args.city,
        state: args.state,
        pincode: args.pincode,
    };

    let request = ctx.api.begin_checkout(&address)?;
    render::print_payment_request(&request);

    let outcome = match (args.payment_ref, args.fail) {
        (Some(payment_reference), _) => PaymentOutcome::Succeeded { payment_reference },
        (None, Some(reason)) => PaymentOutcome::Failed { reason },
        (None, None) => {
            render::info("Re-run with --payment-ref <REF> once the gateway confirms payment.");
            return Ok(());
        }
    };

    let order = ctx.api.complete_checkout(&address, outcome)?;
    render::success(&format!("Order {} placed.", order.id));
    if let Some(eta) = order.estimated_delivery {
        render::info(&format!("Estimated delivery: {}", eta.format("%Y-%m-%d")));
    }
    Ok(())
}

fn handle_orders(ctx: &AppContext) -> Result<()> {
    let orders = ctx.api.my_orders()?;
    render::print_orders(&orders, &ctx.currency);
    Ok(())
}

fn handle_order(ctx: &mut AppContext, command: OrderCommand) -> Result<()> {
    match command {
        OrderCommand::Show { id } => {
            render::print_order(ctx.api.get_order(&id)?, &ctx.currency);
        }
        OrderCommand::Cancel { id } => {
            ctx.api.cancel_my_order(&id)?;
            render::success(&format!("Order {} cancelled.", id));
        }
    }
    Ok(())
}

fn handle_admin(ctx: &mut AppContext, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Orders { search } => {
            let orders = ctx.api.all_orders(&search)?;
            render::print_orders(&orders, &ctx.currency);
        }
        AdminCommand::Status { id, status } => {
            let status: OrderStatus = status.parse()?;
            ctx.api.update_order_status(&id, status)?;
            render::success(&format!("Order {} is now {}.", id, status));
        }
        AdminCommand::Advance { id } => {
            let status = ctx.api.advance_order(&id)?;
            render::success(&format!("Order {} is now {}.", id, status));
        }
        AdminCommand::Users => {
            render::print_users(ctx.api.registered_users()?);
        }
        AdminCommand::Role { user_id, role } => {
            let role: Role = role.parse()?;
            ctx.api.set_role(&user_id, role)?;
            render::success(&format!("User {} is now {}.", user_id, role));
        }
    }
    Ok(())
}
