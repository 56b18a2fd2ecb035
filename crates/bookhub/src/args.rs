use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookhub", version)]
#[command(about = "Browse books, fill a cart and track orders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $BOOKHUB_DATA, then the OS data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login { email: String, password: String },

    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Change the logged-in user's name or email
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// List books in the catalog
    #[command(alias = "ls")]
    Books {
        /// Match title or author
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category ("All" for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// newest, price-low, price-high, rating or bestseller
        #[arg(long, default_value = "newest")]
        sort: String,
    },

    /// List catalog categories
    Categories,

    /// Show or edit a single book
    #[command(subcommand)]
    Book(BookCommand),

    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartCommand>,
    },

    /// Pay for the cart and place an order
    Checkout(CheckoutArgs),

    /// List your orders, newest first
    Orders,

    /// Track or cancel one of your orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Administrative commands
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum BookCommand {
    /// Show a book's details
    Show { id: String },

    /// Add a book to the catalog (admin)
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0.0)]
        rating: f32,
        #[arg(long)]
        bestseller: bool,
        #[arg(long, default_value = "")]
        cover_image: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Change fields of a book (admin)
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        rating: Option<f32>,
        #[arg(long)]
        bestseller: Option<bool>,
        #[arg(long)]
        cover_image: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a book from the catalog (admin)
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Show the cart with tax and total
    Show,

    /// Add copies of a book
    Add {
        book_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Set the quantity of a line (zero or less removes it)
    Set {
        item_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line
    #[command(alias = "rm")]
    Remove { item_id: String },

    /// Empty the cart
    Clear,
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub pincode: String,

    /// Reference of the successful payment reported by the gateway
    #[arg(long, value_name = "REF")]
    pub payment_ref: Option<String>,

    /// Report a failed payment with this reason
    #[arg(long, value_name = "REASON", conflicts_with = "payment_ref")]
    pub fail: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Show an order with its tracking timeline
    Show { id: String },

    /// Cancel a pending order
    Cancel { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List every order, newest first
    Orders {
        /// Match part of the order id
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Set an order's status (pending, shipped, delivered, cancelled)
    Status { id: String, status: String },

    /// Move an order to its next fulfilment step
    Advance { id: String },

    /// List registered users
    Users,

    /// Assign a role (user or admin) to a registered user
    Role { user_id: String, role: String },
}
