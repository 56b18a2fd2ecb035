//! Terminal output. Everything that knows about colors and column widths
//! lives here; handlers in `main.rs` only pick what to print.

use bookhubapp::checkout::{PaymentRequest, PricingSummary};
use bookhubapp::model::{Book, CartItem, Order, OrderStatus, User, UserRecord};
use chrono::{DateTime, Utc};
use colored::*;
use rust_decimal::Decimal;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const PRICE_WIDTH: usize = 14;

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn info(message: &str) {
    println!("{}", message.dimmed());
}

pub fn money(amount: Decimal, currency: &str) -> String {
    format!("{} {:.2}", currency, amount)
}

fn line_money(item: &CartItem, currency: &str) -> String {
    match item.line_total() {
        Some(total) => money(total, currency),
        None => format!("{} (too large)", currency),
    }
}

pub fn print_user(user: &User) {
    println!("{} <{}>", user.name.bold(), user.email);
    println!("  id:   {}", user.id);
    println!("  role: {}", role_label(user));
}

fn role_label(user: &User) -> ColoredString {
    if user.is_admin() {
        user.role.to_string().yellow()
    } else {
        user.role.to_string().normal()
    }
}

pub fn print_users(records: &[UserRecord]) {
    if records.is_empty() {
        println!("No registered users.");
        return;
    }
    for record in records {
        let user = &record.user;
        println!(
            "{}  {}  {} {}",
            user.id.dimmed(),
            role_label(user),
            user.name,
            format!("<{}>", user.email).dimmed()
        );
    }
}

pub fn print_books(books: &[&Book], currency: &str) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }
    for book in books {
        let marker = if book.bestseller { "★ " } else { "  " };
        let price = format!(
            "{:>width$}",
            money(book.price, currency),
            width = PRICE_WIDTH
        );
        let rating = format!("{:>4.1}", book.rating);

        let fixed = marker.width() + PRICE_WIDTH + rating.width() + 2;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let label = format!("{} by {} ({})", book.title, book.author, book.category);
        let label = pad_to_width(&truncate_to_width(&label, available), available);

        println!("{}{}{}  {}", marker.yellow(), label, price, rating.dimmed());
        println!("  {}", book.id.dimmed());
    }
}

pub fn print_book(book: &Book, currency: &str) {
    println!("{}", book.title.bold());
    println!("  by {}", book.author);
    println!("  id:       {}", book.id);
    println!("  category: {}", book.category);
    println!("  price:    {}", money(book.price, currency));
    println!("  rating:   {:.1}", book.rating);
    if book.bestseller {
        println!("  {}", "bestseller".yellow());
    }
    if let Some(description) = &book.description {
        println!();
        println!("  {}", description);
    }
}

pub fn print_cart(items: &[CartItem], pricing: &PricingSummary, currency: &str) {
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in items {
        let line = format!(
            "{} x {}",
            item.quantity,
            truncate_to_width(&item.book.title, 50)
        );
        println!(
            "{}{:>width$}",
            pad_to_width(&line, 68),
            line_money(item, currency),
            width = PRICE_WIDTH
        );
        println!("  {}", item.id().dimmed());
    }
    println!();
    print_pricing(pricing, currency);
}

pub fn print_pricing(pricing: &PricingSummary, currency: &str) {
    let rows = [
        ("Subtotal", pricing.subtotal),
        ("Tax", pricing.tax),
        ("Total", pricing.total),
    ];
    for (label, amount) in rows {
        let line = format!(
            "{:>68}{:>width$}",
            label,
            money(amount, currency),
            width = PRICE_WIDTH
        );
        if label == "Total" {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

pub fn print_payment_request(request: &PaymentRequest) {
    print_pricing(&request.pricing, &request.currency);
    println!();
    info(&format!(
        "Payment request: {} minor units ({}) for {} <{}>",
        request.amount_minor_units, request.currency, request.payer.name, request.payer.email
    ));
}

pub fn print_orders(orders: &[&Order], currency: &str) {
    if orders.is_empty() {
        println!("No orders found.");
        return;
    }
    for order in orders {
        let items = format!("{} item(s)", order.item_count());
        println!(
            "{}  {}  {:<12}{:>width$}  {}",
            order.id,
            status_label(order.status),
            items,
            money(order.total_amount, currency),
            format_time_ago(order.created_at).dimmed(),
            width = PRICE_WIDTH
        );
    }
}

pub fn print_order(order: &Order, currency: &str) {
    println!("Order {}", order.id.bold());
    println!("  placed:  {}", order.created_at.format("%Y-%m-%d %H:%M"));
    println!("  status:  {}", status_label(order.status));
    if let Some(eta) = order.estimated_delivery {
        if order.status != OrderStatus::Cancelled {
            println!("  arrives: {}", eta.format("%Y-%m-%d"));
        }
    }
    println!("  payment: {}", order.payment_id);
    println!();
    println!("  {}", timeline(order.status));
    println!();
    for item in &order.items {
        println!(
            "  {} x {}{:>width$}",
            item.quantity,
            pad_to_width(&truncate_to_width(&item.book.title, 50), 52),
            line_money(item, currency),
            width = PRICE_WIDTH
        );
    }
    let total = format!(
        "  {:>56}{:>width$}",
        "Total",
        money(order.total_amount, currency),
        width = PRICE_WIDTH
    );
    println!("{}", total.bold());

    let to = &order.shipping_address;
    println!();
    println!("  Ship to {}, {}", to.name, to.phone);
    println!("  {}, {}, {} {}", to.address, to.city, to.state, to.pincode);
}

fn timeline(status: OrderStatus) -> String {
    if status == OrderStatus::Cancelled {
        return "✗ cancelled".red().to_string();
    }
    OrderStatus::TIMELINE
        .iter()
        .zip(status.progress())
        .map(|(step, reached)| {
            if reached {
                format!("● {}", step).green().to_string()
            } else {
                format!("○ {}", step).dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ── ")
}

fn status_label(status: OrderStatus) -> ColoredString {
    let label = format!("{:<10}", status.to_string());
    match status {
        OrderStatus::Pending => label.yellow(),
        OrderStatus::Shipped => label.cyan(),
        OrderStatus::Delivered => label.green(),
        OrderStatus::Cancelled => label.red(),
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
