//! # Data Model
//!
//! Records are persisted as JSON with camelCase keys so the stored slices keep
//! the same shape as the storefront's browser local storage.
//!
//! - [`User`] is the session-visible projection. The credential only ever lives
//!   in [`UserRecord`], the registration entry.
//! - [`Book`] is a catalog entry. [`CartItem`] flattens a book and adds a
//!   quantity, so a cart line carries the book's public fields.
//! - [`Order`] holds an owned copy of the cart lines taken at checkout.
//!   `total_amount` is fixed at creation and never recomputed from `items`.
//!
//! Money is [`Decimal`] and is serialized as a string to avoid float drift.

use crate::error::{BookhubError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fresh record id. UUID v7 keeps ids ordered by creation time.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = BookhubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(BookhubError::Validation(format!("invalid role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Demo accounts are built in and carry no creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A registered account as stored under the `users` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub price: Decimal,
    pub rating: f32,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when an administrator adds a book. Id and creation time
/// are assigned by the catalog.
#[derive(Debug, Clone, Default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub category: String,
    pub price: Decimal,
    pub rating: f32,
    pub bestseller: bool,
    pub cover_image: String,
    pub description: Option<String>,
}

impl BookInput {
    pub fn into_book(self, id: String, created_at: DateTime<Utc>) -> Result<Book> {
        check_price(self.price)?;
        check_rating(self.rating)?;
        Ok(Book {
            id,
            title: self.title,
            author: self.author,
            category: self.category,
            price: self.price,
            rating: self.rating,
            bestseller: self.bestseller,
            cover_image: self.cover_image,
            description: self.description,
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub rating: Option<f32>,
    pub bestseller: Option<bool>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
}

impl BookPatch {
    pub fn apply(&self, book: &mut Book) -> Result<()> {
        // Validate everything before touching the book.
        self.price.map(check_price).transpose()?;
        self.rating.map(check_rating).transpose()?;

        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(category) = &self.category {
            book.category = category.clone();
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
        if let Some(bestseller) = self.bestseller {
            book.bestseller = bestseller;
        }
        if let Some(cover_image) = &self.cover_image {
            book.cover_image = cover_image.clone();
        }
        if let Some(description) = &self.description {
            book.description = Some(description.clone());
        }
        Ok(())
    }
}

fn check_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(BookhubError::Validation(format!(
            "price must not be negative: {price}"
        )));
    }
    Ok(())
}

/// Highest rating a book can carry.
pub const MAX_RATING: f32 = 5.0;

/// JSON has no NaN or infinity, so those would persist as `null` and fail to
/// load again.
fn check_rating(rating: f32) -> Result<()> {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(BookhubError::Validation(format!(
            "rating must be between 0 and {MAX_RATING}: {rating}"
        )));
    }
    Ok(())
}

/// Sum of every line total, or `None` when it does not fit in a [`Decimal`].
pub fn checked_total(items: &[CartItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
}

/// A cart line: the book's public fields plus a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub book: Book,
    pub quantity: u32,
}

impl CartItem {
    /// Cart lines are keyed by the book they hold.
    pub fn id(&self) -> &str {
        &self.book.id
    }

    /// Price × quantity, or `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.book.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    /// Every field is mandatory. Whitespace-only values count as missing.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(BookhubError::Validation(format!(
                "missing required shipping fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The tracking timeline shown to customers. Cancelled orders leave it.
    pub const TIMELINE: [OrderStatus; 3] = [Self::Pending, Self::Shipped, Self::Delivered];

    /// Only pending orders may be cancelled by their owner.
    pub fn is_cancellable(self) -> bool {
        self == Self::Pending
    }

    /// The next fulfilment step an administrator advances to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Which [`TIMELINE`](Self::TIMELINE) steps this status has reached.
    pub fn progress(self) -> [bool; 3] {
        match self {
            Self::Pending => [true, false, false],
            Self::Shipped => [true, true, false],
            Self::Delivered => [true, true, true],
            Self::Cancelled => [false, false, false],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = BookhubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(BookhubError::Validation(format!(
                "invalid order status: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub payment_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl Order {
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Everything checkout hands to the order store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_id: String,
}
