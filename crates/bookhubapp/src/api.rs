//! # API Facade
//!
//! The API layer is a **thin facade** over the four stores. It is the single
//! entry point for every storefront operation, whatever UI drives it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Composes** stores at the call site. Checkout reads the cart and the
//!   session, creates the order, then clears the cart. No store calls
//!   another store.
//! - **Guards authority**: catalog edits, status overrides and the full
//!   order list require an admin session.
//! - **Returns structured types**, never formatted strings.
//!
//! ## Construction
//!
//! [`BookhubApi::new`] is called once at startup and the value is passed by
//! reference to whatever needs it. All four stores share one backend through
//! an `Rc`, each under its own key.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `BookhubApi<FsBackend>`
//! - Testing: `BookhubApi<MemBackend>`

use crate::checkout::{Payer, PaymentOutcome, PaymentRequest, PricingSummary};
use crate::config::BookhubConfig;
use crate::error::{BookhubError, Result};
use crate::model::{
    Book, BookInput, BookPatch, CartItem, NewOrder, Order, OrderStatus, RegisterUser, Role,
    ShippingAddress, User, UserPatch, UserRecord,
};
use crate::store::StorageBackend;
use crate::stores::catalog::BookQuery;
use crate::stores::{CartStore, CatalogStore, IdentityStore, OrderStore};
use std::rc::Rc;
use tracing::{info, warn};

pub struct BookhubApi<B: StorageBackend> {
    identity: IdentityStore<Rc<B>>,
    catalog: CatalogStore<Rc<B>>,
    cart: CartStore<Rc<B>>,
    orders: OrderStore<Rc<B>>,
    config: BookhubConfig,
}

impl<B: StorageBackend> BookhubApi<B> {
    /// Load every store from `backend`, seeding the catalog on first run.
    pub fn new(backend: B, config: BookhubConfig) -> Result<Self> {
        let backend = Rc::new(backend);
        Ok(Self {
            identity: IdentityStore::load(Rc::clone(&backend), config.role_policy)?,
            catalog: CatalogStore::load(Rc::clone(&backend))?,
            cart: CartStore::load(Rc::clone(&backend))?,
            orders: OrderStore::load(backend, config.delivery_days)?,
            config,
        })
    }

    /// Assemble from stores that were loaded elsewhere.
    pub fn from_stores(
        identity: IdentityStore<Rc<B>>,
        catalog: CatalogStore<Rc<B>>,
        cart: CartStore<Rc<B>>,
        orders: OrderStore<Rc<B>>,
        config: BookhubConfig,
    ) -> Self {
        Self {
            identity,
            catalog,
            cart,
            orders,
            config,
        }
    }

    pub fn config(&self) -> &BookhubConfig {
        &self.config
    }

    pub fn identity(&self) -> &IdentityStore<Rc<B>> {
        &self.identity
    }

    pub fn catalog(&self) -> &CatalogStore<Rc<B>> {
        &self.catalog
    }

    pub fn cart(&self) -> &CartStore<Rc<B>> {
        &self.cart
    }

    pub fn orders(&self) -> &OrderStore<Rc<B>> {
        &self.orders
    }

    // --- Session ---

    pub fn login(&mut self, email: &str, password: &str) -> Result<Role> {
        self.identity.login(email, password)
    }

    pub fn register(&mut self, input: RegisterUser) -> Result<User> {
        self.identity.register(input)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.identity.logout()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.identity.current_user()
    }

    pub fn update_user(&mut self, patch: &UserPatch) -> Result<User> {
        self.identity.update_user(patch)
    }

    /// Registered accounts, without the demo users. Admin only.
    pub fn registered_users(&self) -> Result<&[UserRecord]> {
        self.require_admin()?;
        Ok(self.identity.registered_users())
    }

    pub fn set_role(&mut self, user_id: &str, role: Role) -> Result<()> {
        self.identity.set_role(user_id, role)
    }

    // --- Catalog ---

    pub fn browse(&self, query: &BookQuery) -> Vec<&Book> {
        self.catalog.browse(query)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.catalog.categories()
    }

    pub fn get_book(&self, book_id: &str) -> Result<&Book> {
        self.catalog
            .get_book_by_id(book_id)
            .ok_or_else(|| BookhubError::not_found("Book", book_id))
    }

    pub fn add_book(&mut self, input: BookInput) -> Result<Book> {
        self.require_admin()?;
        self.catalog.add_book(input)
    }

    pub fn update_book(&mut self, book_id: &str, patch: &BookPatch) -> Result<()> {
        self.require_admin()?;
        self.catalog.update_book(book_id, patch)
    }

    pub fn delete_book(&mut self, book_id: &str) -> Result<()> {
        self.require_admin()?;
        self.catalog.delete_book(book_id)
    }

    // --- Cart ---

    pub fn cart_items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Add a catalog book to the cart by id.
    pub fn add_to_cart(&mut self, book_id: &str, quantity: u32) -> Result<()> {
        let book = self
            .catalog
            .get_book_by_id(book_id)
            .ok_or_else(|| BookhubError::not_found("Book", book_id))?;
        self.cart.add_to_cart(book, quantity)
    }

    pub fn update_cart_quantity(&mut self, item_id: &str, quantity: i64) -> Result<()> {
        self.cart.update_quantity(item_id, quantity)
    }

    pub fn remove_from_cart(&mut self, item_id: &str) -> Result<()> {
        self.cart.remove_from_cart(item_id)
    }

    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear_cart()
    }

    pub fn cart_item_count(&self) -> u64 {
        self.cart.get_item_count()
    }

    /// Subtotal, tax and total for the current cart.
    pub fn cart_pricing(&self) -> Result<PricingSummary> {
        PricingSummary::from_subtotal(self.cart.get_total()?, self.config.tax_rate())
    }

    // --- Checkout ---

    /// Price the cart for the payment gateway. Nothing is persisted.
    pub fn begin_checkout(&self, address: &ShippingAddress) -> Result<PaymentRequest> {
        self.check_checkout(address)?;
        let pricing = self.cart_pricing()?;
        Ok(PaymentRequest {
            amount_minor_units: pricing.amount_minor_units()?,
            currency: self.config.currency.clone(),
            payer: Payer {
                name: address.name.clone(),
                email: address.email.clone(),
                phone: address.phone.clone(),
            },
            pricing,
        })
    }

    /// Continue checkout once the gateway has reported its outcome.
    ///
    /// A failed payment leaves the cart untouched. A successful one turns the
    /// cart into an order and then empties it.
    pub fn complete_checkout(
        &mut self,
        address: &ShippingAddress,
        outcome: PaymentOutcome,
    ) -> Result<Order> {
        let payment_reference = match outcome {
            PaymentOutcome::Succeeded { payment_reference } => payment_reference,
            PaymentOutcome::Failed { reason } => {
                warn!(%reason, "payment failed");
                return Err(BookhubError::PaymentFailed(reason));
            }
        };

        let user_id = self.check_checkout(address)?.id.clone();
        let pricing = self.cart_pricing()?;
        let order = self.orders.create_order(NewOrder {
            user_id,
            items: self.cart.items().to_vec(),
            total_amount: pricing.total,
            shipping_address: address.clone(),
            payment_id: payment_reference,
        })?;
        self.cart.clear_cart()?;
        info!(order_id = %order.id, "checkout complete");
        Ok(order)
    }

    fn check_checkout(&self, address: &ShippingAddress) -> Result<&User> {
        if self.cart.is_empty() {
            return Err(BookhubError::Validation("cart is empty".to_string()));
        }
        let user = self
            .identity
            .current_user()
            .ok_or(BookhubError::NoActiveSession)?;
        address.validate()?;
        Ok(user)
    }

    // --- Orders ---

    /// The logged-in user's orders, newest first.
    pub fn my_orders(&self) -> Result<Vec<&Order>> {
        let user = self.require_session()?;
        let mut orders = self.orders.get_user_orders(&user.id);
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// One order, visible to its owner and to administrators.
    pub fn get_order(&self, order_id: &str) -> Result<&Order> {
        let user = self.require_session()?;
        self.orders
            .get_order(order_id)
            .filter(|order| order.user_id == user.id || user.is_admin())
            .ok_or_else(|| BookhubError::not_found("Order", order_id))
    }

    /// Cancel one of the logged-in user's own orders.
    pub fn cancel_my_order(&mut self, order_id: &str) -> Result<()> {
        let user = self.require_session()?;
        let owned = self
            .orders
            .get_order(order_id)
            .is_some_and(|order| order.user_id == user.id);
        if !owned {
            return Err(BookhubError::not_found("Order", order_id));
        }
        self.orders.cancel_order(order_id)
    }

    /// Every order whose id contains `search`, newest first. Admin only.
    pub fn all_orders(&self, search: &str) -> Result<Vec<&Order>> {
        self.require_admin()?;
        Ok(self.orders.search_orders(search))
    }

    /// Administrative status override. Admin only.
    pub fn update_order_status(&mut self, order_id: &str, status: OrderStatus) -> Result<()> {
        self.require_admin()?;
        self.orders.update_order_status(order_id, status)
    }

    /// Move an order one fulfilment step forward. Admin only.
    pub fn advance_order(&mut self, order_id: &str) -> Result<OrderStatus> {
        self.require_admin()?;
        let current = self
            .orders
            .get_order(order_id)
            .ok_or_else(|| BookhubError::not_found("Order", order_id))?
            .status;
        let next = current.next().ok_or_else(|| {
            BookhubError::Validation(format!("order {order_id} is already {current}"))
        })?;
        self.orders.update_order_status(order_id, next)?;
        Ok(next)
    }

    fn require_session(&self) -> Result<&User> {
        self.identity
            .current_user()
            .ok_or(BookhubError::NoActiveSession)
    }

    fn require_admin(&self) -> Result<&User> {
        let user = self.require_session()?;
        if !user.is_admin() {
            return Err(BookhubError::Forbidden(
                "administrator role required".to_string(),
            ));
        }
        Ok(user)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    pub type InMemoryApi = BookhubApi<MemBackend>;

    pub const ADMIN_EMAIL: &str = "admin@bookhub.com";
    pub const ADMIN_PASSWORD: &str = "admin123";
    pub const USER_EMAIL: &str = "user@test.com";
    pub const USER_PASSWORD: &str = "password123";

    /// A fresh API over an empty memory backend, with the default seed.
    pub fn api() -> InMemoryApi {
        BookhubApi::new(MemBackend::new(), BookhubConfig::default()).unwrap()
    }

    pub fn api_as_user() -> InMemoryApi {
        let mut api = api();
        api.login(USER_EMAIL, USER_PASSWORD).unwrap();
        api
    }

    pub fn api_as_admin() -> InMemoryApi {
        let mut api = api();
        api.login(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
        api
    }

    pub fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Test User".into(),
            email: USER_EMAIL.into(),
            phone: "9876543210".into(),
            address: "221B Baker Street".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            pincode: "400001".into(),
        }
    }

    pub fn paid(reference: &str) -> PaymentOutcome {
        PaymentOutcome::Succeeded {
            payment_reference: reference.to_string(),
        }
    }
}
