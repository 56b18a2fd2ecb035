//! The mutable set of sellable books.
//!
//! The first load with no persisted catalog writes the default seed and
//! persists it at once. From then on the stored copy is authoritative, even
//! if the seed list changes between releases.

use crate::error::{BookhubError, Result};
use crate::model::{new_id, Book, BookInput, BookPatch};
use crate::seed::default_books;
use crate::store::{load_json, save_json, StorageBackend, CATALOG_KEY};
use chrono::Utc;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    /// Catalog order.
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
    Bestseller,
}

impl fmt::Display for BookSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Bestseller => "bestseller",
        };
        f.write_str(name)
    }
}

impl FromStr for BookSort {
    type Err = BookhubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newest" => Ok(Self::Newest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            "bestseller" => Ok(Self::Bestseller),
            _ => Err(BookhubError::Validation(format!("invalid sort: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    /// Case-insensitive match against title or author.
    pub search: Option<String>,
    /// Exact category. `None` or `"All"` keeps every category.
    pub category: Option<String>,
    pub sort: BookSort,
}

pub struct CatalogStore<B: StorageBackend> {
    backend: B,
    books: Vec<Book>,
}

impl<B: StorageBackend> CatalogStore<B> {
    pub fn load(backend: B) -> Result<Self> {
        Self::load_with_seed(backend, || default_books(Utc::now()))
    }

    /// Load the persisted catalog, or write `seed()` when none exists yet.
    pub fn load_with_seed(backend: B, seed: impl FnOnce() -> Vec<Book>) -> Result<Self> {
        let books = match load_json(&backend, CATALOG_KEY)? {
            Some(books) => books,
            None => {
                let books = seed();
                save_json(&backend, CATALOG_KEY, &books)?;
                info!(count = books.len(), "seeded catalog");
                books
            }
        };
        Ok(Self { backend, books })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get_book_by_id(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn add_book(&mut self, input: BookInput) -> Result<Book> {
        let book = input.into_book(new_id(), Utc::now())?;
        let mut books = self.books.clone();
        books.push(book.clone());
        self.commit(books)?;
        info!(book_id = %book.id, title = %book.title, "book added");
        Ok(book)
    }

    /// Merge `patch` into the book with `id`. Unknown ids are ignored.
    pub fn update_book(&mut self, id: &str, patch: &BookPatch) -> Result<()> {
        let Some(pos) = self.books.iter().position(|book| book.id == id) else {
            debug!(book_id = id, "update for unknown book ignored");
            return Ok(());
        };
        let mut books = self.books.clone();
        patch.apply(&mut books[pos])?;
        self.commit(books)?;
        info!(book_id = id, "book updated");
        Ok(())
    }

    /// Remove the book with `id`. Unknown ids are ignored.
    pub fn delete_book(&mut self, id: &str) -> Result<()> {
        if self.get_book_by_id(id).is_none() {
            debug!(book_id = id, "delete for unknown book ignored");
            return Ok(());
        }
        let books: Vec<Book> = self
            .books
            .iter()
            .filter(|book| book.id != id)
            .cloned()
            .collect();
        self.commit(books)?;
        info!(book_id = id, "book deleted");
        Ok(())
    }

    /// Filter and sort the catalog for display. Sorting is stable, so ties
    /// keep catalog order.
    pub fn browse(&self, query: &BookQuery) -> Vec<&Book> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        let category = query
            .category
            .as_deref()
            .filter(|category| *category != ALL_CATEGORIES);

        let mut books: Vec<&Book> = self
            .books
            .iter()
            .filter(|book| match &needle {
                Some(needle) => {
                    book.title.to_lowercase().contains(needle)
                        || book.author.to_lowercase().contains(needle)
                }
                None => true,
            })
            .filter(|book| category.map_or(true, |c| book.category == c))
            .collect();

        match query.sort {
            BookSort::Newest => {}
            BookSort::PriceLow => books.sort_by(|a, b| a.price.cmp(&b.price)),
            BookSort::PriceHigh => books.sort_by(|a, b| b.price.cmp(&a.price)),
            BookSort::Rating => books.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            BookSort::Bestseller => books.sort_by_key(|book| !book.bestseller),
        }
        books
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for book in &self.books {
            if !categories.contains(&book.category.as_str()) {
                categories.push(&book.category);
            }
        }
        categories
    }

    fn commit(&mut self, books: Vec<Book>) -> Result<()> {
        save_json(&self.backend, CATALOG_KEY, &books)?;
        self.books = books;
        Ok(())
    }
}
