//! The default catalog written on first run.

use crate::model::Book;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

struct SeedBook {
    id: &'static str,
    title: &'static str,
    author: &'static str,
    category: &'static str,
    price: i64,
    rating: f32,
    bestseller: bool,
    cover_image: &'static str,
    description: &'static str,
}

const SEED: &[SeedBook] = &[
    SeedBook {
        id: "1",
        title: "The Midnight Library",
        author: "Matt Haig",
        category: "Fiction",
        price: 399,
        rating: 4.5,
        bestseller: true,
        cover_image: "https://images.unsplash.com/photo-1544947950-fa07a98d237f",
        description: "Between life and death there is a library of lives you could have lived.",
    },
    SeedBook {
        id: "2",
        title: "Atomic Habits",
        author: "James Clear",
        category: "Non-Fiction",
        price: 499,
        rating: 4.8,
        bestseller: true,
        cover_image: "https://images.unsplash.com/photo-1589829085413-56de8ae18c73",
        description: "Tiny changes, remarkable results.",
    },
    SeedBook {
        id: "3",
        title: "The Silent Patient",
        author: "Alex Michaelides",
        category: "Mystery",
        price: 349,
        rating: 4.3,
        bestseller: false,
        cover_image: "https://images.unsplash.com/photo-1512820790803-83ca734da794",
        description: "A woman shoots her husband and never speaks again.",
    },
    SeedBook {
        id: "4",
        title: "Pride and Prejudice",
        author: "Jane Austen",
        category: "Romance",
        price: 199,
        rating: 4.6,
        bestseller: false,
        cover_image: "https://images.unsplash.com/photo-1543002588-bfa74002ed7e",
        description: "Manners, marriage and first impressions.",
    },
    SeedBook {
        id: "5",
        title: "A Brief History of Time",
        author: "Stephen Hawking",
        category: "Science",
        price: 450,
        rating: 4.7,
        bestseller: true,
        cover_image: "https://images.unsplash.com/photo-1532012197267-da84d127e765",
        description: "From the big bang to black holes.",
    },
    SeedBook {
        id: "6",
        title: "Dune",
        author: "Frank Herbert",
        category: "Science Fiction",
        price: 599,
        rating: 4.6,
        bestseller: true,
        cover_image: "https://images.unsplash.com/photo-1541963463532-d68292c34b19",
        description: "Spice, sandworms and the desert planet Arrakis.",
    },
    SeedBook {
        id: "7",
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        category: "Fantasy",
        price: 375,
        rating: 4.7,
        bestseller: false,
        cover_image: "https://images.unsplash.com/photo-1621351183012-e2f9972dd9bf",
        description: "There and back again.",
    },
    SeedBook {
        id: "8",
        title: "Sapiens",
        author: "Yuval Noah Harari",
        category: "Non-Fiction",
        price: 549,
        rating: 4.4,
        bestseller: false,
        cover_image: "https://images.unsplash.com/photo-1495446815901-a7297e633e8d",
        description: "A brief history of humankind.",
    },
];

/// Build the seed catalog, stamped with `now`.
pub fn default_books(now: DateTime<Utc>) -> Vec<Book> {
    SEED.iter()
        .map(|seed| Book {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            author: seed.author.to_string(),
            category: seed.category.to_string(),
            price: Decimal::from(seed.price),
            rating: seed.rating,
            bestseller: seed.bestseller,
            cover_image: seed.cover_image.to_string(),
            description: Some(seed.description.to_string()),
            created_at: now,
        })
        .collect()
}
