//! Demo catalog and accounts.
//!
//! Seeding is idempotent: accounts are matched by email and products by
//! name, and existing rows are left alone.

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::auth::{PasswordHasher, Role};
use crate::model::{Product, User, new_id};
use crate::store::Store;

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEMO_USER_EMAIL: &str = "user@example.com";

const USERS: &[SeedUser] = &[
    SeedUser {
        name: "Admin User",
        email: DEMO_ADMIN_EMAIL,
        password: "admin123",
        role: Role::Admin,
    },
    SeedUser {
        name: "Test User",
        email: DEMO_USER_EMAIL,
        password: "user123",
        role: Role::User,
    },
];

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: f64,
    image: &'static str,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Mango Sticky Rice",
        description: "Sweet sticky rice served with fresh mango slices and coconut milk. A classic Thai dessert loved by all.",
        price: 8.99,
        image: "photo-1621302201297-9bfb12159194",
    },
    SeedProduct {
        name: "Tub Tim Krob",
        description: "Water chestnut rubies in coconut milk and syrup, served with crushed ice. Refreshing and colorful.",
        price: 6.99,
        image: "photo-1626516011762-d4930055d9d4",
    },
    SeedProduct {
        name: "Khanom Chan",
        description: "Layered Thai dessert made from pandan, coconut milk, and tapioca flour. Soft, chewy, and aromatic.",
        price: 7.99,
        image: "photo-1624466571717-bdae8ab89144",
    },
    SeedProduct {
        name: "Bua Loy",
        description: "Glutinous rice balls in warm coconut milk. Can be filled with black sesame or served with taro or pumpkin.",
        price: 5.99,
        image: "photo-1574562350094-3a1e5cb48ff6",
    },
    SeedProduct {
        name: "Khanom Buang",
        description: "Crispy Thai crepes filled with meringue and shredded coconut. Sweet and savory versions available.",
        price: 9.99,
        image: "photo-1624466665263-c66412c9bb04",
    },
    SeedProduct {
        name: "Lod Chong",
        description: "Green rice flour noodles in coconut milk and palm sugar syrup. Served cold with crushed ice.",
        price: 6.99,
        image: "photo-1633952291947-bb7f1305db4c",
    },
    SeedProduct {
        name: "Khanom Krok",
        description: "Coconut rice pudding cups. Crispy edges with soft centers, topped with corn or green onions.",
        price: 7.99,
        image: "photo-1624466571736-432645f69c3e",
    },
    SeedProduct {
        name: "Foi Thong",
        description: "Golden egg yolk threads cooked in syrup. Royal Thai dessert with a delicate sweet flavor.",
        price: 12.99,
        image: "photo-1625938144058-9a985c943f57",
    },
];

/// Rows created by one [`seed`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

/// Inserts the demo accounts and catalog where missing.
pub fn seed(store: &Store, hasher: &PasswordHasher, now: NaiveDateTime) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for u in USERS {
        if store.users.find_by_email(u.email)?.is_some() {
            continue;
        }
        store.users.insert(&User {
            id: new_id(),
            name: u.name.to_string(),
            email: u.email.to_string(),
            password_hash: hasher.hash(u.password)?,
            role: u.role,
            created_at: now,
        })?;
        report.users += 1;
    }

    for p in PRODUCTS {
        if store.products.find_by_name(p.name)?.is_some() {
            continue;
        }
        store.products.insert(&Product {
            id: new_id(),
            name: p.name.to_string(),
            description: p.description.to_string(),
            price: p.price,
            image_url: format!("https://images.unsplash.com/{}?w=800&auto=format&fit=crop", p.image),
            in_stock: true,
            created_at: now,
            updated_at: now,
        })?;
        report.products += 1;
    }

    tracing::info!(users = report.users, products = report.products, "demo data seeded");
    Ok(report)
}
