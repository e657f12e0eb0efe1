//! Reference data: service categories plus demo accounts.
//!
//! Seeding is idempotent. Existing categories (by id) and accounts (by email or phone) are
//! left untouched, so it is safe to run on every startup.

use chrono::{Duration, Utc};
use sns_types::UserRole;
use sqlx::PgPool;

use crate::constants::SEED_PASSWORD;
use crate::models::new_id;
use crate::security::hash_password_async;
use crate::CoreResult;

pub struct SeedCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

pub const CATEGORIES: &[SeedCategory] = &[
    SeedCategory { id: "cleaning", name: "Cleaning", icon: "sparkles", color: "0xFF6C63FF", description: "Home & office cleaning services" },
    SeedCategory { id: "plumbing", name: "Plumbing", icon: "wrench", color: "0xFFFFA726", description: "Pipe repairs, fittings, and water systems" },
    SeedCategory { id: "electrician", name: "Electrician", icon: "zap", color: "0xFFFF7043", description: "Electrical repairs, wiring, and installations" },
    SeedCategory { id: "painting", name: "Painting", icon: "paint-roller", color: "0xFF29B6F6", description: "Interior and exterior painting" },
    SeedCategory { id: "ac_repair", name: "AC Repair", icon: "wind", color: "0xFF26A69A", description: "AC servicing, repair, and installation" },
    SeedCategory { id: "salon", name: "Salon", icon: "scissors", color: "0xFFEC407A", description: "Haircut, styling, and grooming at home" },
    SeedCategory { id: "pest_control", name: "Pest Control", icon: "bug", color: "0xFF8D6E63", description: "Pest removal and prevention" },
    SeedCategory { id: "carpentry", name: "Carpentry", icon: "hammer", color: "0xFF5C6BC0", description: "Furniture repair, assembly, and custom work" },
];

pub struct SeedUser {
    pub email: &'static str,
    pub full_name: &'static str,
    pub phone: &'static str,
    pub role: UserRole,
    pub service_category: Option<&'static str>,
    pub bio: Option<&'static str>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: &'static str,
}

pub const USERS: &[SeedUser] = &[
    SeedUser {
        email: "rajesh.electrician@example.com",
        full_name: "Rajesh Kumar",
        phone: "9876543210",
        role: UserRole::Pro,
        service_category: Some("electrician"),
        bio: Some("Expert electrician with 10 years of experience in residential and commercial wiring."),
        latitude: 12.9716,
        longitude: 77.5946,
        address: "MG Road, Bangalore",
    },
    SeedUser {
        email: "anita.cleaning@example.com",
        full_name: "Anita Singh",
        phone: "9876543211",
        role: UserRole::Pro,
        service_category: Some("cleaning"),
        bio: Some("Professional home cleaner. I use eco-friendly products and ensure 100% satisfaction."),
        latitude: 12.9352,
        longitude: 77.6245,
        address: "Koramangala, Bangalore",
    },
    SeedUser {
        email: "suresh.plumber@example.com",
        full_name: "Suresh Reddy",
        phone: "9876543212",
        role: UserRole::Pro,
        service_category: Some("plumbing"),
        bio: Some("Certified plumber specializing in leak repairs and pipe fitting."),
        latitude: 12.9784,
        longitude: 77.6408,
        address: "Indiranagar, Bangalore",
    },
    SeedUser {
        email: "priya.salon@example.com",
        full_name: "Priya Sharma",
        phone: "9876543213",
        role: UserRole::Pro,
        service_category: Some("salon"),
        bio: Some("Professional beautician providing salon services at your doorstep."),
        latitude: 12.9279,
        longitude: 77.6271,
        address: "HSR Layout, Bangalore",
    },
    SeedUser {
        email: "vikram.ac@example.com",
        full_name: "Vikram Malhotra",
        phone: "9876543214",
        role: UserRole::Pro,
        service_category: Some("ac_repair"),
        bio: Some("AC installation and repair expert. Fast and reliable service."),
        latitude: 13.0358,
        longitude: 77.5970,
        address: "Hebbal, Bangalore",
    },
    SeedUser {
        email: "customer@example.com",
        full_name: "Rahul Verma",
        phone: "9988776655",
        role: UserRole::Customer,
        service_category: None,
        bio: None,
        latitude: 12.9698,
        longitude: 77.7500,
        address: "Whitefield, Bangalore",
    },
];

/// Days of open availability created for each seeded professional.
const SEED_AVAILABILITY_DAYS: i64 = 7;

/// What a seeding run inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: u64,
    pub users: u64,
    pub slots: u64,
}

pub async fn seed(pool: &PgPool) -> CoreResult<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    for cat in CATEGORIES {
        report.categories += sqlx::query(
            "INSERT INTO service_categories (id, name, icon, color, description)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT DO NOTHING",
        )
        .bind(cat.id)
        .bind(cat.name)
        .bind(cat.icon)
        .bind(cat.color)
        .bind(cat.description)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    let password_hash = hash_password_async(SEED_PASSWORD.to_owned()).await?;
    let today = Utc::now().date_naive();

    for user in USERS {
        let id = new_id();
        let inserted = sqlx::query(
            "INSERT INTO users
                (id, email, password_hash, full_name, phone, role, service_category, bio,
                 latitude, longitude, address, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE)
             ON CONFLICT DO NOTHING",
        )
        .bind(&id)
        .bind(user.email)
        .bind(&password_hash)
        .bind(user.full_name)
        .bind(user.phone)
        .bind(user.role.as_str())
        .bind(user.service_category)
        .bind(user.bio)
        .bind(user.latitude)
        .bind(user.longitude)
        .bind(user.address)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            continue;
        }
        report.users += 1;
        tracing::info!(name = user.full_name, role = %user.role, "seeded user");

        if user.role != UserRole::Pro {
            continue;
        }
        for offset in 0..SEED_AVAILABILITY_DAYS {
            let day = today + Duration::days(offset);
            sqlx::query(
                "INSERT INTO availability (id, professional_id, date, start_time, end_time)
                 VALUES ($1, $2, $3, '09:00', '18:00')",
            )
            .bind(new_id())
            .bind(&id)
            .bind(day.format("%Y-%m-%d").to_string())
            .execute(&mut *tx)
            .await?;
            report.slots += 1;
        }
    }

    tx.commit().await?;
    tracing::info!(
        categories = report.categories,
        users = report.users,
        slots = report.slots,
        "database seeding completed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_categories_with_unique_ids() {
        assert_eq!(CATEGORIES.len(), 8);
        let mut ids: Vec<&str> = CATEGORIES.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn five_professionals_and_one_customer() {
        let pros: Vec<&SeedUser> = USERS.iter().filter(|u| u.role == UserRole::Pro).collect();
        assert_eq!(pros.len(), 5);
        assert_eq!(USERS.len(), 6);
        for pro in pros {
            let category = pro.service_category.expect("pros have a category");
            assert!(CATEGORIES.iter().any(|c| c.id == category));
        }
    }
}
