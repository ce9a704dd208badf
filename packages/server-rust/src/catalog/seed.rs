//! Demo dataset for local development and handler tests.
//!
//! A small Bandung cafe catalog with enough variety to exercise every
//! filter: all six regions appear, ratings straddle the star buckets,
//! and one cafe is still a draft so status filtering is visible.

use crate::catalog::{Cafe, Catalog, Facility, Review, Term};
use crate::storage::MemoryDataSource;

// 2025-01-01T00:00:00Z; rows are staggered one day apart from here.
const EPOCH: i64 = 1_735_689_600_000;
const DAY: i64 = 86_400_000;

fn day(n: i64) -> i64 {
    EPOCH + n * DAY
}

/// Builds the seeded demo catalog.
#[must_use]
pub fn demo() -> Catalog {
    Catalog {
        cafes: std::sync::Arc::new(MemoryDataSource::with_records(cafes())),
        reviews: std::sync::Arc::new(MemoryDataSource::with_records(reviews())),
        facilities: std::sync::Arc::new(MemoryDataSource::with_records(facilities())),
        terms: std::sync::Arc::new(MemoryDataSource::with_records(terms())),
    }
}

#[allow(clippy::too_many_arguments)]
fn cafe(
    id: &str,
    slug: &str,
    name: &str,
    description: &str,
    address: &str,
    region: &str,
    cafe_type: &str,
    price_range: &str,
    status: &str,
    average_rating: f64,
    review_count: u32,
    facility_ids: &[&str],
    created: i64,
) -> Cafe {
    Cafe {
        id: id.into(),
        slug: slug.into(),
        name: name.into(),
        description: description.into(),
        address: address.into(),
        region: region.into(),
        cafe_type: cafe_type.into(),
        price_range: price_range.into(),
        status: status.into(),
        average_rating,
        review_count,
        facility_ids: facility_ids.iter().map(|f| (*f).to_string()).collect(),
        created_at: created,
        updated_at: created,
    }
}

fn cafes() -> Vec<Cafe> {
    vec![
        cafe(
            "cafe-01", "kopi-nako", "Kopi Nako",
            "Rooftop specialty bar with a tasting flight menu",
            "Jl. Sukapura No. 10", "sukapura", "coffee_shop", "moderate",
            "published", 4.2, 128, &["fac-01", "fac-02"], day(0),
        ),
        cafe(
            "cafe-02", "sejiwa-coffee", "Sejiwa Coffee",
            "Bright space, single origin beans roasted in house",
            "Jl. Progo No. 15", "sukapura", "roastery", "premium",
            "published", 4.9, 201, &["fac-01", "fac-03"], day(1),
        ),
        cafe(
            "cafe-03", "jurnal-risa", "Jurnal Risa",
            "Quiet corner spot favored by writers",
            "Jl. Gatot Subroto No. 42", "batununggal", "workspace", "budget",
            "published", 3.4, 57, &["fac-01", "fac-04"], day(2),
        ),
        cafe(
            "cafe-04", "armor-kopi", "Armor Kopi",
            "Forest-edge terrace, manual brew only",
            "Jl. Dago Pakar Raya", "coblong", "outdoor", "budget",
            "published", 4.4, 310, &["fac-03", "fac-05"], day(3),
        ),
        cafe(
            "cafe-05", "masagi-koffee", "Masagi Koffee",
            "Sundanese small plates beside the espresso bar",
            "Jl. Lengkong Kecil No. 7", "lengkong", "eatery", "moderate",
            "published", 4.0, 89, &["fac-02", "fac-05"], day(4),
        ),
        cafe(
            "cafe-06", "satu-pintu", "Satu Pintu",
            "Meeting rooms by the hour, flat-rate refills",
            "Jl. Setiabudi No. 101", "sukajadi", "workspace", "moderate",
            "published", 3.8, 44, &["fac-01", "fac-04"], day(5),
        ),
        cafe(
            "cafe-07", "dua-hati", "Dua Hati",
            "Family eatery, opening soon",
            "Jl. Buah Batu No. 88", "buahbatu", "eatery", "budget",
            "draft", 0.0, 0, &[], day(6),
        ),
    ]
}

fn review(
    id: &str,
    cafe_id: &str,
    author: &str,
    content: &str,
    rating: u8,
    visitor_type: &str,
    status: &str,
    created: i64,
) -> Review {
    Review {
        id: id.into(),
        cafe_id: cafe_id.into(),
        author: author.into(),
        content: content.into(),
        rating,
        visitor_type: visitor_type.into(),
        status: status.into(),
        created_at: created,
    }
}

fn reviews() -> Vec<Review> {
    vec![
        review("rev-01", "cafe-01", "Rani", "Pour over yang konsisten, tempat luas", 4, "solo", "published", day(7)),
        review("rev-02", "cafe-01", "Bayu", "Agak ramai di akhir pekan", 3, "group", "published", day(8)),
        review("rev-03", "cafe-02", "Sinta", "Roastery terbaik di Bandung utara", 5, "couple", "published", day(8)),
        review("rev-04", "cafe-02", "Dewi", "Harga sepadan dengan kualitas", 5, "family", "published", day(9)),
        review("rev-05", "cafe-03", "Tono", "Sunyi, cocok buat nulis skripsi", 4, "student", "published", day(10)),
        review("rev-06", "cafe-04", "Lia", "Udara sejuk, kopi tubruknya mantap", 5, "group", "published", day(11)),
        review("rev-07", "cafe-05", "Agus", "Nasi bakarnya juara", 4, "family", "published", day(12)),
        review("rev-08", "cafe-03", "Anon", "spam spam spam", 1, "solo", "archived", day(13)),
    ]
}

fn facilities() -> Vec<Facility> {
    [
        ("fac-01", "wifi-cepat", "Wifi Cepat"),
        ("fac-02", "mushola", "Mushola"),
        ("fac-03", "outdoor-seating", "Outdoor Seating"),
        ("fac-04", "ruang-meeting", "Ruang Meeting"),
        ("fac-05", "parkir-luas", "Parkir Luas"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (id, slug, name))| Facility {
        id: id.into(),
        slug: slug.into(),
        name: name.into(),
        created_at: day(i as i64),
    })
    .collect()
}

fn terms() -> Vec<Term> {
    [
        ("term-01", "brew-method", "V60", "v60"),
        ("term-02", "brew-method", "Cold Brew", "cold-brew"),
        ("term-03", "brew-method", "Espresso", "espresso"),
        ("term-04", "ambience", "Cozy", "cozy"),
        ("term-05", "ambience", "Industrial", "industrial"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (id, vocabulary, name, slug))| Term {
        id: id.into(),
        vocabulary: vocabulary.into(),
        name: name.into(),
        slug: slug.into(),
        created_at: day(i as i64),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Record;
    use ngopi_core::domain::{CAFE_TYPE, CONTENT_STATUS, PRICE_RANGE, REGION, VISITOR_TYPE};

    #[test]
    fn seeded_enum_columns_hold_canonical_tokens() {
        for cafe in cafes() {
            assert!(REGION.is_canonical(&cafe.region), "{}", cafe.slug);
            assert!(CAFE_TYPE.is_canonical(&cafe.cafe_type), "{}", cafe.slug);
            assert!(PRICE_RANGE.is_canonical(&cafe.price_range), "{}", cafe.slug);
            assert!(CONTENT_STATUS.is_canonical(&cafe.status), "{}", cafe.slug);
        }
        for review in reviews() {
            assert!(VISITOR_TYPE.is_canonical(&review.visitor_type), "{}", review.id);
            assert!(CONTENT_STATUS.is_canonical(&review.status), "{}", review.id);
        }
    }

    #[test]
    fn seeded_references_resolve() {
        let facility_ids: Vec<String> = facilities().iter().map(|f| f.id.clone()).collect();
        let cafe_ids: Vec<String> = cafes().iter().map(|c| c.id.clone()).collect();
        for cafe in cafes() {
            for fac in &cafe.facility_ids {
                assert!(facility_ids.contains(fac), "{}: {fac}", cafe.slug);
            }
        }
        for review in reviews() {
            assert!(cafe_ids.contains(&review.cafe_id), "{}", review.id);
        }
    }

    #[test]
    fn seeded_ids_are_unique() {
        let catalog = demo();
        assert_eq!(catalog.cafes.len(), cafes().len());
        assert_eq!(catalog.reviews.len(), reviews().len());
        assert_eq!(catalog.facilities.len(), facilities().len());
        assert_eq!(catalog.terms.len(), terms().len());
    }

    #[test]
    fn fixture_cafes_cover_the_search_scenarios() {
        let catalog = demo();
        // Names used throughout the repository and handler tests.
        for slug in ["kopi-nako", "sejiwa-coffee", "jurnal-risa"] {
            let found = cafes().into_iter().find(|c| c.slug == slug);
            assert!(found.is_some(), "missing {slug}");
        }
        assert!(catalog.cafes.len() >= 3);
    }
}
