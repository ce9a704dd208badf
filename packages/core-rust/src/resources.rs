//! The concrete resource specs of the cafe catalog.
//!
//! One static [`ResourceSpec`] per list endpoint, shared by the server
//! (compile + translate on every request) and the client (optimistic
//! compile before encoding). Per-resource defaults differ and are easy
//! to get wrong, so they are spelled out here rather than inherited:
//! cafes list newest-first, facilities and terms alphabetically.

use crate::domain::{CAFE_TYPE, CONTENT_STATUS, PRICE_RANGE, REGION, STAR_RATING, VISITOR_TYPE};
use crate::query::SortDirection;
use crate::spec::{FieldKind, FieldSpec, ResourceSpec, SortableField};

/// Cafe search/browse: the richest spec, exercising every field kind.
///
/// `rating` filters by floored star bucket while `minRating`/`maxRating`
/// bound the raw average; `rating` is also a sort key. The `price` sort
/// orders by bracket rank (budget < moderate < premium), not by the
/// token's spelling.
pub static CAFES: ResourceSpec = ResourceSpec {
    name: "cafes",
    endpoint: "/api/cafes",
    fields: &[
        FieldSpec {
            key: "region",
            column: "region",
            kind: FieldKind::Enumerated(&REGION),
        },
        FieldSpec {
            key: "type",
            column: "cafe_type",
            kind: FieldKind::Enumerated(&CAFE_TYPE),
        },
        FieldSpec {
            key: "price",
            column: "price_range",
            kind: FieldKind::Enumerated(&PRICE_RANGE),
        },
        FieldSpec {
            key: "status",
            column: "status",
            kind: FieldKind::Enumerated(&CONTENT_STATUS),
        },
        FieldSpec {
            key: "rating",
            column: "average_rating",
            kind: FieldKind::Bucket(&STAR_RATING),
        },
        FieldSpec {
            key: "facility",
            column: "facility_ids",
            kind: FieldKind::Keyword,
        },
        FieldSpec {
            key: "minRating",
            column: "average_rating",
            kind: FieldKind::RangeMin,
        },
        FieldSpec {
            key: "maxRating",
            column: "average_rating",
            kind: FieldKind::RangeMax,
        },
    ],
    sortable: &[
        SortableField { key: "name", column: "name" },
        SortableField { key: "rating", column: "average_rating" },
        SortableField { key: "price", column: "price_rank" },
        SortableField { key: "created_at", column: "created_at" },
    ],
    search_columns: &["name", "description", "address"],
    default_sort: Some(("created_at", SortDirection::Desc)),
};

/// Reviews of one cafe (or all, for moderation views).
pub static REVIEWS: ResourceSpec = ResourceSpec {
    name: "reviews",
    endpoint: "/api/reviews",
    fields: &[
        FieldSpec {
            key: "cafe",
            column: "cafe_id",
            kind: FieldKind::Keyword,
        },
        FieldSpec {
            key: "rating",
            column: "rating",
            kind: FieldKind::Bucket(&STAR_RATING),
        },
        FieldSpec {
            key: "visitor",
            column: "visitor_type",
            kind: FieldKind::Enumerated(&VISITOR_TYPE),
        },
        FieldSpec {
            key: "status",
            column: "status",
            kind: FieldKind::Enumerated(&CONTENT_STATUS),
        },
    ],
    sortable: &[
        SortableField { key: "created_at", column: "created_at" },
        SortableField { key: "rating", column: "rating" },
    ],
    search_columns: &["content", "author"],
    default_sort: Some(("created_at", SortDirection::Desc)),
};

/// Facility vocabulary (wifi, mushola, outdoor seating, ...).
pub static FACILITIES: ResourceSpec = ResourceSpec {
    name: "facilities",
    endpoint: "/api/facilities",
    fields: &[],
    sortable: &[
        SortableField { key: "name", column: "name" },
        SortableField { key: "created_at", column: "created_at" },
    ],
    search_columns: &["name"],
    default_sort: Some(("name", SortDirection::Asc)),
};

/// Taxonomy terms, grouped by vocabulary.
pub static TERMS: ResourceSpec = ResourceSpec {
    name: "terms",
    endpoint: "/api/terms",
    fields: &[FieldSpec {
        key: "vocabulary",
        column: "vocabulary",
        kind: FieldKind::Keyword,
    }],
    sortable: &[
        SortableField { key: "name", column: "name" },
        SortableField { key: "created_at", column: "created_at" },
    ],
    search_columns: &["name"],
    default_sort: Some(("name", SortDirection::Asc)),
};

/// All registered resource specs.
pub static ALL: &[&ResourceSpec] = &[&CAFES, &REVIEWS, &FACILITIES, &TERMS];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{translate, Predicate};
    use crate::query::RawQuery;

    #[test]
    fn endpoints_and_names_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.endpoint, b.endpoint);
            }
        }
    }

    #[test]
    fn every_default_sort_is_in_its_own_allow_list() {
        for spec in ALL {
            if let Some((key, _)) = spec.default_sort {
                assert!(
                    spec.sortable(key).is_some(),
                    "{}: default sort `{key}` not sortable",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn filter_keys_never_shadow_reserved_keys() {
        for spec in ALL {
            for field in spec.fields {
                assert!(
                    !crate::query::is_reserved_key(field.key),
                    "{}: `{}` is reserved",
                    spec.name,
                    field.key
                );
            }
        }
    }

    #[test]
    fn cafes_full_query_compiles_and_translates() {
        let raw = RawQuery::from_query_string(
            "region=skp&type=cs&price=$,$$&status=pub&rating=4,5&facility=wifi\
             &minRating=4.0&maxRating=4.9&search=kopi&orderBy=rating&orderDir=desc&page=2&limit=20",
        );
        let query = CAFES.compile(&raw).unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 20);
        assert_eq!(query.filter("region").unwrap().to_vec(), vec!["sukapura"]);
        assert_eq!(query.filter("type").unwrap().to_vec(), vec!["coffee_shop"]);
        assert_eq!(
            query.filter("price").unwrap().to_vec(),
            vec!["budget", "moderate"]
        );

        let set = translate(&query, &CAFES);
        // region, type, price, status, rating bucket, facility, merged range, search
        assert_eq!(set.conditions.len(), 8);
        assert!(set
            .conditions
            .iter()
            .any(|c| matches!(c, Predicate::Range { min: Some(_), max: Some(_), .. })));
        assert_eq!(set.order.unwrap().column, "average_rating");
    }

    #[test]
    fn cafes_price_sort_orders_by_rank_column() {
        let raw = RawQuery::from_query_string("orderBy=price");
        let query = CAFES.compile(&raw).unwrap();
        let set = translate(&query, &CAFES);
        assert_eq!(set.order.unwrap().column, "price_rank");
    }

    #[test]
    fn reviews_default_to_newest_first() {
        let query = REVIEWS.compile(&RawQuery::new()).unwrap();
        assert_eq!(query.sort_key.as_deref(), Some("created_at"));
        assert_eq!(query.sort_dir, SortDirection::Desc);
    }

    #[test]
    fn vocabularies_default_to_alphabetical() {
        for spec in [&FACILITIES, &TERMS] {
            let query = spec.compile(&RawQuery::new()).unwrap();
            assert_eq!(query.sort_key.as_deref(), Some("name"));
            assert_eq!(query.sort_dir, SortDirection::Asc);
        }
    }

    #[test]
    fn terms_filter_by_vocabulary() {
        let raw = RawQuery::from_query_string("vocabulary=facility");
        let query = TERMS.compile(&raw).unwrap();
        let set = translate(&query, &TERMS);
        assert_eq!(
            set.conditions,
            vec![Predicate::Eq { column: "vocabulary", value: "facility".into() }]
        );
    }
}
