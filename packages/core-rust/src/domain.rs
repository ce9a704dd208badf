//! Enumerated domain fields and their alias tables.
//!
//! Every filterable enum field of the catalog (region, cafe type, price
//! range, content status, star rating, visitor type) is described by a
//! static [`DomainField`]: the set of canonical tokens stored in the
//! catalog plus the short aliases accepted in query input. Canonical
//! tokens are what the storage layer compares against; aliases exist only
//! at the query boundary and are resolved by
//! [`normalize`](crate::alias::normalize).

use std::sync::LazyLock;

use regex::Regex;

/// A single enumerated domain field: its canonical values and alias map.
///
/// Invariant: every canonical value has at most one alias, and no alias
/// collides with a canonical value of the same field.
#[derive(Debug, Clone, Copy)]
pub struct DomainField {
    /// Field name, used in log messages and spec tables.
    pub name: &'static str,
    /// Canonical tokens, exactly as stored in the catalog.
    pub values: &'static [&'static str],
    /// `(alias, canonical)` pairs. Alias lookup is exact, then lower-cased.
    pub aliases: &'static [(&'static str, &'static str)],
}

impl DomainField {
    /// Whether `token` is one of this field's canonical values (exact match).
    #[must_use]
    pub fn is_canonical(&self, token: &str) -> bool {
        self.values.contains(&token)
    }

    /// Resolves a raw query token to a canonical value.
    ///
    /// Resolution order:
    /// 1. exact alias match
    /// 2. lower-cased alias match
    /// 3. the token itself, if canonical
    /// 4. the token lower-cased, then upper-cased, if canonical
    ///
    /// Returns `None` for tokens that resolve to nothing; callers drop
    /// those silently (permissive filter policy).
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&'static str> {
        let lookup_alias = |t: &str| {
            self.aliases
                .iter()
                .find(|(alias, _)| *alias == t)
                .map(|(_, canonical)| *canonical)
        };

        if let Some(canonical) = lookup_alias(token) {
            return Some(canonical);
        }
        let lowered = token.to_lowercase();
        if let Some(canonical) = lookup_alias(&lowered) {
            return Some(canonical);
        }

        let find_canonical = |t: &str| self.values.iter().find(|v| **v == t).copied();

        find_canonical(token)
            .or_else(|| find_canonical(&lowered))
            .or_else(|| find_canonical(&token.to_uppercase()))
    }

    /// 1-based position of a canonical token in the value table.
    ///
    /// For ordered fields this is the token's numeric level: star ratings
    /// map `ONE` -> 1 through `FIVE` -> 5, which is what bucket predicates
    /// compare against floored numeric columns.
    #[must_use]
    pub fn level(&self, token: &str) -> Option<u8> {
        self.values
            .iter()
            .position(|v| *v == token)
            .map(|index| u8::try_from(index + 1).unwrap_or(u8::MAX))
    }
}

// ---------------------------------------------------------------------------
// Field tables
// ---------------------------------------------------------------------------

/// Bandung district a cafe belongs to.
pub static REGION: DomainField = DomainField {
    name: "region",
    values: &[
        "sukapura",
        "batununggal",
        "coblong",
        "sukajadi",
        "buahbatu",
        "lengkong",
    ],
    aliases: &[
        ("skp", "sukapura"),
        ("btn", "batununggal"),
        ("cbl", "coblong"),
        ("skj", "sukajadi"),
        ("bhb", "buahbatu"),
        ("lkg", "lengkong"),
    ],
};

/// Broad category of the venue.
pub static CAFE_TYPE: DomainField = DomainField {
    name: "cafe_type",
    values: &["coffee_shop", "roastery", "workspace", "outdoor", "eatery"],
    aliases: &[
        ("cs", "coffee_shop"),
        ("ro", "roastery"),
        ("ws", "workspace"),
        ("od", "outdoor"),
        ("ea", "eatery"),
    ],
};

/// Price bracket. Ordered: budget < moderate < premium (see [`price_rank`]).
pub static PRICE_RANGE: DomainField = DomainField {
    name: "price_range",
    values: &["budget", "moderate", "premium"],
    aliases: &[("$", "budget"), ("$$", "moderate"), ("$$$", "premium")],
};

/// Editorial lifecycle state of a record.
pub static CONTENT_STATUS: DomainField = DomainField {
    name: "status",
    values: &["draft", "published", "archived"],
    aliases: &[("dr", "draft"), ("pub", "published"), ("arc", "archived")],
};

/// Discrete star level a continuous rating buckets into.
///
/// Canonical tokens are upper-case words; the numeric aliases (`"4"` ->
/// `FOUR`) mirror what the UI filter chips submit. Bucketing is
/// floor-based: a 4.9 average is still `FOUR` (see
/// [`star_level`] and the bucket predicate).
pub static STAR_RATING: DomainField = DomainField {
    name: "star_rating",
    values: &["ONE", "TWO", "THREE", "FOUR", "FIVE"],
    aliases: &[
        ("1", "ONE"),
        ("2", "TWO"),
        ("3", "THREE"),
        ("4", "FOUR"),
        ("5", "FIVE"),
    ],
};

/// Self-reported visitor category on a review.
pub static VISITOR_TYPE: DomainField = DomainField {
    name: "visitor_type",
    values: &["solo", "couple", "group", "family", "student"],
    aliases: &[
        ("sl", "solo"),
        ("cp", "couple"),
        ("gr", "group"),
        ("fm", "family"),
        ("st", "student"),
    ],
};

// ---------------------------------------------------------------------------
// Derived lookups
// ---------------------------------------------------------------------------

/// Numeric rank of a canonical price-range token, for ordering.
///
/// budget = 0, moderate = 1, premium = 2.
#[must_use]
pub fn price_rank(token: &str) -> Option<u8> {
    match token {
        "budget" => Some(0),
        "moderate" => Some(1),
        "premium" => Some(2),
        _ => None,
    }
}

/// Numeric star level of a canonical star-rating token (1..=5).
#[must_use]
pub fn star_level(token: &str) -> Option<u8> {
    match token {
        "ONE" => Some(1),
        "TWO" => Some(2),
        "THREE" => Some(3),
        "FOUR" => Some(4),
        "FIVE" => Some(5),
        _ => None,
    }
}

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug regex is valid"));

/// Whether `slug` is a well-formed URL slug (lowercase alphanumeric
/// segments joined by single hyphens).
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}
