use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ceiling for the budget listing, in paisa (Rs. 299).
pub const UNDER_299_CEILING_PAISA: i64 = 29900;

/// The three storefront promotion surfaces. `Under299` is price-derived and
/// needs no offer rows; the other two list products linked to a live offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    Under299,
    SpecialDeals,
    DealOfMonth,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Under299 => "under_299",
            OfferType::SpecialDeals => "special_deals",
            OfferType::DealOfMonth => "deal_of_month",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "under_299" => Some(OfferType::Under299),
            "special_deals" => Some(OfferType::SpecialDeals),
            "deal_of_month" => Some(OfferType::DealOfMonth),
            _ => None,
        }
    }
}

/// A time-boxed promotion. Products join an offer through explicit links;
/// an offer only surfaces its products while active and inside its window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub offer_type: OfferType,
    /// Whole-percent discount shown on promotion banners.
    pub discount_percent: Option<i32>,
    pub discount_amount_paisa: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(
        name: impl Into<String>,
        offer_type: OfferType,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            offer_type,
            discount_percent: None,
            discount_amount_paisa: None,
            start_date,
            end_date,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether the offer surfaces products at the given instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn offer_types_round_trip_through_strings() {
        for offer_type in [
            OfferType::Under299,
            OfferType::SpecialDeals,
            OfferType::DealOfMonth,
        ] {
            assert_eq!(OfferType::parse(offer_type.as_str()), Some(offer_type));
        }
        assert_eq!(OfferType::parse("flash_sale"), None);
    }

    #[test]
    fn offers_are_live_only_inside_their_window() {
        let now = Utc::now();
        let offer = Offer::new(
            "Eid Special",
            OfferType::SpecialDeals,
            now - Duration::days(1),
            now + Duration::days(1),
        );
        assert!(offer.is_live(now));
        assert!(!offer.is_live(now + Duration::days(2)));
        assert!(!offer.is_live(now - Duration::days(2)));

        let mut retired = offer.clone();
        retired.is_active = false;
        assert!(!retired.is_live(now));
    }
}
