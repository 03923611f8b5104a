use crate::domain::order::Order;

/// One independent condition on an order. A query ANDs all of its predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPredicate {
    /// Exact, case-sensitive phone match
    PhoneEquals(String),
    /// Case-insensitive substring of the first name
    FirstNameContains(String),
    /// Case-insensitive substring of the last name
    LastNameContains(String),
}

impl OrderPredicate {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderPredicate::PhoneEquals(phone) => order.customer_phone == *phone,
            OrderPredicate::FirstNameContains(part) => {
                contains_ignore_case(&order.customer_first_name, part)
            }
            OrderPredicate::LastNameContains(part) => {
                contains_ignore_case(&order.customer_last_name, part)
            }
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Bounded scan request: predicates plus a zero-indexed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub predicates: Vec<OrderPredicate>,
    pub offset: u64,
    pub limit: u64,
}

impl OrderQuery {
    /// An empty predicate list matches everything.
    pub fn matches(&self, order: &Order) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(order))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub orders: Vec<Order>,
    /// Matches across all pages, not just this window
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn order(first: &str, last: &str, phone: &str) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::now_v7(),
            version: 1,
            customer_first_name: first.to_string(),
            customer_last_name: last.to_string(),
            customer_phone: phone.to_string(),
            delivery_address: "Calle Mayor 1".to_string(),
            pilotes: 5,
            total_price: 665,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_name_predicates_ignore_case() {
        let o = order("Mikael", "Blomkvist", "5550000001");

        assert!(OrderPredicate::FirstNameContains("mik".to_string()).matches(&o));
        assert!(OrderPredicate::FirstNameContains("KAE".to_string()).matches(&o));
        assert!(OrderPredicate::LastNameContains("kvist".to_string()).matches(&o));
        assert!(!OrderPredicate::LastNameContains("salander".to_string()).matches(&o));
    }

    #[test]
    fn test_phone_predicate_is_exact() {
        let o = order("Lisbeth", "Salander", "5550000001");

        assert!(OrderPredicate::PhoneEquals("5550000001".to_string()).matches(&o));
        assert!(!OrderPredicate::PhoneEquals("555000000".to_string()).matches(&o));
    }

    #[test]
    fn test_predicates_are_anded() {
        let o = order("Mikael", "Blomkvist", "5550000001");
        let query = OrderQuery {
            predicates: vec![
                OrderPredicate::FirstNameContains("mik".to_string()),
                OrderPredicate::PhoneEquals("5559999999".to_string()),
            ],
            offset: 0,
            limit: 20,
        };

        assert!(!query.matches(&o));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = OrderQuery {
            predicates: vec![],
            offset: 0,
            limit: 20,
        };
        assert!(query.matches(&order("A", "B", "5550000001")));
    }
}
