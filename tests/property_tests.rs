//! Property-based tests for pricing, product reference encoding and the
//! status graphs.

use chrono::Utc;
use fastfood_api::{
    models::{
        decode_product_ids, encode_product_ids, is_valid_transition, OrderStatus, PaymentStatus,
        Product, ProductCategory, TransitionPolicy,
    },
    services::orders::total_price,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use strum::IntoEnumIterator;

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn product(id: i32, price: Decimal) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: format!("item-{id}"),
        price,
        category: ProductCategory::Lanche,
        created_at: now,
        updated_at: now,
    }
}

fn order_status() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::iter().collect::<Vec<_>>())
}

fn payment_status() -> impl Strategy<Value = PaymentStatus> {
    prop::sample::select(PaymentStatus::iter().collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn total_is_the_exact_sum_of_unit_prices(prices in prop::collection::vec(price_strategy(), 1..20)) {
        let products: Vec<Product> = prices
            .iter()
            .enumerate()
            .map(|(i, p)| product(i as i32 + 1, *p))
            .collect();
        let expected_cents: i64 = prices.iter().map(|p| p.mantissa() as i64).sum();
        prop_assert_eq!(total_price(&products), Decimal::new(expected_cents, 2));
    }

    #[test]
    fn duplicating_a_product_counts_it_twice(price in price_strategy()) {
        let once = total_price(&[product(1, price)]);
        let twice = total_price(&[product(1, price), product(1, price)]);
        prop_assert_eq!(twice, once + once);
    }

    #[test]
    fn product_references_keep_order_and_duplicates(ids in prop::collection::vec(1i32..10_000, 0..30)) {
        let encoded = encode_product_ids(&ids);
        prop_assert_eq!(decode_product_ids(&encoded).unwrap(), ids);
    }

    #[test]
    fn same_status_is_always_allowed(status in order_status(), payment in payment_status()) {
        prop_assert!(is_valid_transition(TransitionPolicy::Strict, status, status));
        prop_assert!(is_valid_transition(TransitionPolicy::Strict, payment, payment));
    }

    #[test]
    fn strict_order_moves_never_go_backwards(from in order_status(), to in order_status()) {
        let position = |s: OrderStatus| OrderStatus::iter().position(|x| x == s);
        let allowed = is_valid_transition(TransitionPolicy::Strict, from, to);
        prop_assert_eq!(allowed, position(to) >= position(from));
    }

    #[test]
    fn permissive_accepts_every_pair(from in payment_status(), to in payment_status()) {
        prop_assert!(is_valid_transition(TransitionPolicy::Permissive, from, to));
    }

    #[test]
    fn arbitrary_tokens_never_parse_as_statuses(token in "[a-z]{1,12}") {
        prop_assert!(OrderStatus::parse(&token).is_err());
        prop_assert!(PaymentStatus::parse(&token).is_err());
    }
}
