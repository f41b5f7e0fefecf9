//! # Cache Benchmarks
//!
//! Performance of cart reconciliation.
//!
//! Run with: `cargo bench -p bistro-core`

use bistro_core::{
    Cart, CartCache, CartEdit, CartItem, CartPatch, CartToken, HubEvent, LineId, MenuItemId, Money,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

fn cart_with_lines(size: usize) -> Cart {
    let mut cart = Cart::new(CartToken::new("bench"));
    for i in 0..size {
        let id = i as u64 + 1;
        cart.items.push(CartItem {
            id: LineId(id),
            menu_item_id: MenuItemId(id),
            name: format!("item-{}", id),
            quantity: 1,
            unit_price: Money(500),
            extra_price: Money::ZERO,
            options: Vec::new(),
            note: None,
        });
    }
    cart.recalculate();
    cart
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_optimistic_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimistic_edits");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let base = cart_with_lines(size);
            b.iter(|| {
                let mut cache = CartCache::with_cart(base.clone());
                let mut ids = Vec::new();
                for line in 1..=10u64 {
                    if let Ok(id) = cache.edit(CartEdit::SetQuantity {
                        line: LineId(line),
                        quantity: 3,
                    }) {
                        ids.push(id);
                    }
                }
                for id in ids {
                    cache.rollback(id);
                }
                black_box(cache)
            });
        });
    }

    group.finish();
}

fn bench_patch_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch_merge");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let patch = CartPatch::full(&cart_with_lines(size));
            let mut cache = CartCache::with_cart(cart_with_lines(size));
            b.iter(|| black_box(cache.apply_patch(black_box(&patch))));
        });
    }

    group.finish();
}

fn bench_event_decode(c: &mut Criterion) {
    let payload = json!({ "totalAmount": 1200, "totalItems": 3 });
    c.bench_function("decode_cart_updated", |b| {
        b.iter(|| black_box(HubEvent::decode("cart-updated", black_box(&payload))))
    });
}

criterion_group!(
    benches,
    bench_optimistic_edits,
    bench_patch_merge,
    bench_event_decode
);
criterion_main!(benches);
