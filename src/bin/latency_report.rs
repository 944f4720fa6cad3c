use hdrhistogram::Histogram;
use pricebook::{ArrayContainer, Goods, LinkedContainer};
use rust_decimal::Decimal;
use std::time::{Duration, Instant};

const ITERATIONS: u64 = 100_000;

fn gadget(i: u64) -> Goods {
    // Scatter prices so sorts have work to do
    let cents = (i.wrapping_mul(2_654_435_761) % 100_000) as i64;
    Goods::gadget("widget", Decimal::new(cents, 2), (i % 36) as u16)
}

/// Time `op` once per iteration and print the percentile table.
fn report(label: &str, iterations: u64, mut op: impl FnMut(u64)) {
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3).unwrap();
    let mut total = Duration::ZERO;

    for i in 0..iterations {
        let start = Instant::now();
        op(i);
        let elapsed = start.elapsed();
        // Saturate outliers rather than panic
        histogram.saturating_record(elapsed.as_nanos() as u64);
        total += elapsed;
    }

    println!("\n=== {} (ns) ===", label);
    println!("Total Ops:  {}", iterations);
    println!("Throughput: {:.2} ops/sec", iterations as f64 / total.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:8} ns", histogram.min());
    println!("P50:    {:8} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:8} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:8} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:8} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:8} ns", histogram.max());
}

fn main() {
    println!("Preparing Latency Benchmark...");
    println!("Running {} iterations per operation...", ITERATIONS);

    let mut array = ArrayContainer::new();
    report("ArrayContainer::add", ITERATIONS, |i| {
        std::hint::black_box(array.add(gadget(i)).unwrap());
    });

    let mut list = LinkedContainer::new();
    report("LinkedContainer::add_last", ITERATIONS, |i| {
        std::hint::black_box(list.add_last(gadget(i)).unwrap());
    });

    // O(n) scans: fewer samples
    report("ArrayContainer::get_by_insertion_id", 1_000, |i| {
        std::hint::black_box(array.get_by_insertion_id(i * 97 % ITERATIONS));
    });
    report("LinkedContainer::get_by_insertion_id", 1_000, |i| {
        std::hint::black_box(list.get_by_insertion_id(i * 97 % ITERATIONS));
    });

    report("ArrayContainer::remove_at(middle)", 1_000, |_| {
        let middle = array.count() / 2;
        std::hint::black_box(array.remove_at(middle).unwrap());
    });
    report("LinkedContainer::remove_at(middle)", 1_000, |_| {
        let middle = list.count() / 2;
        std::hint::black_box(list.remove_at(middle).unwrap());
    });

    // Quadratic sorts on small books
    report("ArrayContainer::sort (n=500)", 20, |round| {
        let mut book = ArrayContainer::with_capacity(500);
        for i in 0..500 {
            book.add(gadget(i + round * 500)).unwrap();
        }
        book.sort();
        std::hint::black_box(book.count());
    });
    report("LinkedContainer::sort (n=500)", 20, |round| {
        let mut book = LinkedContainer::with_capacity(500);
        for i in 0..500 {
            book.add_last(gadget(i + round * 500)).unwrap();
        }
        book.sort();
        std::hint::black_box(book.count());
    });
}
