#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use sparhund_core::classifier::{
    extract_dns_query_names, filter_by_address_range, filter_by_transport_flags,
    split_by_transport,
};
use sparhund_core::{AddressRange, Packet, PacketBuilder, TcpFlags};

fn synthetic_capture(len: usize) -> Vec<Packet> {
    (0..len)
        .map(|i| {
            let host = (i % 250) as u8;
            match i % 4 {
                0 => PacketBuilder::tcp([192, 168, 0, host], 40000, [10, 0, 0, 1], 80)
                    .flags(TcpFlags::SYN)
                    .build(),
                1 => PacketBuilder::udp([192, 168, 0, host], 5000, [10, 0, 0, 53], 53)
                    .dns_query(i as u16, "bench.example.com")
                    .build(),
                2 => PacketBuilder::icmp([192, 168, 0, host], [10, 0, 0, 1], 8).build(),
                _ => PacketBuilder::arp([192, 168, 0, host], [10, 0, 0, 1]).build(),
            }
        })
        .collect()
}

fn benchmark_split(c: &mut Criterion) {
    let packets = synthetic_capture(10_000);
    c.bench_function("split_by_transport", |b| {
        b.iter(|| black_box(split_by_transport(&packets)))
    });
}

fn benchmark_filters(c: &mut Criterion) {
    let packets = synthetic_capture(10_000);
    let range = AddressRange::new([192, 168, 0, 1], [192, 168, 0, 100]);

    c.bench_function("filter_by_address_range", |b| {
        b.iter(|| black_box(filter_by_address_range(&packets, &range)))
    });
    c.bench_function("filter_by_transport_flags", |b| {
        b.iter(|| black_box(filter_by_transport_flags(&packets, TcpFlags::SYN)))
    });
    c.bench_function("extract_dns_query_names", |b| {
        b.iter(|| black_box(extract_dns_query_names(&packets)))
    });
}

criterion_group!(benches, benchmark_split, benchmark_filters);
criterion_main!(benches);
