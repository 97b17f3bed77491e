#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use sparhund_config::DetectionConfig;
use sparhund_core::{Packet, PacketBuilder, TcpFlags};
use sparhund_detection::default_detectors;

fn mixed_capture(len: usize) -> Vec<Packet> {
    (0..len)
        .map(|i| {
            let host = (i % 200) as u8;
            let ts = i as u64 * 100;
            match i % 5 {
                0 => PacketBuilder::tcp([192, 168, 1, host], 40000, [10, 0, 0, 1], 80)
                    .payload("GET /search?q=shoes&page=2 HTTP/1.1\r\nHost: shop\r\n\r\n")
                    .timestamp_us(ts)
                    .build(),
                1 => PacketBuilder::tcp([192, 168, 1, host], 40001, [10, 0, 0, 1], 22)
                    .flags(TcpFlags::SYN)
                    .timestamp_us(ts)
                    .build(),
                2 => PacketBuilder::udp([10, 0, 0, 53], 53, [192, 168, 1, host], 40002)
                    .dns_response(i as u16, format!("host{host}.example.com"), 0)
                    .timestamp_us(ts)
                    .build(),
                3 => PacketBuilder::tcp([192, 168, 1, host], 40003, [10, 0, 0, 1], 21)
                    .payload("USER anonymous\r\n")
                    .timestamp_us(ts)
                    .build(),
                _ => PacketBuilder::icmp([192, 168, 1, host], [10, 0, 0, 1], 8)
                    .timestamp_us(ts)
                    .build(),
            }
        })
        .collect()
}

fn benchmark_detectors(c: &mut Criterion) {
    let packets = mixed_capture(10_000);
    let detectors = default_detectors(&DetectionConfig::default()).unwrap();

    for detector in detectors {
        c.bench_function(detector.name(), |b| {
            b.iter(|| black_box(detector.detect(&packets)))
        });
    }
}

criterion_group!(benches, benchmark_detectors);
criterion_main!(benches);
