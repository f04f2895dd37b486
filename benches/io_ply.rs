//! Measures PLY IO read (parse) and write speeds.

use criterion::{
    criterion_group, criterion_main, black_box, BenchmarkId, Criterion, Throughput,
};
use cgmath::{Point3, Vector3};

use plyvert::{
    prelude::*,
    OrientedColorVertex, PointVertex, TriangleIndex,
    io::ply::{Config, Format, Reader},
};


// ===============================================================================================
// ===== Helper utilities
// ===============================================================================================

const FORMATS: [(&str, Format); 3] = [
    ("ble", Format::BinaryLittleEndian),
    ("bbe", Format::BinaryBigEndian),
    ("ascii", Format::Ascii),
];

/// A triangulated `n × n` height field with normals and colors.
fn height_field(n: u32) -> (Vec<OrientedColorVertex<f32>>, Vec<TriangleIndex>) {
    let mut vertices = Vec::with_capacity((n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            let (fx, fy) = (x as f32 / n as f32, y as f32 / n as f32);
            vertices.push(OrientedColorVertex::new(
                Point3::new(fx, fy, (fx * 7.0).sin() * (fy * 5.0).cos()),
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new((fx * 255.0).floor(), (fy * 255.0).floor(), 128.0),
            ));
        }
    }

    let mut triangles = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = y * n + x;
            triangles.push(TriangleIndex([i, i + 1, i + n]));
            triangles.push(TriangleIndex([i + 1, i + n + 1, i + n]));
        }
    }

    (vertices, triangles)
}

fn encode(format: Format) -> Vec<u8> {
    let (vertices, triangles) = height_field(100);
    let mut out = Vec::new();
    Config::new(format)
        .into_writer(&mut out)
        .write_triangles(&vertices, OrientedColorVertex::<f32>::write_properties(), &triangles)
        .unwrap();
    out
}


// ===============================================================================================
// ===== Benchmarks
// ===============================================================================================

/// Reads all properties of the height field.
fn read_all_props(c: &mut Criterion) {
    let mut group = c.benchmark_group("ply_read_all_props");
    for &(name, format) in &FORMATS {
        let data = encode(format);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data[..], |b, data| {
            b.iter(|| {
                Reader::new(data)
                    .unwrap()
                    .read_triangles::<OrientedColorVertex<f32>>(
                        OrientedColorVertex::<f32>::read_properties(),
                    )
                    .unwrap()
            })
        });
    }
    group.finish();
}

/// Reads only positions; normals and colors have to be skipped.
fn read_positions(c: &mut Criterion) {
    let mut group = c.benchmark_group("ply_read_positions");
    for &(name, format) in &FORMATS {
        let data = encode(format);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data[..], |b, data| {
            b.iter(|| {
                Reader::new(data)
                    .unwrap()
                    .read_points::<PointVertex<f32>>(PointVertex::<f32>::read_properties())
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn write_all_props(c: &mut Criterion) {
    let (vertices, triangles) = height_field(100);
    let props = OrientedColorVertex::<f32>::write_properties();

    let mut group = c.benchmark_group("ply_write_all_props");
    for &(name, format) in &FORMATS {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                Config::new(format)
                    .into_writer(&mut out)
                    .write_triangles(&vertices, props, &triangles)
                    .unwrap();
                black_box(out)
            })
        });
    }
    group.finish();
}


criterion_group!(benches, read_all_props, read_positions, write_all_props);
criterion_main!(benches);
