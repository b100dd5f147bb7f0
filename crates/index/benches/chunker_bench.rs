//! Benchmarks for code chunking operations
//!
//! Run with: cargo bench

use codestore_core::{FileId, ProjectId};
use codestore_index::{ChunkRequest, Chunker, WhitespaceChunker};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn generate_source(lines: usize) -> String {
  let mut code = String::new();
  for i in 0..(lines / 20) {
    code.push_str(&format!(
      "fn function_{i}(arg: i32) -> i32 {{\n    let result = arg * 2;\n    result\n}}\n\nstruct Struct{i} {{\n    field_a: String,\n    field_b: i32,\n}}\n\n"
    ));
  }
  code
}

fn bench_chunk_by_paragraphs(c: &mut Criterion) {
  let mut group = c.benchmark_group("chunk_by_paragraphs");
  let chunker = WhitespaceChunker::default();
  let project_id = ProjectId::new();

  for size in [100, 500, 1000, 2000].iter() {
    let source = generate_source(*size);
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
      b.iter(|| {
        chunker.chunk(ChunkRequest {
          file_id: FileId(1),
          project_id,
          source: black_box(source),
          entities: &[],
        })
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_chunk_by_paragraphs);
criterion_main!(benches);
