use bakta_query::formats::parse_content;
use bakta_query::transform::transformer_for_format;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

fn generate_gff3(num_features: usize) -> String {
    let mut content = String::from("##gff-version 3\n##sequence-region contig_1 1 10000000\n");
    for i in 0..num_features {
        let start = i * 1000 + 1;
        let strand = if i % 2 == 0 { '+' } else { '-' };
        content.push_str(&format!(
            "contig_1\tBakta\tCDS\t{}\t{}\t.\t{}\t0\tID=ECO_{:05};Name=gene{};locus_tag=ECO_{:05};product=hypothetical protein%2C family {}\n",
            start,
            start + 899,
            strand,
            i,
            i,
            i,
            i % 17
        ));
    }
    content
}

fn generate_genbank(num_features: usize) -> String {
    let mut content = String::new();
    content.push_str("LOCUS       contig_1            10000000 bp    DNA     linear   BCT 01-JAN-2024\n");
    content.push_str("FEATURES             Location/Qualifiers\n");
    for i in 0..num_features {
        let start = i * 1000 + 1;
        let location = if i % 2 == 0 {
            format!("{}..{}", start, start + 899)
        } else {
            format!("complement({}..{})", start, start + 899)
        };
        content.push_str(&format!("     CDS             {}\n", location));
        content.push_str(&format!("                     /locus_tag=\"ECO_{:05}\"\n", i));
        content.push_str("                     /product=\"hypothetical protein with a\n");
        content.push_str("                     wrapped product name\"\n");
    }
    content.push_str("//\n");
    content
}

fn bench_parse_and_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_transform");

    for num_features in [100, 1_000, 10_000] {
        let gff3 = generate_gff3(num_features);
        let genbank = generate_genbank(num_features);
        group.throughput(Throughput::Elements(num_features as u64));

        for (name, content) in [("gff3", &gff3), ("genbank", &genbank)] {
            group.bench_with_input(BenchmarkId::new(name, num_features), content, |b, content| {
                b.iter(|| {
                    let document = parse_content(name, content.as_str()).unwrap();
                    let records = transformer_for_format(name, "bench")
                        .unwrap()
                        .transform(&document)
                        .unwrap();
                    black_box(records);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_parse_and_transform);
criterion_main!(benches);
