use criterion::{black_box, criterion_group, criterion_main, Criterion};
use log::LevelFilter;
use std::io::Cursor;

use classmap::core::container::ContainerType;
use classmap::core::filter::TypeFilter;
use classmap::core::traversal::ArchiveWalker;
use classmap::core::TypeCollector;
use classmap::engine::{CallGraphAlgorithm, CallGraphBuilder, GraphEngine};
use classmap::{Analyzer, AnalyzerConfig, LogContext, TableOutputs};

#[path = "../tests/common/mod.rs"]
mod common;

use common::*;

fn service_class(package: &str, index: usize) -> Vec<u8> {
    let name = format!("{}/Service{}", package, index);
    let next = format!("{}/Service{}", package, (index + 1) % 50);
    ClassBuilder::new(&name)
        .field(ACC_PRIVATE, "value", "I")
        .field(ACC_PUBLIC | ACC_STATIC, "INSTANCES", "Ljava/util/List;")
        .method(ACC_PUBLIC, "<init>", "()V")
        .method_calling(
            ACC_PUBLIC,
            "process",
            "(I)I",
            vec![
                new_instance(&next),
                invoke_special(&next, "<init>", "()V"),
                invoke_virtual(&next, "process", "(I)I"),
                Op::Pop,
            ],
        )
        .method(ACC_PUBLIC, "process", "(Ljava/lang/String;)I")
        .build()
}

/// An ear holding a war and a jar, each with a module's worth of services.
fn sample_archive() -> Vec<u8> {
    let mut war = ArchiveBuilder::new();
    let mut jar = ArchiveBuilder::new();
    for index in 0..50 {
        war = war.class(
            &format!("com/bench/web/Service{}", index),
            &service_class("com/bench/web", index),
        );
        jar = jar.class(
            &format!("com/bench/core/Service{}", index),
            &service_class("com/bench/core", index),
        );
    }
    let war = war.entry("WEB-INF/lib/core.jar", &jar.build()).build();
    ArchiveBuilder::new().entry("web.war", &war).build()
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_analysis");
    let archive = sample_archive();

    group.bench_function("traverse_and_index", |b| {
        b.iter(|| {
            let log = LogContext::new(LevelFilter::Off);
            let walker = ArchiveWalker::new(log.clone());
            let mut collector = TypeCollector::new(log, TypeFilter::default());
            let stats = walker.walk_reader(
                "bench.ear",
                ContainerType::Ear,
                Cursor::new(black_box(archive.as_slice())),
                &mut collector,
            );
            black_box((stats, collector.symbols().len()))
        });
    });

    group.bench_function("call_graph", |b| {
        let classes: Vec<Vec<u8>> = (0..50)
            .map(|index| service_class("com/bench/core", index))
            .collect();
        b.iter(|| {
            let mut engine =
                CallGraphBuilder::new(CallGraphAlgorithm::ZeroOneCfa, LogContext::new(LevelFilter::Off));
            for bytes in &classes {
                if let Ok(descriptor) = classmap::core::TypeDescriptor::from_bytes(bytes) {
                    engine.add_candidate(&descriptor, bytes);
                }
            }
            let graph = engine.build_graph();
            engine.cleanup();
            black_box(graph)
        });
    });

    let dir = tempfile::TempDir::new().unwrap();
    let input = write_file(dir.path(), "bench.ear", &archive);
    group.bench_function("end_to_end", |b| {
        b.iter(|| {
            let config = AnalyzerConfig::new([&input], dir.path().join("out"))
                .with_table_outputs(TableOutputs::SymRefTables)
                .with_log_level(LevelFilter::Off);
            black_box(Analyzer::new(config).run().unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_analysis);
criterion_main!(benches);
