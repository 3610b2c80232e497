//! Criterion benchmarks for relic-core.
//!
//! ## Benchmark groups
//!
//! 1. **unit_parser**: Java source units of increasing size.
//! 2. **config_parser**: Routing documents with many mappings.
//! 3. **idl_parser**: IDL documents with many interfaces.
//! 4. **scan**: Full repository scans at different pool sizes.
//! 5. **views**: Signature and relation projections of a scanned model.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/relic-core/Cargo.toml
//! # Run only the scan group:
//! cargo bench --manifest-path crates/relic-core/Cargo.toml -- scan
//! ```

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use relic_core::indexer::idl::parse_interface_definitions;
use relic_core::indexer::routing::parse_routing_config;
use relic_core::indexer::unit::{parse_parameters, parse_unit};
use relic_core::query::relations::relation_edges;
use relic_core::query::signatures::signature_entries;
use relic_core::{scan_repository, ScanConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A Java action class with `n_methods` handler-shaped methods.
fn synthetic_unit(package: &str, name: &str, n_methods: usize) -> String {
    let mut src = format!(
        "package {package};\n\nimport org.apache.struts.action.Action;\nimport java.util.List;\n\n\
         @Deprecated\npublic class {name} extends Action implements Auditable {{\n    \
         private static final int LIMIT = 10;\n    private AccountService accountService;\n\n"
    );
    for i in 0..n_methods {
        src.push_str(&format!(
            "    @Override\n    public ActionForward handle{i}(ActionMapping mapping, ActionForm form, \
             HttpServletRequest request, HttpServletResponse response) throws Exception {{\n        \
             String id = request.getParameter(\"id\");\n        \
             if (id == null) {{\n            return mapping.findForward(\"failure\");\n        }}\n        \
             accountService.load(id);\n        return mapping.findForward(\"success\");\n    }}\n\n"
        ));
    }
    src.push_str("}\n");
    src
}

fn synthetic_config(n_mappings: usize) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\"?>\n<struts-config>\n  <form-beans>\n",
    );
    for i in 0..n_mappings {
        xml.push_str(&format!(
            "    <form-bean name=\"form{i}\" type=\"com.acme.web.Form{i}\"/>\n"
        ));
    }
    xml.push_str("  </form-beans>\n  <action-mappings>\n");
    for i in 0..n_mappings {
        xml.push_str(&format!(
            "    <action path=\"/route{i}\" type=\"com.acme.web.Action{i}\" name=\"form{i}\" scope=\"request\">\n      \
             <forward name=\"success\" path=\"/page{i}.jsp\"/>\n    </action>\n"
        ));
    }
    xml.push_str("  </action-mappings>\n</struts-config>\n");
    xml
}

fn synthetic_idl(n_interfaces: usize) -> String {
    let mut idl = String::from("module Bank {\n");
    for i in 0..n_interfaces {
        idl.push_str(&format!(
            "  interface Account{i} {{\n    readonly attribute string owner;\n    \
             double balance();\n    void deposit(in double amount);\n  }};\n"
        ));
    }
    idl.push_str("};\n");
    idl
}

/// Write a repository with `n_units` source files, one routing document and
/// one IDL document.
fn populate_repo(root: &Path, n_units: usize) {
    let dir = root.join("src/com/acme/web");
    fs::create_dir_all(&dir).unwrap();
    for i in 0..n_units {
        let name = format!("Action{i}");
        fs::write(
            dir.join(format!("{name}.java")),
            synthetic_unit("com.acme.web", &name, 4),
        )
        .unwrap();
    }
    fs::create_dir_all(root.join("WEB-INF")).unwrap();
    fs::write(
        root.join("WEB-INF/struts-config.xml"),
        synthetic_config(n_units),
    )
    .unwrap();
    fs::write(root.join("bank.idl"), synthetic_idl(8)).unwrap();
}

// ---------------------------------------------------------------------------
// Benchmark: Unit parser
// ---------------------------------------------------------------------------

fn bench_unit_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit_parser");

    for n in [1usize, 10, 50] {
        let src = synthetic_unit("com.acme.web", "LoginAction", n);
        group.bench_with_input(BenchmarkId::new("parse_unit", n), &src, |b, src| {
            b.iter(|| parse_unit(black_box(src), "LoginAction.java"));
        });
    }

    group.bench_function("parse_parameters_generic", |b| {
        b.iter(|| {
            parse_parameters(black_box(
                "final Map<String, List<Integer>> index, @Valid LoginForm form, int... ids",
            ))
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Config parser
// ---------------------------------------------------------------------------

fn bench_config_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parser");

    for n in [10usize, 200] {
        let xml = synthetic_config(n);
        group.bench_with_input(BenchmarkId::new("parse_routing_config", n), &xml, |b, xml| {
            b.iter(|| parse_routing_config(black_box(xml), "struts-config.xml"));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: IDL parser
// ---------------------------------------------------------------------------

fn bench_idl_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("idl_parser");

    for n in [5usize, 100] {
        let idl = synthetic_idl(n);
        group.bench_with_input(
            BenchmarkId::new("parse_interface_definitions", n),
            &idl,
            |b, idl| {
                b.iter(|| parse_interface_definitions(black_box(idl), "bank.idl"));
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Repository scan
// ---------------------------------------------------------------------------

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    group.sample_size(20);

    let dir = tempfile::tempdir().unwrap();
    populate_repo(dir.path(), 100);

    for workers in [1usize, 4, 10] {
        let config = ScanConfig::default().with_max_concurrent_parses(workers);
        group.bench_with_input(
            BenchmarkId::new("scan_repository_100_units", workers),
            &config,
            |b, config| {
                b.iter(|| scan_repository(black_box(dir.path()), config));
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Collaborator views
// ---------------------------------------------------------------------------

fn bench_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("views");

    let dir = tempfile::tempdir().unwrap();
    populate_repo(dir.path(), 50);
    let model = scan_repository(dir.path(), &ScanConfig::default());

    group.bench_function("signature_entries", |b| {
        b.iter(|| signature_entries(black_box(&model)));
    });

    group.bench_function("relation_edges", |b| {
        b.iter(|| relation_edges(black_box(&model)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_unit_parser,
    bench_config_parser,
    bench_idl_parser,
    bench_scan,
    bench_views,
);
criterion_main!(benches);
