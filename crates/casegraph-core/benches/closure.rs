//! Closure benchmarks over seeded stores: a long chain stresses the pass
//! count, a clique stresses the per-pass result width.

use casegraph_core::db::{migrations, query};
use casegraph_core::graph::closure::resolve_exact_match_closure;
use casegraph_core::model::association::{AssociationType, NewAssociation};
use casegraph_core::model::item::{NewDocument, NewItem};
use criterion::{Criterion, criterion_group, criterion_main};
use rusqlite::Connection;
use std::hint::black_box;

fn seeded_store(item_count: usize) -> Connection {
    let mut conn = Connection::open_in_memory().expect("open in-memory db");
    migrations::migrate(&mut conn).expect("migrate");

    query::insert_document(
        &conn,
        &NewDocument {
            doc_id: "doc-1".to_string(),
            title: "Benchmark".to_string(),
        },
    )
    .expect("insert document");

    for idx in 0..item_count {
        query::insert_item(
            &conn,
            &NewItem {
                item_id: format!("cg-{idx}"),
                doc_id: "doc-1".to_string(),
                identifier: format!("urn:{idx}"),
                full_statement: format!("Statement {idx}"),
                ..NewItem::default()
            },
        )
        .expect("insert item");
    }

    conn
}

fn match_edge(conn: &Connection, n: usize, origin: usize, destination: usize) {
    query::insert_association(
        conn,
        &NewAssociation {
            assoc_id: format!("as-{n}"),
            doc_id: "doc-1".to_string(),
            assoc_type: AssociationType::ExactMatchOf,
            origin_identifier: format!("urn:{origin}"),
            destination_identifier: format!("urn:{destination}"),
        },
    )
    .expect("insert association");
}

fn chain_store(item_count: usize) -> Connection {
    let conn = seeded_store(item_count);
    for idx in 0..item_count - 1 {
        match_edge(&conn, idx, idx, idx + 1);
    }
    conn
}

fn clique_store(item_count: usize) -> Connection {
    let conn = seeded_store(item_count);
    let mut n = 0;
    for origin in 0..item_count {
        for destination in origin + 1..item_count {
            match_edge(&conn, n, origin, destination);
            n += 1;
        }
    }
    conn
}

fn bench_closure(c: &mut Criterion) {
    let chain = chain_store(128);
    c.bench_function("closure_chain_128", |b| {
        b.iter(|| {
            let result =
                resolve_exact_match_closure(&chain, black_box("urn:0")).expect("closure");
            black_box(result)
        });
    });

    let clique = clique_store(32);
    c.bench_function("closure_clique_32", |b| {
        b.iter(|| {
            let result =
                resolve_exact_match_closure(&clique, black_box("urn:0")).expect("closure");
            black_box(result)
        });
    });

    let unknown = seeded_store(16);
    c.bench_function("closure_unknown_seed", |b| {
        b.iter(|| {
            let result =
                resolve_exact_match_closure(&unknown, black_box("urn:ghost")).expect("closure");
            black_box(result)
        });
    });
}

criterion_group!(benches, bench_closure);
criterion_main!(benches);
