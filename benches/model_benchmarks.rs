use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use library::api::form::FormData;
use library::api::respond;
use library::db::{PageParams, Pagination};
use library::models::{Book, Category};
use library::resources::Resource;

fn book_form() -> FormData {
    FormData::from_pairs([
        ("category_id", "6ba7b810-9dad-11d1-80b4-00c04fd430c8"),
        ("title", "Dune"),
        ("book_no", "B-1"),
        ("author", "Frank Herbert"),
        ("price", "9.99"),
        ("status", "1"),
    ])
}

fn bench_form_binding(c: &mut Criterion) {
    let form = book_form();

    c.bench_function("book_bind", |b| {
        b.iter(|| {
            let mut book = Book::default();
            book.bind(black_box(&form)).unwrap();
            book
        })
    });

    let empty = FormData::default();
    c.bench_function("category_bind_empty", |b| {
        b.iter(|| {
            let mut category = Category::default();
            category.bind(black_box(&empty)).unwrap();
            category
        })
    });
}

fn bench_validation(c: &mut Criterion) {
    let mut valid = Book::default();
    valid.bind(&book_form()).unwrap();
    let invalid = Book::default();

    c.bench_function("book_check_valid", |b| b.iter(|| black_box(&valid).check()));
    c.bench_function("book_check_invalid", |b| {
        b.iter(|| black_box(&invalid).check())
    });
}

fn bench_pagination(c: &mut Criterion) {
    let params = PageParams {
        page: Some("3".to_string()),
        per_page: Some("25".to_string()),
    };

    c.bench_function("pagination_from_params", |b| {
        b.iter(|| Pagination::from_params(black_box(&params), 10).with_total(1000))
    });
}

fn bench_representations(c: &mut Criterion) {
    let categories: Vec<Category> = (0..50)
        .map(|i| Category {
            category_name: format!("Category {}", i),
            status: 1,
            ..Default::default()
        })
        .collect();

    c.bench_function("categories_to_json", |b| {
        b.iter(|| serde_json::to_string(black_box(&categories)))
    });

    c.bench_function("categories_to_xml", |b| {
        b.iter(|| {
            respond::xml_list(
                axum::http::StatusCode::OK,
                "categories",
                "category",
                black_box(&categories),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_form_binding,
    bench_validation,
    bench_pagination,
    bench_representations,
);
criterion_main!(benches);
