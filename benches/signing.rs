//! Benchmarks for signing logic.

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use goinstant_auth::{ExtraHeaders, GroupClaim, Signer, UserIdentity};

const KEY: &str = "HKYdFdnezle2yrI2_Ph3cHz144bISk-cvuAbeAAA999";

fn signing_benches(criterion: &mut Criterion) {
    let signer = Signer::new(KEY).unwrap();
    let user = UserIdentity::new("example.com", "bar", "bob")
        .with_groups((0..10).map(|i| GroupClaim::new(i, format!("Group {i}"))))
        .with_field("email", "bob@example.com");
    let untyped_user = serde_json::to_value(&user).unwrap();
    let headers = ExtraHeaders::empty().with_key_id("key-1");

    criterion.bench_function("signing/typed", |bencher| {
        bencher.iter(|| signer.sign_sync_with_headers(&user, &headers).unwrap());
    });
    criterion.bench_function("signing/untyped", |bencher| {
        bencher.iter(|| signer.sign_sync(&untyped_user).unwrap());
    });
    criterion.bench_function("signing/minimal", |bencher| {
        let user = json!({ "domain": "example.com", "id": "bar", "displayName": "bob" });
        bencher.iter(|| signer.sign_sync(&user).unwrap());
    });
    criterion.bench_function("serialization", |bencher| {
        bencher.iter(|| signer.serialize(&user, &headers).unwrap());
    });
}

criterion_group!(benches, signing_benches);
criterion_main!(benches);
