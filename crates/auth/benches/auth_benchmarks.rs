use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use notekeeper_auth::{CredentialHasher, HasherParams, TokenIssuer};
use notekeeper_core::UserId;

fn bench_password_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("password_hashing");
    group.sample_size(10);

    // Cost grows linearly with memory; the default is the production setting.
    for memory_kib in [8 * 1024, HasherParams::default().memory_kib] {
        let hasher = CredentialHasher::new(HasherParams {
            memory_kib,
            ..HasherParams::default()
        })
        .unwrap();
        let hash = hasher.hash("correct horse battery staple").unwrap();

        group.bench_with_input(BenchmarkId::new("hash", memory_kib), &hasher, |b, hasher| {
            b.iter(|| hasher.hash(black_box("correct horse battery staple")).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("verify", memory_kib), &hasher, |b, hasher| {
            b.iter(|| hasher.verify(&hash, black_box("correct horse battery staple")).unwrap());
        });
    }

    group.finish();
}

fn bench_session_tokens(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_tokens");
    let issuer = TokenIssuer::new(b"bench-secret");
    let now = Utc::now();
    let token = issuer
        .issue(UserId::from_i64(42), now, Duration::hours(12))
        .unwrap();

    group.bench_function("issue", |b| {
        b.iter(|| issuer.issue(black_box(UserId::from_i64(42)), now, Duration::hours(12)).unwrap());
    });
    group.bench_function("verify", |b| {
        b.iter(|| issuer.verify(black_box(&token), now).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_password_hashing, bench_session_tokens);
criterion_main!(benches);
