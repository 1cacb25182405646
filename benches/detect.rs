use criterion::{black_box, criterion_group, criterion_main, Criterion};
use decodex::{Analyzer, CipherBreaker, CrossChecker, Detector, HashIdentifier, ScoreProfile};

const SENTENCE: &str = "The quick brown fox jumps over the lazy dog near the riverbank";

fn bench_single_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_layer");
    let detector = Detector::default();

    group.bench_function("base64", |b| {
        b.iter(|| black_box(detector.detect("VGhlIHF1aWNrIGJyb3duIGZveA==")));
    });
    group.bench_function("hex", |b| {
        b.iter(|| black_box(detector.detect("54686520717569636b2062726f776e20666f78")));
    });
    group.bench_function("plain_text", |b| {
        b.iter(|| black_box(detector.detect(SENTENCE)));
    });

    group.finish();
}

fn bench_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzer");
    let parallel = Analyzer::default();
    let sequential = Analyzer::default().with_parallel(false);

    // Base64(ROT13("Hello World"))
    group.bench_function("multi_layer_parallel", |b| {
        b.iter(|| black_box(parallel.detect("VXJ5eWIgSmJleXE=")));
    });
    group.bench_function("multi_layer_sequential", |b| {
        b.iter(|| black_box(sequential.detect("VXJ5eWIgSmJleXE=")));
    });

    let large = "48656c6c6f20576f726c64".repeat(400);
    group.bench_function("chunked_hex_8k", |b| {
        b.iter(|| black_box(parallel.detect(&large)));
    });

    group.finish();
}

fn bench_cross_check(c: &mut Criterion) {
    let checker = CrossChecker::default();
    c.bench_function("cross_check_base64", |b| {
        b.iter(|| black_box(checker.cross_check("SGVsbG8gV29ybGQh")));
    });
}

fn bench_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher");
    let breaker = CipherBreaker::default();

    group.bench_function("caesar", |b| {
        b.iter(|| black_box(breaker.analyze("Wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj")));
    });

    group.finish();
}

fn bench_scoring_and_hash(c: &mut Criterion) {
    let identifier = HashIdentifier::default();

    c.bench_function("score_profile", |b| {
        b.iter(|| black_box(ScoreProfile::of_text(SENTENCE, true)));
    });
    c.bench_function("hash_identify_md5", |b| {
        b.iter(|| black_box(identifier.identify("5d41402abc4b2a76b9719d911017c592")));
    });
}

criterion_group!(
    benches,
    bench_single_layer,
    bench_analyzer,
    bench_cross_check,
    bench_cipher,
    bench_scoring_and_hash
);
criterion_main!(benches);
