use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mapsift_predict::{BkTree, Trie, levenshtein_distance};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_word(rng: &mut SmallRng) -> String {
    let len = rng.gen_range(3..12);
    (0..len)
        .map(|_| (b'a' + rng.gen_range(0..26)) as char)
        .collect()
}

fn bench_lookups(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let words: Vec<String> = (0..5_000).map(|_| random_word(&mut rng)).collect();

    let trie = Trie::from_words(&words);
    let mut bktree = BkTree::new();
    for word in &words {
        bktree.add_word(word);
    }

    c.bench_function("trie_starts_with", |b| {
        b.iter(|| black_box(trie.starts_with(black_box("sta"))))
    });

    c.bench_function("bktree_search_tol2", |b| {
        b.iter(|| black_box(bktree.search(black_box("start"), 2)))
    });

    c.bench_function("bktree_vs_linear_scan", |b| {
        b.iter(|| {
            words
                .iter()
                .filter(|w| levenshtein_distance(w, black_box("start")) <= 2)
                .count()
        })
    });
}

criterion_group!(benches, bench_lookups);
criterion_main!(benches);
