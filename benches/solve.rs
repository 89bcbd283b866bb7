use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridfill::consistency::{enforce_arc_consistency, enforce_node_consistency};
use gridfill::domain::DomainStore;
use gridfill::{find_fill, FillOptions, PuzzleStructure, WordList};

const STRUCTURE: &str = include_str!("../data/structure1.txt");
const WORDS: &str = include_str!("../data/words1.txt");

pub fn criterion_benchmark(c: &mut Criterion) {
    let puzzle = PuzzleStructure::from_template_str(STRUCTURE).unwrap();
    let word_list = WordList::parse_from_str(WORDS);

    c.bench_function("arc consistency", |b| {
        b.iter(|| {
            let mut domains = DomainStore::new(&puzzle, &word_list);
            enforce_node_consistency(&puzzle, &mut domains);
            enforce_arc_consistency(&puzzle, &mut domains, None).unwrap();
            black_box(domains);
        })
    });

    c.bench_function("fill", |b| {
        b.iter(|| black_box(find_fill(&puzzle, &word_list, &FillOptions::default()).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
