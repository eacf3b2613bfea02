use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::collections::HashMap;

use examhall_core::grade::grade;
use examhall_core::model::Question;
use examhall_core::session::build_presentation;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("q{i}"),
            exam_id: "bench".into(),
            prompt: format!("Question number {i}?"),
            choices: vec![
                format!("choice {i}-a"),
                format!("choice {i}-b"),
                format!("choice {i}-c"),
                format!("choice {i}-d"),
            ],
            answer_index: i % 4,
        })
        .collect()
}

fn bench_build_presentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_presentation");

    for size in [10, 100, 500] {
        let questions = make_questions(size);
        group.bench_function(format!("{size}_questions"), |b| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| build_presentation(black_box(&questions), &mut rng))
        });
    }

    group.finish();
}

fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade");

    for size in [10, 100, 500] {
        let questions = make_questions(size);
        let mut rng = StdRng::seed_from_u64(42);
        let presented = build_presentation(&questions, &mut rng);
        let answers: HashMap<String, String> = presented
            .iter()
            .enumerate()
            .map(|(i, p)| (p.question_id.clone(), (i % 4).to_string()))
            .collect();

        group.bench_function(format!("{size}_questions"), |b| {
            b.iter(|| grade(black_box(&presented), black_box(&answers)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_presentation, bench_grade);
criterion_main!(benches);
