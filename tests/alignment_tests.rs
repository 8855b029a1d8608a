//! Alignment behaviour through the public library API.

use phrase_aligner::core::text::Normalizer;
use phrase_aligner::matching::metric::{hamming_similarity, levenshtein_similarity};
use phrase_aligner::{AlignerConfig, AlignmentEngine, MetricKind, SearchType, Strategy};

const PASSAGE: &str = "Quando a noite caiu, a aldeia ficou em silêncio. \
                       O velho pescador acendeu a lanterna e olhou para o mar. \
                       — Amanhã o vento muda — disse ele, baixinho. \
                       A filha, que o ouvia da porta, sorriu sem responder.";

/// Fragments in reading order with the phrase each should recover
const FRAGMENTS: &[(&str, &str)] = &[
    (
        "quando a noite caiu a aldeia ficou em silencio",
        "Quando a noite caiu, a aldeia ficou em silêncio.",
    ),
    (
        "o velho pescador acendeu a lanterna",
        "O velho pescador acendeu a lanterna",
    ),
    ("e olhou para o mar", "e olhou para o mar."),
    ("amanha o vento muda", "Amanhã o vento muda"),
    ("disse ele baixinho", "disse ele, baixinho."),
    (
        "a filha que o ouvia da porta sorriu sem responder",
        "A filha, que o ouvia da porta, sorriu sem responder.",
    ),
];

fn engine(config: AlignerConfig) -> AlignmentEngine {
    AlignmentEngine::new(config).expect("valid config")
}

/// Test the boundary values of both metrics
#[test]
fn test_metric_properties() {
    let samples = ["", "a", "rei", "rainha", "ola mundo", "olá", "livros."];

    for metric in [MetricKind::Hamming, MetricKind::Levenshtein] {
        assert!((metric.similarity("", "") - 1.0).abs() < f64::EPSILON);
        for a in samples {
            assert!((metric.similarity(a, a) - 1.0).abs() < f64::EPSILON);
            if !a.is_empty() {
                assert!(metric.similarity(a, "").abs() < f64::EPSILON);
                assert!(metric.similarity("", a).abs() < f64::EPSILON);
            }
            for b in samples {
                let s = metric.similarity(a, b);
                assert!((0.0..=1.0).contains(&s), "{metric} {a:?} {b:?} = {s}");
            }
        }
    }

    for a in samples {
        for b in samples {
            let forward = levenshtein_similarity(a, b);
            let backward = levenshtein_similarity(b, a);
            assert!((forward - backward).abs() < 1e-12, "{a:?} {b:?}");
        }
    }

    // Position-by-position: a shift defeats Hamming but not Levenshtein
    assert!(hamming_similarity("xlivro", "livro") < 0.5);
    assert!(levenshtein_similarity("xlivro", "livro") > 0.8);
}

/// Test the punctuation-recovery scenario
#[test]
fn test_recovers_punctuated_phrase() {
    let engine = engine(AlignerConfig::default());
    let reference = engine.prepare_reference("Olá, mundo! como vai?");

    let result = engine.align_text("ola mundo", &reference, 0);
    assert_eq!(result.matched_text.as_deref(), Some("Olá, mundo!"));
    assert!(result.similarity > 0.9);
}

/// Test that a fragment sharing nothing with the book is not found
#[test]
fn test_no_overlap_is_not_found() {
    let engine = engine(AlignerConfig::default());
    let reference = engine.prepare_reference(PASSAGE);

    let result = engine.align_text("kkk wwy zzxk", &reference, 0);
    assert_eq!(result.matched_text, None);
    assert!(result.similarity.abs() < f64::EPSILON);
}

/// Test that verbatim phrases are found exactly
#[test]
fn test_exact_fragments_flatten_to_themselves() {
    let engine = engine(AlignerConfig::default());
    let normalizer = Normalizer::new(true);
    let reference = engine.prepare_reference(PASSAGE);

    for (fragment, expected) in FRAGMENTS {
        let result = engine.align_text(fragment, &reference, 0);
        let matched = result.matched_text.as_deref().expect("fragment is in the book");
        assert_eq!(matched, *expected);
        assert!(result.similarity >= 0.99, "{fragment}: {}", result.similarity);
        assert_eq!(normalizer.flatten(matched), normalizer.flatten(fragment));
        assert_eq!(result.strategy, Some(Strategy::Word));
    }
}

/// Test that the sequenced cursor only moves forward
#[test]
fn test_sequenced_cursor_is_monotonic() {
    let engine = engine(AlignerConfig {
        sequenced: true,
        ..AlignerConfig::default()
    });
    let reference = engine.prepare_reference(PASSAGE);

    let mut cursor = 0;
    for (fragment, expected) in FRAGMENTS {
        let result = engine.align_text(fragment, &reference, cursor);
        assert_eq!(result.matched_text.as_deref(), Some(*expected));
        assert!(result.cursor_after >= cursor, "{fragment}");
        cursor = result.cursor_after;
    }
    assert!(cursor <= reference.len());
}

/// Test that char matches never start with punctuation
#[test]
fn test_char_matches_skip_leading_punctuation() {
    let engine = engine(AlignerConfig {
        search_type: SearchType::Char,
        ..AlignerConfig::default()
    });
    let reference = engine.prepare_reference(PASSAGE);

    for (fragment, _) in FRAGMENTS {
        let result = engine.align_text(fragment, &reference, 0);
        let span = result.span.expect("fragment is in the book");
        assert!(!reference.tokens()[span.start].is_punctuation, "{fragment}");
        assert!(result.similarity >= 0.99, "{fragment}: {}", result.similarity);
    }
}

/// Test that mis-segmented words fall back to char matching
#[test]
fn test_char_fallback_for_merged_words() {
    let engine = engine(AlignerConfig::default());
    let reference = engine.prepare_reference(PASSAGE);

    let result = engine.align_text("acendeu alanterna e olhou", &reference, 0);
    assert_eq!(result.strategy, Some(Strategy::Char));
    assert_eq!(result.matched_text.as_deref(), Some("acendeu a lanterna e olhou"));
}

/// Test that the worker count never changes the best score
#[test]
fn test_worker_count_does_not_change_scores() {
    let sequential = engine(AlignerConfig {
        threads: 1,
        ..AlignerConfig::default()
    });
    let reference = sequential.prepare_reference(PASSAGE);

    let fragments: Vec<&str> = FRAGMENTS
        .iter()
        .map(|(fragment, _)| *fragment)
        .chain(["acendeu alanterna e olhou", "o vento do mar", "kkk wwy"])
        .collect();

    for threads in [2, 3, 7] {
        let parallel = engine(AlignerConfig {
            threads,
            ..AlignerConfig::default()
        });
        for fragment in &fragments {
            let a = sequential.align_text(fragment, &reference, 0);
            let b = parallel.align_text(fragment, &reference, 0);
            assert!(
                (a.similarity - b.similarity).abs() < 1e-12,
                "{fragment} with {threads} workers"
            );
        }
    }
}
