use experiment_engine::domain::experiment::{BetaPrior, SampleObservation};
use experiment_engine::stats::bayesian::{
    bayesian_probability, beta, gamma, probability_b_beats_a, seeded_rng, standard_normal,
    DEFAULT_MONTE_CARLO_SAMPLES,
};
use rand_distr::Distribution;

fn obs(c: u64, n: u64) -> SampleObservation {
    SampleObservation::new(c, n)
}

fn mean(draws: &[f64]) -> f64 {
    draws.iter().sum::<f64>() / draws.len() as f64
}

#[test]
fn standard_normal_has_unit_moments() {
    let mut rng = seeded_rng(Some(11));
    let draws: Vec<f64> = (0..50_000).map(|_| standard_normal(&mut rng)).collect();
    let m = mean(&draws);
    let var = draws.iter().map(|x| (x - m).powi(2)).sum::<f64>() / draws.len() as f64;
    assert!(m.abs() < 0.02, "mean = {m}");
    assert!((var - 1.0).abs() < 0.03, "variance = {var}");
}

#[test]
fn gamma_mean_matches_shape() {
    let mut rng = seeded_rng(Some(3));
    for shape in [0.5, 1.0, 3.0, 25.0] {
        let draws: Vec<f64> = (0..20_000).map(|_| gamma(&mut rng, shape)).collect();
        let m = mean(&draws);
        assert!((m - shape).abs() < 0.05 * shape.max(1.0), "shape {shape}: mean {m}");
        assert!(draws.iter().all(|x| *x > 0.0));
    }
}

#[test]
fn beta_sampler_agrees_with_reference_distribution() {
    let mut rng = seeded_rng(Some(5));
    let reference = rand_distr::Beta::new(2.0, 5.0).unwrap();

    let ours: Vec<f64> = (0..20_000).map(|_| beta(&mut rng, 2.0, 5.0)).collect();
    let theirs: Vec<f64> = (0..20_000).map(|_| reference.sample(&mut rng)).collect();

    assert!((mean(&ours) - 2.0 / 7.0).abs() < 0.01);
    assert!((mean(&ours) - mean(&theirs)).abs() < 0.01);
    assert!(ours.iter().all(|x| (0.0..=1.0).contains(x)));
}

#[test]
fn identical_samples_are_a_coin_flip() {
    let mut rng = seeded_rng(Some(42));
    let p = probability_b_beats_a(
        &mut rng,
        obs(100, 1000),
        obs(100, 1000),
        BetaPrior::default(),
        DEFAULT_MONTE_CARLO_SAMPLES,
    );
    assert!((p - 0.5).abs() < 0.05, "p = {p}");
}

#[test]
fn unseeded_runs_stay_near_one_half_for_identical_samples() {
    for _ in 0..3 {
        let p = bayesian_probability(obs(40, 400), obs(40, 400), BetaPrior::default());
        assert!((p - 0.5).abs() < 0.05, "p = {p}");
    }
}

#[test]
fn clearly_better_treatment_wins() {
    let mut rng = seeded_rng(Some(7));
    let p = probability_b_beats_a(
        &mut rng,
        obs(100, 1000),
        obs(150, 1000),
        BetaPrior::default(),
        DEFAULT_MONTE_CARLO_SAMPLES,
    );
    assert!(p > 0.99, "p = {p}");

    let reversed = probability_b_beats_a(
        &mut rng,
        obs(150, 1000),
        obs(100, 1000),
        BetaPrior::default(),
        DEFAULT_MONTE_CARLO_SAMPLES,
    );
    assert!(reversed < 0.01, "p = {reversed}");
}

#[test]
fn same_seed_reproduces_estimate() {
    let run = |seed| {
        let mut rng = seeded_rng(Some(seed));
        probability_b_beats_a(&mut rng, obs(12, 90), obs(18, 95), BetaPrior::default(), 5_000)
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn no_draws_means_no_preference() {
    let mut rng = seeded_rng(Some(1));
    let p = probability_b_beats_a(&mut rng, obs(1, 10), obs(9, 10), BetaPrior::default(), 0);
    assert_eq!(p, 0.5);
}

#[test]
fn empty_samples_fall_back_to_prior() {
    let mut rng = seeded_rng(Some(13));
    let p = probability_b_beats_a(&mut rng, obs(0, 0), obs(0, 0), BetaPrior::default(), 20_000);
    assert!((p - 0.5).abs() < 0.03, "p = {p}");
}

#[test]
fn strong_prior_pulls_estimate_toward_even() {
    let mut rng = seeded_rng(Some(21));
    let weak = probability_b_beats_a(&mut rng, obs(2, 20), obs(6, 20), BetaPrior::default(), 10_000);
    let strong = probability_b_beats_a(
        &mut rng,
        obs(2, 20),
        obs(6, 20),
        BetaPrior {
            alpha: 200.0,
            beta: 200.0,
        },
        10_000,
    );
    assert!(weak > strong);
    assert!(strong > 0.5);
}
