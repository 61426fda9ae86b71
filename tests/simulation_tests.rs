//! Simulator and history-window behaviour across whole runs.

use esqet_core::{
    EsqetError, Evolution, Field, GaussianNoise, HistoryBuffer, Silent, SimulationConfig,
    Simulator,
};

fn ramp(side: usize) -> Field {
    Field::from_fn(side, |r, c| 0.3 + 0.4 * ((r + c) as f64 / (2 * side) as f64))
}

#[test]
fn test_history_keeps_only_last_h_fields() {
    let sim = Simulator::new(SimulationConfig::diffusion_only()).unwrap();
    let out: Evolution<4> = sim.evolve(ramp(32), Silent).unwrap();
    assert_eq!(out.steps, 30);
    assert_eq!(out.history.len(), 4);
    assert_eq!(out.history.latest(), Some(&out.field));
}

#[test]
fn test_short_run_history_holds_every_step() {
    let cfg = SimulationConfig {
        step_count: 3,
        ..SimulationConfig::diffusion_only()
    };
    let sim = Simulator::new(cfg).unwrap();
    let out: Evolution = sim.evolve(ramp(32), Silent).unwrap();
    assert_eq!(out.history.len(), 3);
    assert_eq!(out.history.capacity(), 10);
}

#[test]
fn test_zero_steps_returns_initial_field() {
    let cfg = SimulationConfig {
        step_count: 0,
        ..SimulationConfig::default()
    };
    let sim = Simulator::new(cfg).unwrap();
    let initial = ramp(32);
    let out: Evolution = sim.evolve(initial.clone(), Silent).unwrap();
    assert_eq!(out.field, initial);
    assert!(out.history.is_empty());
}

#[test]
fn test_noisy_run_is_bounded_and_reproducible() {
    let cfg = SimulationConfig {
        noise_stddev: 0.01,
        ..SimulationConfig::diffusion_only()
    };
    let sim = Simulator::new(cfg).unwrap();
    let a: Evolution = sim
        .evolve(ramp(32), GaussianNoise::seeded(0.01, 99).unwrap())
        .unwrap();
    let b: Evolution = sim
        .evolve(ramp(32), GaussianNoise::seeded(0.01, 99).unwrap())
        .unwrap();
    assert_eq!(a.field, b.field);
    assert!(a.history.iter().all(Field::is_unit_bounded));
}

#[test]
fn test_diffusion_smooths_contrast() {
    let sim = Simulator::new(SimulationConfig::diffusion_only()).unwrap();
    let initial = Field::from_fn(32, |_, c| if c < 16 { 0.2 } else { 0.8 });
    let out: Evolution = sim.evolve(initial, Silent).unwrap();
    let (lo, hi) = out.field.min_max();
    assert!(lo > 0.2 && hi < 0.8, "lo={} hi={}", lo, hi);
    // Periodic diffusion conserves the mean.
    let mean = out.field.cells().iter().sum::<f64>() / 1024.0;
    assert!((mean - 0.5).abs() < 1e-9, "mean={}", mean);
}

#[test]
fn test_strong_sink_reports_first_negative_cell() {
    let cfg = SimulationConfig {
        sink_strength: 0.9,
        sink_cell: (4, 7),
        ..SimulationConfig::diffusion_only()
    };
    let sim = Simulator::new(cfg).unwrap();
    let err = sim
        .evolve::<10, _>(Field::filled(32, 0.5), Silent)
        .unwrap_err();
    match err {
        EsqetError::Instability { step, row, col, value } => {
            assert_eq!((step, row, col), (0, 4, 7));
            assert!((value + 0.4).abs() < 1e-12, "value={}", value);
        }
        other => panic!("unexpected {other:?}"),
    }
}

fn weak_forcing() -> SimulationConfig {
    SimulationConfig {
        emf_amplitude: 0.005,
        sink_strength: 0.05,
        ..SimulationConfig::default()
    }
}

fn column_mean(field: &Field, col: usize) -> f64 {
    (0..field.side()).map(|r| field.get(r, col)).sum::<f64>() / field.side() as f64
}

#[test]
fn test_forced_noisy_run_stays_bounded() {
    let sim = Simulator::new(weak_forcing()).unwrap();
    let out: Evolution = sim
        .evolve(ramp(32), GaussianNoise::seeded(0.01, 7).unwrap())
        .unwrap();
    assert_eq!(out.steps, 30);
    assert_eq!(out.history.len(), 10);
    for (i, frame) in out.history.iter().enumerate() {
        assert!(frame.is_unit_bounded(), "history frame {} out of range", i);
    }
}

#[test]
fn test_forcing_raises_crest_and_lowers_trough_columns() {
    let forced = Simulator::new(SimulationConfig {
        noise_stddev: 0.0,
        ..weak_forcing()
    })
    .unwrap();
    let plain = Simulator::new(SimulationConfig::diffusion_only()).unwrap();
    let a: Evolution = forced.evolve(ramp(32), Silent).unwrap();
    let b: Evolution = plain.evolve(ramp(32), Silent).unwrap();
    // sin(2π·7/31) > 0.9 and sin(2π·23/31) < -0.9
    assert!(column_mean(&a.field, 7) > column_mean(&b.field, 7) + 0.05);
    assert!(column_mean(&a.field, 23) < column_mean(&b.field, 23) - 0.05);
    assert!(a.field.get(15, 11) < b.field.get(15, 11));
}

#[test]
fn test_reference_constants_abort_on_any_input() {
    let sim = Simulator::new(SimulationConfig::default()).unwrap();
    let quadrants = Field::from_fn(32, |r, c| if (c < 16) ^ (r < 16) { 1.0 } else { 0.0 });
    let cases = [
        ("white", Field::filled(32, 1.0), (20, 0, 23)),
        ("black", Field::filled(32, 0.0), (0, 0, 16)),
        ("gray", Field::filled(32, 0.5), (3, 15, 11)),
        ("quadrants", quadrants, (0, 15, 11)),
    ];
    for (name, field, expected) in cases {
        match sim.evolve::<10, _>(field, Silent) {
            Err(EsqetError::Instability { step, row, col, value }) => {
                assert_eq!((step, row, col), expected, "{}", name);
                assert!(value < 0.0, "{} value={}", name, value);
            }
            other => panic!("{name}: expected instability, got {other:?}"),
        }
    }
}

#[test]
fn test_wrong_field_size_is_rejected() {
    let sim = Simulator::new(SimulationConfig::diffusion_only()).unwrap();
    let err = sim.evolve::<10, _>(Field::filled(16, 0.5), Silent).unwrap_err();
    assert!(matches!(err, EsqetError::Config(_)));
}

#[test]
fn test_history_buffer_evicts_oldest() {
    let mut h: HistoryBuffer<2> = HistoryBuffer::new();
    assert!(h.push(Field::filled(2, 0.1)).is_none());
    assert!(h.push(Field::filled(2, 0.2)).is_none());
    let evicted = h.push(Field::filled(2, 0.3)).unwrap();
    assert_eq!(evicted, Field::filled(2, 0.1));
    assert_eq!(h.oldest(), Some(&Field::filled(2, 0.2)));
}
