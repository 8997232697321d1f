//! End-to-end behaviour of the membrane simulation.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use drum_membrane::relaxation::RelaxationSolver;
use drum_membrane::{Command, Config, Domain, Mode, Outcome, Pin, Simulation};

fn config(size: usize) -> Config {
    let mut config = Config::default();
    config.grid.width = size;
    config.grid.height = size;
    config
}

fn assert_field_bounded(sim: &Simulation) {
    let domain = *sim.domain();
    for ((i, j), &v) in sim.current_field().indexed_iter() {
        if !domain.is_interior(i, j) {
            assert_eq!(v, 0.0, "exterior cell ({}, {}) moved", i, j);
        }
        assert!(v.abs() <= 1000.0, "cell ({}, {}) = {} escaped the clamp", i, j, v);
    }
}

#[test]
fn test_impulse_scenario() {
    let mut sim = Simulation::new(&config(10)).unwrap();
    sim.toggle_pin_mode();
    assert_eq!(
        sim.click(5, 5),
        Outcome::Tapped { x: 5, y: 5, amplitude: 200.0 }
    );

    for ((i, j), &v) in sim.current_field().indexed_iter() {
        let expected = if (i, j) == (5, 5) { 200.0 } else { 0.0 };
        assert_eq!(v, expected);
    }
    assert!(sim.previous_field().iter().all(|&v| v == 0.0));

    sim.step();
    let (damping, c_squared) = (0.995, 0.45);
    let laplacian = -4.0 * 200.0;
    let velocity = 200.0 - 0.0;
    let expected = 200.0 + velocity * damping + c_squared * laplacian;
    assert_relative_eq!(sim.current_field()[[5, 5]], expected);
    assert_abs_diff_eq!(sim.current_field()[[5, 5]], 39.0, epsilon = 1e-9);
    assert_relative_eq!(sim.current_field()[[5, 6]], c_squared * 200.0);
}

#[test]
fn test_boundary_and_clamp_hold_under_heavy_tapping() {
    let mut sim = Simulation::new(&config(40)).unwrap();
    sim.click(20, 20);
    sim.set_pulse_amplitude(500.0);
    let spots = [(10, 20), (28, 14), (20, 31), (12, 12), (25, 25)];
    for round in 0..200 {
        if round % 3 == 0 {
            let (x, y) = spots[round % spots.len()];
            sim.click(x, y);
        }
        sim.step();
        assert_field_bounded(&sim);
    }
}

#[test]
fn test_energy_decays_without_pin() {
    let mut sim = Simulation::new(&config(30)).unwrap();
    sim.toggle_pin_mode();
    sim.click(12, 17);
    let initial = sim.energy();
    assert!(initial > 0.0);

    let mut early = 0.0;
    let mut late = 0.0;
    for tick in 0..3000 {
        sim.step();
        if tick < 200 {
            early += sim.energy();
        } else if (1000..1200).contains(&tick) {
            late += sim.energy();
        }
    }
    assert!(late < early);
    assert!(sim.energy() < 1e-4 * initial);
}

#[test]
fn test_pin_stays_rigid() {
    let mut sim = Simulation::new(&config(40)).unwrap();
    sim.set_press_strength(200.0);
    sim.click(16, 22);
    let pin = *sim.pin().unwrap();
    let domain = *sim.domain();

    for tick in 0..300 {
        if tick % 50 == 0 {
            sim.click(24, 18);
        }
        sim.step();
        for (i, j) in pin.cells(&domain) {
            assert_eq!(sim.current_field()[[i, j]], pin.target);
        }
    }
}

#[test]
fn test_wide_tap_does_not_disturb_pin() {
    let mut config = config(30);
    config.excitation.pulse_radius_min = 3.0;
    config.excitation.pulse_radius_max = 3.0;
    let mut sim = Simulation::new(&config).unwrap();
    sim.click(15, 15);
    let pin = *sim.pin().unwrap();
    let domain = *sim.domain();

    // Outside the pin, but a radius-3 tap reaches (17, 15) and (16, 15)
    assert!(!pin.reaches(19, 15));
    assert!(pin.covers(&domain, 17, 15));
    assert_eq!(
        sim.click(19, 15),
        Outcome::Tapped { x: 19, y: 15, amplitude: 200.0 }
    );

    for (i, j) in pin.cells(&domain) {
        assert_eq!(sim.current_field()[[i, j]], pin.target, "current ({}, {})", i, j);
        assert_eq!(sim.previous_field()[[i, j]], pin.target, "previous ({}, {})", i, j);
    }
    assert!(sim.current_field()[[18, 15]] > 0.0);
}

#[test]
fn test_relaxed_shape_is_symmetric_and_monotone() {
    let domain = Domain::new(40, 40, 2.0).unwrap();
    let pin = Pin { x: 20, y: 20, radius: 1.0, target: -100.0 };
    let (state, _) = RelaxationSolver::new(4000, None).solve(&domain, &pin);

    // Dihedral images of a cell lie at the same distance from the pin
    for a in 0..18_i64 {
        for b in 0..18_i64 {
            let at = |x: i64, y: i64| state[[(20 + x) as usize, (20 + y) as usize]];
            let v = at(a, b);
            for w in [at(b, a), at(-a, b), at(a, -b), at(-a, -b), at(-b, a)] {
                assert_abs_diff_eq!(v, w, epsilon = 1e-6);
            }
        }
    }

    // Rising from the pin depth towards zero along the axis
    let mut last = -100.0;
    for i in 20..40 {
        let v = state[[i, 20]];
        assert!(v >= last - 1e-9, "not monotone at x = {}", i);
        last = v;
        if !domain.is_interior(i, 20) {
            assert_eq!(v, 0.0);
        }
    }
    assert!(state[[37, 20]].abs() < 10.0);
}

#[test]
fn test_interaction_is_deterministic() {
    let commands = [
        Command::Click { x: 14, y: 15 },
        Command::Click { x: 22, y: 15 },
        Command::Click { x: 15, y: 15 },
        Command::SetPressStrength(250.0),
        Command::TogglePinMode,
        Command::Click { x: 18, y: 10 },
        Command::TogglePinMode,
        Command::Click { x: 11, y: 19 },
        Command::Click { x: 100, y: 100 },
    ];

    let run = || {
        let mut sim = Simulation::new(&config(30)).unwrap();
        for command in commands {
            sim.apply(command);
            sim.step();
        }
        sim
    };
    let (a, b) = (run(), run());
    assert_eq!(a.mode(), Mode::Tapping);
    assert_eq!(a.mode(), b.mode());
    assert_eq!(a.pin(), b.pin());
    assert_eq!(a.current_field(), b.current_field());
    assert_eq!(a.status_message(), b.status_message());
}

#[test]
fn test_reset_from_any_state() {
    let mut sim = Simulation::new(&config(30)).unwrap();
    sim.click(15, 15);
    sim.click(20, 15);
    sim.step();
    sim.apply(Command::Reset);
    assert_eq!(sim.mode(), Mode::AwaitingPin);
    assert!(sim.pin().is_none());
    assert!(sim.current_field().iter().all(|&v| v == 0.0));
    assert!(sim.previous_field().iter().all(|&v| v == 0.0));
}

#[test]
fn test_rejects_unstable_configuration() {
    let mut bad = config(30);
    bad.physics.c_squared = 0.55;
    assert!(Simulation::new(&bad).is_err());

    let mut tiny = config(30);
    tiny.grid.margin = 15.0;
    assert!(Simulation::new(&tiny).is_err());
}
