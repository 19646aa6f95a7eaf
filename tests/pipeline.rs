//! End-to-end behavior of the engine through its public API.

use std::io::Write;

use serde_json::json;
use tempfile::NamedTempFile;
use vitals::{
    ChannelSource, ConstructCatalog, ConstructError, EngineConfig, FileSource, Frame, FrameSource,
    Mnemonic, Reading, ReasoningArtifact, ReasoningConstruct, Scope, Severity,
    VehicleRepresentation,
};

const ENGINE: &str = r#"
[[channels]]
name = "time"

[[channels]]
name = "battery_voltage"
test = { kind = "feasibility", warning_low = 22.0, caution_low = 24.0, caution_high = 29.0, warning_high = 30.0, mnemonic = "BATT" }

[[channels]]
name = "mode"
test = { kind = "discrete", caution = ["SAFE"], warning = ["FAULT"] }

[[constructs]]
name = "window"
kind = "sliding_window"
params = { window = 3 }

[[constructs]]
name = "power_window"
kind = "sliding_window"
scopes = ["power"]
"#;

fn engine() -> VehicleRepresentation {
    let config = EngineConfig::from_toml_str(ENGINE).unwrap();
    VehicleRepresentation::from_config(&config, &ConstructCatalog::with_builtins()).unwrap()
}

/// Fails its update whenever the time channel is odd.
struct OddTimeFails {
    name: String,
    updates: u64,
}

impl ReasoningConstruct for OddTimeFails {
    fn component_name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, frame: &[Reading]) -> Result<(), ConstructError> {
        let t = frame
            .first()
            .and_then(Reading::value)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        if t as i64 % 2 == 1 {
            return Err(ConstructError::new("odd time"));
        }
        self.updates += 1;
        Ok(())
    }

    fn render_reasoning(&self) -> Result<ReasoningArtifact, ConstructError> {
        Ok(json!({ "updates": self.updates }))
    }
}

#[test]
fn test_replay_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[0.0, 27.0, \"SCIENCE\"]").unwrap();
    writeln!(file, "[1.0, null, null]").unwrap();
    writeln!(file, "[2.0, 23.0, null]").unwrap();
    writeln!(file, "[3.0, null, \"SAFE\"]").unwrap();

    let mut vehicle = engine();
    let mut source = FileSource::new(file.path());
    let mut severities = Vec::new();
    while let Some(frame) = source.poll() {
        vehicle.update(&frame).unwrap();
        severities.push(vehicle.overall_status());
    }

    assert_eq!(
        severities,
        vec![Severity::Nominal, Severity::Nominal, Severity::Caution, Severity::Caution]
    );
    assert_eq!(vehicle.cycle(), 4);

    // Last known values carried forward
    assert_eq!(
        vehicle.current_data(),
        &[Reading::observed(3.0), Reading::observed(23.0), Reading::observed("SAFE")]
    );
    assert_eq!(
        vehicle.faulting_mnemonics(),
        vec![
            ("battery_voltage".to_string(), Mnemonic::new("BATT_LOW")),
            ("mode".to_string(), Mnemonic::new("MODE")),
        ]
    );
}

#[test]
fn test_confidence_drops_as_health_regresses() {
    let mut vehicle = engine();

    vehicle
        .update(&Frame::builder().observe(0.0).observe(27.0).observe("SCIENCE").build())
        .unwrap();
    let nominal = vehicle.bayesian_status();

    vehicle
        .update(&Frame::builder().observe(1.0).observe(29.5).skip().build())
        .unwrap();
    let caution = vehicle.bayesian_status();

    vehicle
        .update(&Frame::builder().observe(2.0).skip().observe("FAULT").build())
        .unwrap();
    let warning = vehicle.bayesian_status();

    assert_eq!(vehicle.overall_status(), Severity::Warning);
    assert!(nominal > caution, "{} > {}", nominal, caution);
    assert!(caution > warning, "{} > {}", caution, warning);
    assert!((0.0..=1.0).contains(&warning));
}

#[test]
fn test_queries_are_idempotent() {
    let mut vehicle = engine();
    vehicle
        .update(&Frame::builder().observe(0.0).observe(31.0).observe("SCIENCE").build())
        .unwrap();

    let status = vehicle.status();
    let state = vehicle.state_information(&Scope::All);
    let mnemonics = vehicle.faulting_mnemonics();

    for _ in 0..3 {
        assert_eq!(vehicle.status(), status);
        assert_eq!(vehicle.state_information(&Scope::All), state);
        assert_eq!(vehicle.faulting_mnemonics(), mnemonics);
    }
    assert_eq!(vehicle.cycle(), 1);
}

#[test]
fn test_scope_selects_constructs() {
    let mut vehicle = engine();
    vehicle
        .update(&Frame::builder().observe(0.0).observe(27.0).observe("SCIENCE").build())
        .unwrap();

    let status = vehicle.state_information(&Scope::default());
    assert_eq!(status.keys().collect::<Vec<_>>(), vec!["window"]);
    assert_eq!(status["window"]["window"], json!(3));

    let power = vehicle.state_information(&Scope::tags(["power"]));
    assert_eq!(power.keys().collect::<Vec<_>>(), vec!["power_window"]);

    assert_eq!(vehicle.state_information(&Scope::All).len(), 2);
}

#[test]
fn test_failing_construct_is_isolated() {
    let mut catalog = ConstructCatalog::with_builtins();
    catalog.register("odd_time_fails", |ctx| {
        Ok(Box::new(OddTimeFails {
            name: ctx.name.to_string(),
            updates: 0,
        }) as Box<dyn ReasoningConstruct>)
    });

    let mut config = EngineConfig::from_toml_str(ENGINE).unwrap();
    config
        .constructs
        .insert(0, vitals::ConstructSpec::new("flaky", "odd_time_fails"));
    let mut vehicle = VehicleRepresentation::from_config(&config, &catalog).unwrap();

    let diagnostics = vehicle
        .update(&Frame::builder().observe(1.0).observe(27.0).observe("SCIENCE").build())
        .unwrap()
        .clone();
    assert_eq!(diagnostics.construct_failures.len(), 1);
    assert_eq!(diagnostics.construct_failures[0].component, "flaky");

    // Status and the other constructs still advance
    assert_eq!(vehicle.overall_status(), Severity::Nominal);
    let state = vehicle.state_information(&Scope::default());
    assert!(!state.contains_key("flaky"));
    assert_eq!(state["window"]["frames_seen"], json!(1));

    // A clean cycle brings it back
    vehicle
        .update(&Frame::builder().observe(2.0).skip().skip().build())
        .unwrap();
    assert!(vehicle.diagnostics().is_clean());
    let state = vehicle.state_information(&Scope::default());
    assert_eq!(state["flaky"]["updates"], json!(1));
}

#[test]
fn test_wrong_width_frame_leaves_state_untouched() {
    let mut vehicle = engine();
    vehicle
        .update(&Frame::builder().observe(0.0).observe(27.0).observe("SCIENCE").build())
        .unwrap();
    let before = vehicle.current_data().to_vec();
    let status = vehicle.status();

    let err = vehicle
        .update(&Frame::builder().observe(1.0).observe(10.0).build())
        .unwrap_err();
    assert_eq!((err.expected, err.actual), (3, 2));

    assert_eq!(vehicle.current_data(), before.as_slice());
    assert_eq!(vehicle.status(), status);
    assert_eq!(vehicle.cycle(), 1);
}

#[test]
fn test_channel_source_drives_engine() {
    let (tx, mut source) = ChannelSource::create(8, "test");
    let producer = std::thread::spawn(move || {
        for t in 0..5 {
            tx.blocking_send(Frame::builder().observe(t as f64).observe(26.0).skip().build())
                .unwrap();
        }
    });
    producer.join().unwrap();

    let mut vehicle = engine();
    while !source.exhausted() {
        if let Some(frame) = source.poll() {
            vehicle.update(&frame).unwrap();
        }
    }

    assert_eq!(vehicle.cycle(), 5);
    assert_eq!(vehicle.current_time(), Some(&Reading::observed(4.0)));
    // Mode never observed
    assert_eq!(vehicle.current_data()[2], Reading::Unobserved);
}
