//! End-to-end device scenarios: pins, wiring and the tick loop driven
//! through `RailService` against the recording mock.

use railcreator::app::commands::RailCommand;
use railcreator::app::events::RailEvent;
use railcreator::app::service::RailService;
use railcreator::config::RailConfig;
use railcreator::devices::{OutputState, Runnable};
use railcreator::error::{DeviceError, Error, PinError, WiringError};
use railcreator::naming::DeviceKey;
use railcreator::pins::{Board, BoardType, PinAllocator};
use railcreator::plan::{BoardRecipe, DeviceRecipe, RailPlan};

use crate::mock_hw::{MockHardware, RecordingSink};

fn service_with(devices: Vec<DeviceRecipe>) -> (RailService, RecordingSink) {
    let plan = RailPlan {
        boards: vec![BoardRecipe::new("B1", "Typ2", 4)],
        devices,
    };
    let mut sink = RecordingSink::new();
    let mut service = RailService::new(RailConfig::default());
    service.load_plan(&plan, &mut sink).unwrap();
    (service, sink)
}

fn button_and_lamp() -> Vec<DeviceRecipe> {
    vec![
        DeviceRecipe::new("Btn", "Button", "B1").on_pin(4),
        DeviceRecipe::new("L1", "Lamp", "B1").on_pin(0).connect_to("Btn"),
    ]
}

// ── Pin mapping ───────────────────────────────────────────────

#[test]
fn released_pin_can_be_remapped() {
    let mut alloc = PinAllocator::new();
    alloc
        .add_board(Board::from_type("B1", 4, BoardType::Typ2))
        .unwrap();
    let lamp1 = DeviceKey::new("Lamp1").unwrap();
    let lamp2 = DeviceKey::new("Lamp2").unwrap();

    alloc.map_pin("B1", 3, &lamp1).unwrap();
    let err = alloc.map_pin("B1", 3, &lamp2).unwrap_err();
    assert!(matches!(
        err,
        Error::Pin(PinError::PinAlreadyMapped { pin: 3, ref owner, .. }) if owner == "lamp1"
    ));

    alloc.release_pin(&lamp1).unwrap();
    alloc.map_pin("B1", 3, &lamp2).unwrap();
    assert_eq!(alloc.find_owner("B1", 3), Some(&lamp2));
}

// ── Button → Lamp ─────────────────────────────────────────────

#[test]
fn button_drives_lamp_without_repeated_writes() {
    let (mut service, mut sink) = service_with(button_and_lamp());
    let mut hw = MockHardware::new();

    service.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(hw.writes("B1", 0), vec![0], "first tick sets the lamp off");
    assert_eq!(service.output_state("L1").unwrap(), OutputState::Off);

    hw.set("B1", 4, 1);
    for _ in 0..5 {
        service.tick(&mut hw, &mut sink).unwrap();
    }
    assert_eq!(hw.writes("B1", 0), vec![0, 1], "lamp switched on exactly once");
    assert!(service.is_on("L1").unwrap());
    assert!(service.is_on("Btn").unwrap());
    assert_eq!(sink.output_changes(), 1);

    hw.set("B1", 4, 0);
    service.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(hw.writes("B1", 0), vec![0, 1, 0]);
}

#[test]
fn inverted_lamp_is_lit_while_button_released() {
    let (mut service, mut sink) = service_with(vec![
        DeviceRecipe::new("Btn", "Button", "B1").on_pin(4),
        DeviceRecipe::new("Night", "Lamp", "B1")
            .on_pin(1)
            .connect_to("Btn")
            .inverted(),
    ]);
    let mut hw = MockHardware::new();

    service.tick(&mut hw, &mut sink).unwrap();
    assert!(service.is_on("Night").unwrap());

    hw.set("B1", 4, 1);
    service.tick(&mut hw, &mut sink).unwrap();
    assert!(!service.is_on("Night").unwrap());
}

// ── ToggleButton → Lamp ───────────────────────────────────────

fn toggle_run(lamp_first: bool) -> (Vec<bool>, Vec<bool>) {
    let toggle = DeviceRecipe::new("Toggle", "ToggleButton", "B1").on_pin(5);
    let lamp = DeviceRecipe::new("L1", "Lamp", "B1").on_pin(0).connect_to("Toggle");
    let devices = if lamp_first {
        vec![lamp, toggle]
    } else {
        vec![toggle, lamp]
    };
    let (mut service, mut sink) = service_with(devices);
    let mut hw = MockHardware::new();

    let mut toggles = Vec::new();
    let mut lamps = Vec::new();
    for raw in [1, 1, 0, 0, 1] {
        hw.set("B1", 5, raw);
        service.tick(&mut hw, &mut sink).unwrap();
        toggles.push(service.is_on("Toggle").unwrap());
        lamps.push(service.is_on("L1").unwrap());
    }
    (toggles, lamps)
}

#[test]
fn toggle_flips_on_rising_edges_only() {
    let (toggles, _) = toggle_run(false);
    assert_eq!(toggles, vec![true, true, true, true, false]);
}

#[test]
fn lamp_after_toggle_follows_in_same_tick() {
    let (toggles, lamps) = toggle_run(false);
    assert_eq!(lamps, toggles);
}

#[test]
fn lamp_before_toggle_lags_one_tick() {
    let (toggles, lamps) = toggle_run(true);
    assert_eq!(lamps, vec![false, true, true, true, true]);
    assert_eq!(lamps[1..], toggles[..4]);
}

// ── Turnout and signal chain ──────────────────────────────────

#[test]
fn turnout_pulses_and_signal_follows() {
    let (mut service, mut sink) = service_with(vec![
        DeviceRecipe::new("Btn", "Button", "B1").on_pin(4),
        DeviceRecipe::new("T1", "Turnout", "B1")
            .on_pin(0)
            .secondary_pin(1)
            .delays(200, 150)
            .connect_to("Btn"),
        DeviceRecipe::new("S1", "TwoLightsSignal", "B1")
            .on_pin(2)
            .secondary_pin(3)
            .connect_to("T1"),
    ]);
    let mut hw = MockHardware::new();

    service.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(hw.writes("B1", 1), vec![1, 0], "first tick sets the turnout to main");
    assert_eq!(hw.writes("B1", 3), vec![1], "signal shows stop");

    hw.clear();
    hw.set("B1", 4, 1);
    service.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(hw.writes("B1", 0), vec![1, 0]);
    assert_eq!(hw.writes("B1", 2), vec![1]);
    assert_eq!(hw.writes("B1", 3), vec![0]);
    assert_eq!(hw.total_delay_ms(), 200);
    assert_eq!(service.output_state("S1").unwrap(), OutputState::On);
}

#[test]
fn recipe_delays_are_clamped() {
    let plan = RailPlan {
        boards: vec![BoardRecipe::new("B1", "Typ2", 4)],
        devices: vec![
            DeviceRecipe::new("Btn", "Button", "B1").on_pin(4),
            DeviceRecipe::new("L1", "Lamp", "B1")
                .on_pin(0)
                .delays(60_000, 0)
                .connect_to("Btn"),
        ],
    };
    let config = RailConfig {
        max_actuation_delay_ms: 500,
        ..RailConfig::default()
    };
    let mut sink = RecordingSink::new();
    let mut service = RailService::new(config);
    service.load_plan(&plan, &mut sink).unwrap();

    let mut hw = MockHardware::new();
    hw.set("B1", 4, 1);
    service.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(hw.total_delay_ms(), 500);
}

// ── Defective / repair ────────────────────────────────────────

#[test]
fn defective_lamp_refuses_switch_on_until_repaired() {
    let (mut service, mut sink) = service_with(button_and_lamp());
    let mut hw = MockHardware::new();

    service
        .handle_command(RailCommand::SwitchOn("L1".into()), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(
        service.repair("L1"),
        Err(Error::Device(DeviceError::CannotRepairWhileOn("L1".into())))
    );

    service
        .handle_command(RailCommand::MakeDefective("L1".into()), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(service.output_state("L1").unwrap(), OutputState::Defective);
    assert_eq!(hw.writes("B1", 0), vec![1, 0], "make-defective switches off first");

    let err = service
        .handle_command(RailCommand::SwitchOn("L1".into()), &mut hw, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Device(DeviceError::Defective("L1".into())));

    service
        .handle_command(RailCommand::Repair("L1".into()), &mut hw, &mut sink)
        .unwrap();
    service
        .handle_command(RailCommand::SwitchOn("L1".into()), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(service.output_state("L1").unwrap(), OutputState::On);
}

#[test]
fn defective_device_fails_the_tick() {
    let (mut service, mut sink) = service_with(button_and_lamp());
    let mut hw = MockHardware::new();
    service.make_defective("L1", &mut hw).unwrap();

    hw.set("B1", 4, 1);
    let err = service.tick(&mut hw, &mut sink).unwrap_err();
    assert_eq!(err, Error::Device(DeviceError::Defective("L1".into())));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        RailEvent::TickFailed { tick: 1, error } if *error == err
    )));
}

#[test]
fn hardware_fault_surfaces_as_tick_error() {
    let (mut service, mut sink) = service_with(button_and_lamp());
    let mut hw = MockHardware::new();
    hw.fail_on("B1", 4);

    let err = service.tick(&mut hw, &mut sink).unwrap_err();
    assert!(matches!(err, Error::Hardware(ref e) if e.pin == 4 && e.reason == "bus timeout"));
    assert!(hw.writes("B1", 0).is_empty(), "lamp did not run after the failing read");
}

#[test]
fn failed_write_is_retried_after_the_fault_clears() {
    let (mut service, mut sink) = service_with(button_and_lamp());
    let mut hw = MockHardware::new();
    service.tick(&mut hw, &mut sink).unwrap();

    hw.set("B1", 4, 1);
    hw.fail_on("B1", 0);
    let err = service.tick(&mut hw, &mut sink).unwrap_err();
    assert!(matches!(err, Error::Hardware(ref e) if e.pin == 0));
    assert!(!service.is_on("L1").unwrap());

    hw.clear_fault();
    service.tick(&mut hw, &mut sink).unwrap();
    assert!(service.is_on("L1").unwrap());
    assert_eq!(hw.writes("B1", 0), vec![0, 1]);
}

#[test]
fn removing_an_input_leaves_other_devices_running() {
    let mut devices = button_and_lamp();
    devices.push(DeviceRecipe::new("Btn2", "Button", "B1").on_pin(5));
    devices.push(DeviceRecipe::new("L2", "Lamp", "B1").on_pin(1).connect_to("Btn2"));
    let (mut service, mut sink) = service_with(devices);
    let mut hw = MockHardware::new();
    service.tick(&mut hw, &mut sink).unwrap();

    service.remove_device("Btn").unwrap();
    assert!(service.devices().is_detached("L1"));
    service.connect_now().unwrap();

    hw.set("B1", 5, 1);
    service.tick(&mut hw, &mut sink).unwrap();
    assert!(service.is_on("L2").unwrap());
    assert_eq!(service.output_state("L1").unwrap(), OutputState::Off);
}

// ── Wiring errors ─────────────────────────────────────────────

#[test]
fn self_connection_is_rejected() {
    let plan = RailPlan {
        boards: vec![BoardRecipe::new("B1", "Typ2", 4)],
        devices: vec![DeviceRecipe::new("L1", "Lamp", "B1").on_pin(0).connect_to("L1")],
    };
    let mut service = RailService::new(RailConfig::default());
    let err = service
        .load_plan(&plan, &mut RecordingSink::new())
        .unwrap_err();
    assert_eq!(err, Error::Wiring(WiringError::CircularMapping("L1".into())));
}

#[test]
fn second_connection_is_rejected() {
    let (service, _) = service_with(button_and_lamp());
    let lamp = service.devices().runnable("L1").unwrap();
    let button = service.devices().input("Btn").unwrap();
    let err = lamp.borrow_mut().connect(button, false).unwrap_err();
    assert!(matches!(err, Error::Wiring(WiringError::AlreadyConnected { .. })));
}

#[test]
fn unconnected_output_fails_the_tick() {
    let (mut service, mut sink) =
        service_with(vec![DeviceRecipe::new("L1", "Lamp", "B1").on_pin(0)]);
    let err = service
        .tick(&mut MockHardware::new(), &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Wiring(WiringError::NotConnected("L1".into())));
}

#[test]
fn unknown_target_is_reported() {
    let plan = RailPlan {
        boards: vec![BoardRecipe::new("B1", "Typ2", 4)],
        devices: vec![DeviceRecipe::new("L1", "Lamp", "B1").connect_to("Ghost")],
    };
    let mut service = RailService::new(RailConfig::default());
    let err = service
        .load_plan(&plan, &mut RecordingSink::new())
        .unwrap_err();
    assert_eq!(
        err,
        Error::Wiring(WiringError::TargetNotFound {
            device: "l1".into(),
            target: "ghost".into(),
        })
    );
}
