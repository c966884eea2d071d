//! Layout management through `RailService`: plans, pin queries, the
//! diagnostic dump, device removal and command events.

use railcreator::app::commands::RailCommand;
use railcreator::app::events::RailEvent;
use railcreator::app::service::RailService;
use railcreator::config::RailConfig;
use railcreator::devices::{DeviceKind, OutputState, Runnable};
use railcreator::error::{DeviceError, Error, PinError};
use railcreator::naming::DeviceKey;
use railcreator::pins::PinCapability;
use railcreator::plan::{DeviceRecipe, RailPlan};

use crate::mock_hw::{MockHardware, RecordingSink};

const PLAN: &str = r#"{
    "boards": [{ "name": "B1", "type": "Typ2", "chipAddress": 4 }],
    "devices": [
        { "name": "Station Button", "type": "Button", "boardId": "B1", "primaryPin": 4 },
        { "name": "Platform Lamp", "type": "Lamp", "boardId": "B1", "primaryPin": 0,
          "connectTo": "Station Button" },
        { "name": "Yard Turnout", "type": "Turnout", "boardId": "B1",
          "connectTo": "Platform Lamp" }
    ]
}"#;

fn loaded() -> (RailService, RecordingSink) {
    let plan = RailPlan::from_json(PLAN).unwrap();
    let mut sink = RecordingSink::new();
    let mut service = RailService::new(RailConfig::default());
    service.load_plan(&plan, &mut sink).unwrap();
    (service, sink)
}

#[test]
fn plan_load_registers_devices_and_emits_event() {
    let (service, sink) = loaded();
    assert_eq!(
        sink.events,
        vec![RailEvent::PlanLoaded {
            boards: 1,
            devices: 3
        }]
    );
    assert_eq!(service.devices().len(), 3);
    assert_eq!(service.devices().kind("yard turnout"), Some(DeviceKind::Turnout));
    let keys: Vec<&str> = service.devices().keys().map(DeviceKey::as_str).collect();
    assert_eq!(keys, vec!["station_button", "platform_lamp", "yard_turnout"]);
}

#[test]
fn unspecified_pins_take_lowest_free() {
    let (service, _) = loaded();
    // Turnout branch and main land on the lowest outputs left after pins 0 and 4.
    let branch = service
        .pins()
        .resolve(&DeviceKey::new("Yard Turnout").unwrap())
        .unwrap();
    let main = service
        .pins()
        .resolve(&DeviceKey::new("Yard Turnout main").unwrap())
        .unwrap();
    assert_eq!((branch.pin, main.pin), (1, 2));

    let used: Vec<u8> = service.used_pins("B1").unwrap().into_iter().collect();
    assert_eq!(used, vec![0, 1, 2, 4]);
    let free: Vec<u8> = service
        .free_pins("B1", PinCapability::BinaryW)
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(free, vec![3, 5, 6, 7]);
}

#[test]
fn dump_lists_boards_then_mappings() {
    let (service, _) = loaded();
    let dump = service.to_string();
    let boards = dump.find("------ Boards ------").unwrap();
    let mappings = dump.find("------ Mappings ------").unwrap();
    assert!(boards < mappings);
    assert!(dump.contains("board 'B1' @0x04, 16 pins"));
    assert!(dump.contains("platform_lamp -> B1:0"));
    assert!(dump.contains("yard_turnout_main -> B1:2"));
}

#[test]
fn removing_a_device_frees_pins_and_unwires_downstream() {
    let (mut service, mut sink) = loaded();
    let mut hw = MockHardware::new();
    service.tick(&mut hw, &mut sink).unwrap();

    service.remove_device("Platform Lamp").unwrap();
    assert!(!service.devices().contains("Platform Lamp"));
    assert!(!service.used_pins("B1").unwrap().contains(&0));
    assert!(
        service
            .devices()
            .runnable("Yard Turnout")
            .unwrap()
            .borrow()
            .upstream_key()
            .is_none()
    );
    assert!(service.devices().is_detached("Yard Turnout"));
    service.tick(&mut hw, &mut sink).unwrap();

    service
        .add_device(&DeviceRecipe::new("Spare Lamp", "Lamp", "B1"))
        .unwrap();
    assert_eq!(
        service
            .pins()
            .resolve(&DeviceKey::new("Spare Lamp").unwrap())
            .unwrap()
            .pin,
        0
    );
}

#[test]
fn removing_unknown_device_fails() {
    let (mut service, _) = loaded();
    assert_eq!(
        service.remove_device("Ghost"),
        Err(Error::Device(DeviceError::NotFound("Ghost".into())))
    );
}

#[test]
fn duplicate_names_collide_after_normalisation() {
    let (mut service, _) = loaded();
    let err = service
        .add_device(&DeviceRecipe::new("platform   LAMP", "Lamp", "B1"))
        .unwrap_err();
    assert_eq!(err, Error::Device(DeviceError::NameInUse("platform   LAMP".into())));
}

#[test]
fn output_on_memory_pin_is_rejected() {
    let (mut service, _) = loaded();
    let err = service
        .add_device(&DeviceRecipe::new("Eeprom Lamp", "Lamp", "B1").on_pin(8))
        .unwrap_err();
    assert!(matches!(err, Error::Pin(PinError::WrongCapability { .. })));
    assert!(!service.used_pins("B1").unwrap().contains(&8));
}

#[test]
fn unknown_device_type_is_rejected() {
    let (mut service, _) = loaded();
    let err = service
        .add_device(&DeviceRecipe::new("Crane", "Crane", "B1"))
        .unwrap_err();
    assert_eq!(err, Error::Device(DeviceError::UnknownType("Crane".into())));
}

#[test]
fn commands_emit_output_changes() {
    let (mut service, mut sink) = loaded();
    let mut hw = MockHardware::new();
    sink.events.clear();

    service
        .handle_command(RailCommand::SwitchOn("Platform Lamp".into()), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(
        sink.events,
        vec![RailEvent::OutputChanged {
            device: DeviceKey::new("platform lamp").unwrap(),
            from: OutputState::Off,
            to: OutputState::On,
        }]
    );

    let err = service
        .handle_command(RailCommand::SwitchOn("Station Button".into()), &mut hw, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Device(DeviceError::NotAnOutput("Station Button".into())));
}
